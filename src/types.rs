use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel variant id meaning "show nothing" (control group).
pub const CONTROL_ID: &str = "control";

/// Visitor device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Mobile,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }
}

/// Logical operator applied uniformly between all members of a group
/// (or between all groups of a rule set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOp {
    And,
    Or,
}

/// String-match operator for URL/referrer conditions.
///
/// `is_equal_to` is the legacy payload spelling of `equals`; both
/// deserialize to [`MatchOp::Equals`]. An operator the engine does not
/// recognize deserializes to [`MatchOp::Unknown`] and never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOp {
    #[serde(alias = "is_equal_to")]
    Equals,
    IsNotEqualTo,
    Contains,
    DoesNotContain,
    StartsWith,
    MatchesRegex,
    MatchesWildcard,
    #[serde(other)]
    Unknown,
}

/// How often a campaign may be shown to the same visitor.
///
/// Carried in the condition's `operator` slot on the wire; frequency
/// conditions ignore their `value` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyCadence {
    OncePerSession,
    OncePerDay,
}

/// A single targeting condition.
///
/// The wire shape is `{id, type, operator, value}`; the `type` tag selects
/// the variant. A tag the engine does not recognize deserializes to
/// [`Condition::Unknown`], which evaluates permissively (it never blocks
/// display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Match against the page URL of the current view.
    CurrentUrl {
        #[serde(default)]
        id: String,
        operator: MatchOp,
        #[serde(default)]
        value: String,
    },
    /// Match against the full referrer URL.
    ReferringUrl {
        #[serde(default)]
        id: String,
        operator: MatchOp,
        #[serde(default)]
        value: String,
    },
    /// Match against the referrer's host only.
    PreviousDomainReferringUrl {
        #[serde(default)]
        id: String,
        operator: MatchOp,
        #[serde(default)]
        value: String,
    },
    /// Match against the first URL seen this session.
    /// `first_url` is the legacy tag for the same condition.
    #[serde(alias = "first_url")]
    FirstUrlSession {
        #[serde(default)]
        id: String,
        operator: MatchOp,
        #[serde(default)]
        value: String,
    },
    /// Match against the first URL ever seen by this visitor.
    FirstUrlAllTime {
        #[serde(default)]
        id: String,
        operator: MatchOp,
        #[serde(default)]
        value: String,
    },
    /// Equality-only device gate; the operator slot is ignored.
    Device {
        #[serde(default)]
        id: String,
        value: Device,
    },
    /// Frequency cap; the cadence rides in the operator slot and the
    /// value field is ignored.
    Frequency {
        #[serde(default)]
        id: String,
        #[serde(rename = "operator")]
        cadence: FrequencyCadence,
    },
    #[serde(other)]
    Unknown,
}

/// A set of conditions combined with one logical operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    #[serde(default)]
    pub id: String,
    pub condition_operator: LogicOp,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// The full targeting configuration for one campaign.
///
/// A freshly created campaign has `enabled: true` and no groups, which
/// evaluates to "show to everyone".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingRules {
    /// Id of the campaign this rule set belongs to (1:1).
    #[serde(default)]
    pub banner_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub rule_groups: Vec<RuleGroup>,
    #[serde(default = "default_group_operator")]
    pub group_operator: LogicOp,
}

fn default_enabled() -> bool {
    true
}

fn default_group_operator() -> LogicOp {
    LogicOp::And
}

impl Default for TargetingRules {
    fn default() -> Self {
        Self {
            banner_id: String::new(),
            enabled: true,
            rule_groups: Vec::new(),
            group_operator: LogicOp::And,
        }
    }
}

impl TargetingRules {
    /// First frequency cadence declared anywhere in the rule set, if any.
    pub fn frequency_cadence(&self) -> Option<FrequencyCadence> {
        self.rule_groups
            .iter()
            .flat_map(|g| g.conditions.iter())
            .find_map(|c| match c {
                Condition::Frequency { cadence, .. } => Some(*cadence),
                _ => None,
            })
    }
}

/// Lifecycle status persisted on an A/B test at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Draft,
    Scheduled,
    Running,
    Ended,
}

/// One traffic slice of an A/B test. The id [`CONTROL_ID`] marks the
/// control group (show nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestVariant {
    pub banner_id: String,
    pub percentage: f64,
}

/// An A/B test over one baseline campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub id: String,
    pub baseline_id: String,
    #[serde(default)]
    pub baseline_percentage: f64,
    #[serde(default)]
    pub variants: Vec<TestVariant>,
    pub device: Device,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub status: TestStatus,
}

impl AbTest {
    /// Whether this test applies to the given device at the given instant.
    ///
    /// Liveness is re-derived from the date window rather than trusting the
    /// persisted status, which is computed at save time and can go stale.
    /// `Draft` and `Ended` still exclude the test outright: both record an
    /// explicit operator decision, not a schedule.
    pub fn is_live(&self, device: Device, now: DateTime<Utc>) -> bool {
        if matches!(self.status, TestStatus::Draft | TestStatus::Ended) {
            return false;
        }
        self.device == device && self.start_date <= now && now < self.end_date
    }
}

/// The compiled blob published for one account, as fetched by the host
/// embed script from the runtime endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePayload {
    pub account_id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub campaigns: Vec<TargetingRules>,
    #[serde(default)]
    pub tests: Vec<AbTest>,
}

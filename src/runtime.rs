//! Runtime facade.
//!
//! Owns one account's published payload and walks the full decision
//! pipeline for a campaign: targeting rules, then active-test selection,
//! then visitor bucketing. The host embed script renders whatever comes
//! back and reports actual renders via [`Runtime::mark_shown`].

use tracing::debug;

use crate::abtest::{select_active_test, TestOutcome};
use crate::context::{ensure_visitor_id, EvalContext};
use crate::error::Result;
use crate::evaluate::evaluate_rules;
use crate::parse::parse_payload;
use crate::tracker;
use crate::types::{RuntimePayload, TargetingRules};

/// Final display decision for one campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Targeting rules rejected the visitor.
    Hidden,
    /// Render this creative. `test_id` is set when an A/B test picked it
    /// (the creative may still be the baseline).
    Show {
        banner_id: String,
        test_id: Option<String>,
    },
    /// An active test bucketed the visitor into the control group:
    /// render nothing, but the campaign itself was eligible.
    Control { test_id: String },
}

impl Decision {
    /// Whether the host should render a creative.
    pub fn should_render(&self) -> bool {
        matches!(self, Decision::Show { .. })
    }
}

/// Decision engine over one published payload.
pub struct Runtime {
    payload: RuntimePayload,
}

impl Runtime {
    pub fn new(payload: RuntimePayload) -> Self {
        Self { payload }
    }

    /// Build a runtime straight from the published JSON blob.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(parse_payload(json)?))
    }

    /// Number of campaigns carried by the payload.
    pub fn campaign_count(&self) -> usize {
        self.payload.campaigns.len()
    }

    fn rules_for(&self, banner_id: &str) -> Option<&TargetingRules> {
        self.payload
            .campaigns
            .iter()
            .find(|r| r.banner_id == banner_id)
    }

    /// Decide whether (and which creative) to show for one campaign.
    ///
    /// A campaign with no rule set in the payload targets everyone.
    pub fn decide(&self, banner_id: &str, ctx: &EvalContext) -> Decision {
        let eligible = self
            .rules_for(banner_id)
            .is_none_or(|rules| evaluate_rules(rules, ctx));
        if !eligible {
            debug!(banner_id, "targeting rules rejected visitor");
            return Decision::Hidden;
        }

        let visitor_id = ensure_visitor_id(ctx.local);
        let candidates = self
            .payload
            .tests
            .iter()
            .filter(|t| t.baseline_id == banner_id);

        let decision =
            match select_active_test(candidates, ctx.device, ctx.now, &visitor_id) {
                TestOutcome::NoActiveTest => Decision::Show {
                    banner_id: banner_id.to_string(),
                    test_id: None,
                },
                TestOutcome::Assigned {
                    test_id,
                    banner_id: Some(creative),
                } => Decision::Show {
                    banner_id: creative,
                    test_id: Some(test_id),
                },
                TestOutcome::Assigned {
                    test_id,
                    banner_id: None,
                } => Decision::Control { test_id },
            };

        debug!(banner_id, decision = ?decision, "resolved display decision");
        decision
    }

    /// Decide every campaign in the payload, in declared order.
    pub fn decide_all(&self, ctx: &EvalContext) -> Vec<(String, Decision)> {
        self.payload
            .campaigns
            .iter()
            .map(|rules| (rules.banner_id.clone(), self.decide(&rules.banner_id, ctx)))
            .collect()
    }

    /// Record an actual on-screen render of `banner_id` for frequency
    /// capping. Call exactly once per render.
    pub fn mark_shown(&self, banner_id: &str, ctx: &EvalContext) {
        if let Some(rules) = self.rules_for(banner_id) {
            tracker::mark_shown(rules, ctx);
        }
    }
}

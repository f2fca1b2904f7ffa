//! Rule evaluation: condition, group, and rule set.
//!
//! Produces the show/no-show decision for a single campaign. Evaluation
//! never fails; the only side effect is the lazy first-URL capture
//! performed when a `first_url_*` condition is reached.

use crate::context::{get_host, EvalContext};
use crate::matcher::matches;
use crate::storage::keys;
use crate::tracker::utc_day;
use crate::types::{Condition, FrequencyCadence, LogicOp, RuleGroup, TargetingRules};

/// Evaluate a full rule set.
///
/// `enabled: false` is a hard override: the result is `false` and no
/// storage is touched. An empty group list means "show to everyone" — the
/// default state of a freshly created campaign.
pub fn evaluate_rules(rules: &TargetingRules, ctx: &EvalContext) -> bool {
    if !rules.enabled {
        return false;
    }
    if rules.rule_groups.is_empty() {
        return true;
    }
    match rules.group_operator {
        LogicOp::And => rules
            .rule_groups
            .iter()
            .all(|g| evaluate_group(g, ctx, &rules.banner_id)),
        LogicOp::Or => rules
            .rule_groups
            .iter()
            .any(|g| evaluate_group(g, ctx, &rules.banner_id)),
    }
}

/// Evaluate one group. A group with no conditions never blocks.
pub fn evaluate_group(group: &RuleGroup, ctx: &EvalContext, banner_id: &str) -> bool {
    if group.conditions.is_empty() {
        return true;
    }
    match group.condition_operator {
        LogicOp::And => group
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, ctx, banner_id)),
        LogicOp::Or => group
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, ctx, banner_id)),
    }
}

/// Evaluate a single condition against the visitor context.
pub fn evaluate_condition(condition: &Condition, ctx: &EvalContext, banner_id: &str) -> bool {
    match condition {
        Condition::CurrentUrl {
            operator, value, ..
        } => matches(&ctx.url, *operator, value),
        Condition::ReferringUrl {
            operator, value, ..
        } => matches(&ctx.referrer, *operator, value),
        Condition::PreviousDomainReferringUrl {
            operator, value, ..
        } => matches(&get_host(&ctx.referrer), *operator, value),
        Condition::FirstUrlSession {
            operator, value, ..
        } => matches(&ctx.first_url_session(), *operator, value),
        Condition::FirstUrlAllTime {
            operator, value, ..
        } => matches(&ctx.first_url_all_time(), *operator, value),
        Condition::Device { value, .. } => ctx.device == *value,
        Condition::Frequency { cadence, .. } => frequency_allows(*cadence, ctx, banner_id),
        // Unknown condition kinds pass through: a misconfiguration must
        // not silently hide a campaign.
        Condition::Unknown => true,
    }
}

/// Whether the frequency cap still allows showing this campaign.
fn frequency_allows(cadence: FrequencyCadence, ctx: &EvalContext, banner_id: &str) -> bool {
    match cadence {
        FrequencyCadence::OncePerSession => ctx
            .session
            .get_item(&keys::session_shown(banner_id))
            .is_none(),
        FrequencyCadence::OncePerDay => ctx
            .local
            .get_item(&keys::daily_shown(banner_id))
            .is_none_or(|day| day != utc_day(ctx.now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KvStore, MemoryStore};
    use crate::types::{Device, MatchOp};

    fn url_condition(operator: MatchOp, value: &str) -> Condition {
        Condition::CurrentUrl {
            id: String::new(),
            operator,
            value: value.to_string(),
        }
    }

    fn group(op: LogicOp, conditions: Vec<Condition>) -> RuleGroup {
        RuleGroup {
            id: String::new(),
            condition_operator: op,
            conditions,
        }
    }

    fn rules(op: LogicOp, groups: Vec<RuleGroup>) -> TargetingRules {
        TargetingRules {
            banner_id: "b1".to_string(),
            enabled: true,
            rule_groups: groups,
            group_operator: op,
        }
    }

    #[test]
    fn test_empty_rule_set_shows_to_everyone() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        assert!(evaluate_rules(&rules(LogicOp::And, vec![]), &ctx));
        assert!(evaluate_rules(&rules(LogicOp::Or, vec![]), &ctx));
    }

    #[test]
    fn test_empty_group_is_vacuously_true() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        let empty = group(LogicOp::And, vec![]);
        assert!(evaluate_group(&empty, &ctx, "b1"));

        // An empty group inside an AND rule set does not block the other
        // groups' verdict.
        let failing = group(
            LogicOp::And,
            vec![url_condition(MatchOp::Contains, "nowhere")],
        );
        let set = rules(LogicOp::And, vec![group(LogicOp::Or, vec![]), failing]);
        assert!(!evaluate_rules(&set, &ctx));
    }

    #[test]
    fn test_disabled_rules_never_show_and_touch_no_storage() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        let mut set = rules(
            LogicOp::And,
            vec![group(
                LogicOp::And,
                vec![Condition::FirstUrlSession {
                    id: String::new(),
                    operator: MatchOp::Contains,
                    value: "a.example".to_string(),
                }],
            )],
        );
        set.enabled = false;

        assert!(!evaluate_rules(&set, &ctx));
        assert!(session.is_empty(), "disabled rules must not write markers");
        assert!(local.is_empty());
    }

    #[test]
    fn test_url_exclusion_scenario() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();

        let set = rules(
            LogicOp::And,
            vec![group(
                LogicOp::And,
                vec![url_condition(MatchOp::DoesNotContain, "checkout")],
            )],
        );

        let cart = EvalContext::new("/cart", "", Device::Desktop, &session, &local);
        assert!(evaluate_rules(&set, &cart));

        let checkout = EvalContext::new("/checkout/step1", "", Device::Desktop, &session, &local);
        assert!(!evaluate_rules(&set, &checkout));
    }

    #[test]
    fn test_device_gate_scenario() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Mobile, &session, &local);

        let g = group(
            LogicOp::And,
            vec![Condition::Device {
                id: String::new(),
                value: Device::Desktop,
            }],
        );
        assert!(!evaluate_group(&g, &ctx, "b1"));
    }

    #[test]
    fn test_referrer_conditions() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new(
            "https://shop.example/",
            "https://www.google.com/search?q=shoes",
            Device::Desktop,
            &session,
            &local,
        );

        let full = Condition::ReferringUrl {
            id: String::new(),
            operator: MatchOp::Contains,
            value: "q=shoes".to_string(),
        };
        assert!(evaluate_condition(&full, &ctx, "b1"));

        let host = Condition::PreviousDomainReferringUrl {
            id: String::new(),
            operator: MatchOp::Equals,
            value: "www.google.com".to_string(),
        };
        assert!(evaluate_condition(&host, &ctx, "b1"));

        let wrong_host = Condition::PreviousDomainReferringUrl {
            id: String::new(),
            operator: MatchOp::Equals,
            value: "bing.com".to_string(),
        };
        assert!(!evaluate_condition(&wrong_host, &ctx, "b1"));
    }

    #[test]
    fn test_first_url_condition_captures_lazily() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new(
            "https://a.example/landing",
            "",
            Device::Desktop,
            &session,
            &local,
        );

        let cond = Condition::FirstUrlSession {
            id: String::new(),
            operator: MatchOp::Contains,
            value: "landing".to_string(),
        };
        assert!(evaluate_condition(&cond, &ctx, "b1"));
        // Evaluation captured the marker as a side effect
        assert!(session.get_item(keys::FIRST_URL_SESSION).is_some());
    }

    #[test]
    fn test_unknown_condition_passes_through() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        assert!(evaluate_condition(&Condition::Unknown, &ctx, "b1"));
    }

    #[test]
    fn test_frequency_once_per_session() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        let cond = Condition::Frequency {
            id: String::new(),
            cadence: FrequencyCadence::OncePerSession,
        };
        assert!(evaluate_condition(&cond, &ctx, "b1"));

        session
            .set_item(&keys::session_shown("b1"), "1")
            .unwrap();
        assert!(!evaluate_condition(&cond, &ctx, "b1"));

        // Marker is campaign-scoped: another campaign is unaffected
        assert!(evaluate_condition(&cond, &ctx, "b2"));
    }

    #[test]
    fn test_frequency_once_per_day() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/", "", Device::Desktop, &session, &local);

        let cond = Condition::Frequency {
            id: String::new(),
            cadence: FrequencyCadence::OncePerDay,
        };
        assert!(evaluate_condition(&cond, &ctx, "b1"));

        // Shown today: blocked
        local
            .set_item(&keys::daily_shown("b1"), &utc_day(ctx.now))
            .unwrap();
        assert!(!evaluate_condition(&cond, &ctx, "b1"));

        // Shown on an earlier day: allowed again
        local.set_item(&keys::daily_shown("b1"), "2020-01-01").unwrap();
        assert!(evaluate_condition(&cond, &ctx, "b1"));
    }

    #[test]
    fn test_and_or_match_conjunction_disjunction() {
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let ctx = EvalContext::new("https://a.example/cart", "", Device::Desktop, &session, &local);

        let t = url_condition(MatchOp::Contains, "cart");
        let f = url_condition(MatchOp::Contains, "checkout");

        for (op, conds, expected) in [
            (LogicOp::And, vec![t.clone(), t.clone()], true),
            (LogicOp::And, vec![t.clone(), f.clone()], false),
            (LogicOp::Or, vec![f.clone(), t.clone()], true),
            (LogicOp::Or, vec![f.clone(), f.clone()], false),
        ] {
            let g = group(op, conds);
            assert_eq!(evaluate_group(&g, &ctx, "b1"), expected);
        }
    }
}

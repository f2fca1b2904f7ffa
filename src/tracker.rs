//! Display-state tracker.
//!
//! Records "shown" markers after an actual on-screen render so that
//! frequency-cap conditions can observe prior display history. The host
//! runtime calls [`mark_shown`] once per render — not once per evaluation,
//! which may run speculatively many times.

use chrono::{DateTime, Utc};

use crate::context::EvalContext;
use crate::storage::keys;
use crate::types::{FrequencyCadence, TargetingRules};

/// Record that the campaign owning `rules` was rendered.
///
/// No-op when the rule set declares no frequency condition. Storage write
/// failures are swallowed; the cap then simply never engages.
pub fn mark_shown(rules: &TargetingRules, ctx: &EvalContext) {
    match rules.frequency_cadence() {
        Some(FrequencyCadence::OncePerSession) => {
            let _ = ctx
                .session
                .set_item(&keys::session_shown(&rules.banner_id), "1");
        }
        Some(FrequencyCadence::OncePerDay) => {
            let _ = ctx
                .local
                .set_item(&keys::daily_shown(&rules.banner_id), &utc_day(ctx.now));
        }
        None => {}
    }
}

/// UTC calendar day as `YYYY-MM-DD`, the granularity of the daily cap.
pub(crate) fn utc_day(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

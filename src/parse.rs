//! Payload parsing and allocation validation.
//!
//! The published runtime blob, a single campaign's rule set, and an
//! account's test list all arrive as JSON. Parsing is the one place the
//! engine reports errors instead of degrading: a payload that does not
//! deserialize never reaches evaluation.

use crate::error::{EngineError, Result};
use crate::types::{AbTest, RuntimePayload, TargetingRules};

/// Allowed drift when summing f64 percentages.
const ALLOCATION_EPSILON: f64 = 1e-6;

/// Parse a published runtime payload.
pub fn parse_payload(json: &str) -> Result<RuntimePayload> {
    Ok(serde_json::from_str(json)?)
}

/// Parse one campaign's targeting rule set.
pub fn parse_rules(json: &str) -> Result<TargetingRules> {
    Ok(serde_json::from_str(json)?)
}

/// Parse an account's A/B test list.
pub fn parse_tests(json: &str) -> Result<Vec<AbTest>> {
    Ok(serde_json::from_str(json)?)
}

/// Check that a test's allocation covers exactly 100 percent.
///
/// Meant for the authoring boundary, before a test is persisted. The
/// evaluator never requires it — an under-allocated test fails open to
/// the baseline — but validating here keeps that fallback path
/// unreachable in practice.
pub fn validate_test(test: &AbTest) -> Result<()> {
    if test.baseline_percentage < 0.0 {
        return Err(EngineError::NegativePercentage {
            test_id: test.id.clone(),
            percentage: test.baseline_percentage,
        });
    }
    for variant in &test.variants {
        if variant.percentage < 0.0 {
            return Err(EngineError::NegativePercentage {
                test_id: test.id.clone(),
                percentage: variant.percentage,
            });
        }
    }

    let total = test.baseline_percentage
        + test.variants.iter().map(|v| v.percentage).sum::<f64>();
    if (total - 100.0).abs() > ALLOCATION_EPSILON {
        return Err(EngineError::InvalidAllocation {
            test_id: test.id.clone(),
            total,
        });
    }
    Ok(())
}

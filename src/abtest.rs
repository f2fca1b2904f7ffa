//! Visitor bucketing and active-test selection.
//!
//! Deterministically maps a `(test id, visitor id)` pair onto `[0, 100)`
//! and resolves it against a test's cumulative percentage allocation. The
//! same pair always lands in the same bucket, which is what keeps a
//! visitor's experience stable across page loads.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::types::{AbTest, Device, CONTROL_ID};

/// Outcome of active-test selection.
///
/// "No test applies" and "a test resolved to show nothing" are different
/// answers; callers must not collapse them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// No running test matches this device and instant.
    NoActiveTest,
    /// A test matched; `banner_id` is the creative to render, or `None`
    /// for the control group (render nothing).
    Assigned {
        test_id: String,
        banner_id: Option<String>,
    },
}

/// Bucket a visitor for a test: a deterministic point on `[0, 100)`.
///
/// Rolling `31 * h + c` hash over `"{test_id}_{visitor_id}"`, wrapping at
/// 32 bits, folded to non-negative.
pub fn bucket_score(test_id: &str, visitor_id: &str) -> u32 {
    let mut hash: i32 = 0;
    for c in test_id.chars().chain(std::iter::once('_')).chain(visitor_id.chars()) {
        hash = hash.wrapping_mul(31).wrapping_add(c as i32);
    }
    hash.unsigned_abs() % 100
}

/// Resolve which creative a visitor sees for a test.
///
/// Walks the cumulative threshold starting at the baseline percentage,
/// then through the variants in declared order. `None` means the visitor
/// fell into the control group. A misconfigured allocation whose walk
/// never reaches the visitor's score fails open to the baseline.
pub fn select_variant(test: &AbTest, visitor_id: &str) -> Option<String> {
    let score = f64::from(bucket_score(&test.id, visitor_id));

    let mut threshold = test.baseline_percentage;
    if score < threshold {
        return Some(test.baseline_id.clone());
    }

    for variant in &test.variants {
        threshold += variant.percentage;
        if score < threshold {
            if variant.banner_id == CONTROL_ID {
                return None;
            }
            return Some(variant.banner_id.clone());
        }
    }

    Some(test.baseline_id.clone())
}

/// Pick the test that applies to this visitor right now and resolve their
/// variant.
///
/// Eligibility is device match plus a live date window (see
/// [`AbTest::is_live`]). Among several simultaneously eligible tests the
/// first in declared order wins.
pub fn select_active_test<'a, I>(
    tests: I,
    device: Device,
    now: DateTime<Utc>,
    visitor_id: &str,
) -> TestOutcome
where
    I: IntoIterator<Item = &'a AbTest>,
{
    for test in tests {
        if !test.is_live(device, now) {
            continue;
        }
        let banner_id = select_variant(test, visitor_id);
        trace!(
            test_id = %test.id,
            visitor_id = %visitor_id,
            variant = ?banner_id,
            "assigned visitor to test"
        );
        return TestOutcome::Assigned {
            test_id: test.id.clone(),
            banner_id,
        };
    }
    TestOutcome::NoActiveTest
}

//! Targeting Engine - a client-side display-decision engine for marketing campaigns
//!
//! This library decides whether a popup/banner campaign should be shown to a
//! visitor, and when an A/B test is active, which variant to render. It
//! provides:
//! - Rule-based targeting (URL, referrer, entry page, device, frequency caps)
//! - AND/OR rule groups with short-circuit evaluation
//! - Deterministic visitor bucketing for A/B tests (including a "show
//!   nothing" control group)
//! - Date-window and device scoping for active-test selection
//! - Injected session/durable storage ports, so everything runs without a
//!   browser
//!
//! The engine is a library invoked by a host embed script: the host supplies
//! the visitor context and the published rule payload, renders whatever
//! decision comes back, and reports actual renders for frequency capping.
//! Evaluation never fails — malformed configuration degrades to permissive
//! defaults and storage outages are silently tolerated.
//!
//! # Example
//!
//! ```rust
//! use targeting_engine::{Decision, Device, EvalContext, MemoryStore, Runtime};
//!
//! let payload = r#"{
//!     "accountId": "acct-1",
//!     "version": 1,
//!     "campaigns": [{
//!         "bannerId": "spring-sale",
//!         "enabled": true,
//!         "groupOperator": "AND",
//!         "ruleGroups": [{
//!             "id": "g1",
//!             "conditionOperator": "AND",
//!             "conditions": [
//!                 {"type": "current_url", "operator": "does_not_contain", "value": "checkout"},
//!                 {"type": "device", "value": "desktop"}
//!             ]
//!         }]
//!     }],
//!     "tests": []
//! }"#;
//!
//! let runtime = Runtime::from_json(payload).unwrap();
//!
//! // Per page view, the host builds a context over its storage scopes.
//! let session = MemoryStore::new();
//! let local = MemoryStore::new();
//! let ctx = EvalContext::new(
//!     "https://shop.example/cart",
//!     "https://www.google.com/",
//!     Device::Desktop,
//!     &session,
//!     &local,
//! );
//!
//! match runtime.decide("spring-sale", &ctx) {
//!     Decision::Show { banner_id, .. } => {
//!         // render the creative, then:
//!         runtime.mark_shown(&banner_id, &ctx);
//!     }
//!     Decision::Control { .. } => { /* eligible, but holdout: render nothing */ }
//!     Decision::Hidden => { /* targeting rejected the visitor */ }
//! }
//! ```
//!
//! # Rule model
//!
//! A campaign's rule set is a list of groups combined with one `AND`/`OR`
//! operator; each group combines its conditions the same way. Condition
//! kinds:
//!
//! | Kind | Matches against |
//! |------|-----------------|
//! | `current_url` | the page URL |
//! | `referring_url` | the full referrer URL |
//! | `previous_domain_referring_url` | the referrer's host |
//! | `first_url_session` | first URL seen this session |
//! | `first_url_all_time` | first URL ever seen by the visitor |
//! | `device` | `desktop` / `mobile` (equality only) |
//! | `frequency` | prior display markers (`once_per_session` / `once_per_day`) |

pub mod abtest;
pub mod context;
pub mod error;
pub mod evaluate;
pub mod matcher;
pub mod parse;
pub mod runtime;
pub mod storage;
pub mod tracker;
pub mod types;

// Re-export commonly used items
pub use abtest::{bucket_score, select_active_test, select_variant, TestOutcome};
pub use context::{ensure_visitor_id, get_host, EvalContext};
pub use error::{EngineError, Result};
pub use evaluate::{evaluate_condition, evaluate_group, evaluate_rules};
pub use matcher::matches;
pub use parse::{parse_payload, parse_rules, parse_tests, validate_test};
pub use runtime::{Decision, Runtime};
pub use storage::{KvStore, MemoryStore, NilStore, StorageError};
pub use tracker::mark_shown;
pub use types::{
    AbTest, Condition, Device, FrequencyCadence, LogicOp, MatchOp, RuleGroup, RuntimePayload,
    TargetingRules, TestStatus, TestVariant, CONTROL_ID,
};

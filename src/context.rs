//! Evaluation context and session resolution.
//!
//! The host runtime builds one [`EvalContext`] per page view (or per
//! simulation run) from the visitor's URL, referrer, device and the two
//! storage scopes. First-URL markers and the durable visitor id are
//! resolved lazily here; every storage failure degrades silently.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::storage::{keys, KvStore};
use crate::types::Device;

/// Visitor context for one evaluation pass. Not persisted; rebuilt on
/// every page view.
pub struct EvalContext<'a> {
    pub url: String,
    pub referrer: String,
    pub device: Device,
    /// Wall-clock instant used for test windows and day-level frequency
    /// markers. Defaults to now; override with [`EvalContext::with_now`]
    /// in simulations.
    pub now: DateTime<Utc>,
    pub session: &'a dyn KvStore,
    pub local: &'a dyn KvStore,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        url: impl Into<String>,
        referrer: impl Into<String>,
        device: Device,
        session: &'a dyn KvStore,
        local: &'a dyn KvStore,
    ) -> Self {
        Self {
            url: url.into(),
            referrer: referrer.into(),
            device,
            now: Utc::now(),
            session,
            local,
        }
    }

    /// Pin the evaluation instant.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Capture the current URL as the session's and the visitor's first
    /// URL, if neither marker exists yet.
    ///
    /// Idempotent: the first captured value wins for the lifetime of each
    /// scope. Write failures are swallowed; the markers then simply stay
    /// absent.
    pub fn ensure_first_urls(&self) {
        if self.session.get_item(keys::FIRST_URL_SESSION).is_none() {
            let _ = self.session.set_item(keys::FIRST_URL_SESSION, &self.url);
        }
        if self.local.get_item(keys::FIRST_URL_ALL_TIME).is_none() {
            let _ = self.local.set_item(keys::FIRST_URL_ALL_TIME, &self.url);
        }
    }

    /// First URL seen this session, capturing it now if absent.
    /// Empty string when storage is unavailable.
    pub fn first_url_session(&self) -> String {
        self.ensure_first_urls();
        self.session
            .get_item(keys::FIRST_URL_SESSION)
            .unwrap_or_default()
    }

    /// First URL ever seen by this visitor, capturing it now if absent.
    /// Empty string when storage is unavailable.
    pub fn first_url_all_time(&self) -> String {
        self.ensure_first_urls();
        self.local
            .get_item(keys::FIRST_URL_ALL_TIME)
            .unwrap_or_default()
    }
}

/// Host component of a URL, or `""` if the URL does not parse.
pub fn get_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_default()
}

/// Durable visitor id, created lazily on first use.
///
/// When the durable store rejects the write, a fresh id is handed out on
/// every call: the visitor loses A/B stickiness but evaluation proceeds.
pub fn ensure_visitor_id(local: &dyn KvStore) -> String {
    if let Some(id) = local.get_item(keys::VISITOR_ID) {
        return id;
    }
    let id = Uuid::new_v4().to_string();
    let _ = local.set_item(keys::VISITOR_ID, &id);
    id
}

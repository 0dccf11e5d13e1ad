//! Request-side context the assembler reads from.
//!
//! These are plain values so the crate stays independent of any HTTP
//! framework; middleware copies what it has into a [`RequestContext`].

use std::time::Instant;

use indexmap::IndexMap;
use uuid::Uuid;

use super::record::{ActorToken, TransactionCategory};

/// The incoming request as seen by audit logging.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub correlation_id: Option<String>,
    pub started_at: Option<Instant>,
    pub url: Option<String>,
    pub method: Option<String>,
    /// Peer address.
    pub ip: Option<String>,
    /// Header names are stored lowercase.
    pub headers: IndexMap<String, String>,
    pub user: Option<ActorToken>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request already carrying a fresh correlation id and start instant.
    pub fn stamped() -> Self {
        let mut request = Self::new();
        request.stamp();
        request
    }

    /// Assigns a v4 correlation id and records the start instant.
    pub fn stamp(&mut self) -> &mut Self {
        self.correlation_id = Some(Uuid::new_v4().to_string());
        self.started_at = Some(Instant::now());
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = Some(started_at);
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: ActorToken) -> Self {
        self.user = Some(user);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `x-forwarded-for` when present, otherwise the peer address.
    pub fn source_ip(&self) -> Option<&str> {
        self.header("x-forwarded-for")
            .filter(|forwarded| !forwarded.is_empty())
            .or(self.ip.as_deref())
    }

    /// Milliseconds since the request was stamped, if it was.
    pub fn elapsed_millis(&self) -> Option<u64> {
        self.started_at.map(millis_since)
    }
}

pub(crate) fn millis_since(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseContext {
    pub status_code: u16,
}

impl ResponseContext {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }
}

/// Names the audited operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionMetadata {
    pub trx_name: String,
    pub trx_module: String,
    pub filename: Option<String>,
    /// Used by transaction records; HTTP records are always `HTTP`.
    pub trx_category: TransactionCategory,
}

impl TransactionMetadata {
    pub fn new(trx_name: impl Into<String>, trx_module: impl Into<String>) -> Self {
        Self {
            trx_name: trx_name.into(),
            trx_module: trx_module.into(),
            filename: None,
            trx_category: TransactionCategory::default(),
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: TransactionCategory) -> Self {
        self.trx_category = category;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestContext, TransactionMetadata};
    use crate::audit::TransactionCategory;

    #[test]
    fn stamped_requests_carry_uuid_and_start() {
        let request = RequestContext::stamped();
        let id = request.correlation_id.clone().unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(request.elapsed_millis().is_some());
        assert_ne!(RequestContext::stamped().correlation_id, Some(id));
    }

    #[test]
    fn unstamped_requests_have_no_elapsed_time() {
        assert_eq!(RequestContext::new().elapsed_millis(), None);
    }

    #[test]
    fn forwarded_header_wins_over_peer_ip() {
        let request = RequestContext::new()
            .with_ip("10.0.0.1")
            .with_header("X-Forwarded-For", "203.0.113.7");
        assert_eq!(request.source_ip(), Some("203.0.113.7"));
        assert_eq!(request.header("x-forwarded-for"), Some("203.0.113.7"));
        assert_eq!(
            RequestContext::new().with_ip("10.0.0.1").source_ip(),
            Some("10.0.0.1")
        );
        assert_eq!(RequestContext::new().source_ip(), None);
    }

    #[test]
    fn metadata_defaults_to_trans() {
        let meta = TransactionMetadata::new("claim", "INBOX");
        assert_eq!(meta.trx_category, TransactionCategory::Trans);
        assert_eq!(
            meta.with_category(TransactionCategory::Auth).trx_category,
            TransactionCategory::Auth
        );
    }
}

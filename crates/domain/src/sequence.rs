//! Human-readable identifiers such as `ORD-1700000000000-42`.
//!
//! The trailing number comes from an atomic per-prefix counter in the
//! store, so two concurrent creations can never assemble the same
//! identifier and deleted documents never free their number.

use chrono::Utc;
use store::SequenceStore;

use crate::error::DomainError;

/// Which family of documents an identifier is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencePrefix {
    Order,
    Inquiry,
    Application,
}

impl SequencePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequencePrefix::Order => "ORD",
            SequencePrefix::Inquiry => "INQ",
            SequencePrefix::Application => "APP",
        }
    }
}

impl std::fmt::Display for SequencePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats `{PREFIX}-{unixMillis}-{value}`.
pub fn format_sequence(prefix: SequencePrefix, timestamp_millis: i64, value: i64) -> String {
    format!("{prefix}-{timestamp_millis}-{value}")
}

/// Issues identifiers from the store's counters.
#[derive(Clone)]
pub struct SequenceGenerator<S> {
    store: S,
}

impl<S: SequenceStore> SequenceGenerator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserves the next identifier for `prefix`.
    pub async fn next(&self, prefix: SequencePrefix) -> Result<String, DomainError> {
        let value = self.store.next_sequence(prefix.as_str()).await?;
        Ok(format_sequence(
            prefix,
            Utc::now().timestamp_millis(),
            value,
        ))
    }
}

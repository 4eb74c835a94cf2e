//! In-memory notifier for development and tests.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::{NotificationResult, Notifier};
use crate::error::{NotificationError, Result};

/// A message accepted by the in-memory notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<SentMessage>,
    attempts: usize,
    fail_on_send: bool,
    delay: Option<Duration>,
}

/// Records messages instead of sending them.
///
/// Failures and latency can be injected to exercise the gate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InMemoryNotifierState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Makes subsequent sends fail until switched off again.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.with_state(|s| s.fail_on_send = fail);
    }

    /// Delays every send by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.with_state(|s| s.delay = delay);
    }

    /// Returns the number of successfully sent messages.
    pub fn sent_count(&self) -> usize {
        self.with_state(|s| s.sent.len())
    }

    /// Returns the number of send calls, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.with_state(|s| s.attempts)
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.with_state(|s| s.sent.clone())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<NotificationResult> {
        let delay = self.with_state(|s| {
            s.attempts += 1;
            s.delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.with_state(|s| {
            if s.fail_on_send {
                return Err(NotificationError::Failed("Delivery refused".to_string()));
            }
            s.sent.push(SentMessage {
                to: to.to_string(),
                body: body.to_string(),
            });
            tracing::debug!(to, "message recorded");
            Ok(NotificationResult::delivered())
        })
    }
}

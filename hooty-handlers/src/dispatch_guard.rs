//! Per-message deduplication for inbound commands.
//!
//! Telegram may deliver the same update more than once. A [`DispatchGuard`] admits each
//! (chat id, message id) pair once per retention window so one user action never starts two
//! generation jobs.

use async_trait::async_trait;
use hooty_core::Message;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How long an admitted key keeps blocking repeats.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60);

/// Identifies one inbound message: message ids are only unique within a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub chat_id: i64,
    pub message_id: String,
}

impl DedupKey {
    pub fn new(chat_id: i64, message_id: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id: message_id.into(),
        }
    }
}

impl From<&Message> for DedupKey {
    fn from(message: &Message) -> Self {
        Self::new(message.chat.id, message.id.clone())
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.chat_id, self.message_id)
    }
}

/// Admission control for inbound messages.
///
/// Implementations must be safe to call concurrently from many handler tasks. A shared store
/// (e.g. Redis `SET NX EX`) can implement this to dedup across several bot instances.
#[async_trait]
pub trait DispatchGuard: Send + Sync {
    /// Returns true and records `key` the first time it is seen; false while it is still
    /// recorded. Records expire a fixed time after admission, whatever happens to the job.
    async fn admit(&self, key: &DedupKey) -> bool;
}

/// Process-local guard: a mutex-protected map of key → admission instant.
///
/// Expired entries are pruned on every `admit`, so no background task is needed. The lock is
/// never held across an `.await`.
#[derive(Debug)]
pub struct InMemoryDispatchGuard {
    retention: Duration,
    seen: Mutex<HashMap<DedupKey, Instant>>,
}

impl InMemoryDispatchGuard {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            retention,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Number of keys currently recorded (expired keys may linger until the next `admit`).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<DedupKey, Instant>> {
        // Poisoning is ignored: no critical section leaves the map half-updated.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryDispatchGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchGuard for InMemoryDispatchGuard {
    async fn admit(&self, key: &DedupKey) -> bool {
        let now = Instant::now();
        let mut seen = self.lock();
        seen.retain(|_, admitted_at| now.duration_since(*admitted_at) < self.retention);

        if seen.contains_key(key) {
            debug!(key = %key, "Dispatch guard: duplicate");
            return false;
        }
        seen.insert(key.clone(), now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_admit_once_per_key() {
        let guard = InMemoryDispatchGuard::new();
        let key = DedupKey::new(456, "42");

        assert!(guard.admit(&key).await);
        assert!(!guard.admit(&key).await);
        assert!(!guard.admit(&DedupKey::new(456, "42")).await);
        assert_eq!(guard.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_per_chat() {
        let guard = InMemoryDispatchGuard::new();

        assert!(guard.admit(&DedupKey::new(1, "42")).await);
        assert!(guard.admit(&DedupKey::new(2, "42")).await);
        assert!(guard.admit(&DedupKey::new(1, "43")).await);
        assert_eq!(guard.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_readmitted_after_retention() {
        let guard = InMemoryDispatchGuard::new();
        let key = DedupKey::new(456, "42");

        assert!(guard.admit(&key).await);

        tokio::time::advance(DEFAULT_RETENTION - Duration::from_millis(1)).await;
        assert!(!guard.admit(&key).await);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(guard.admit(&key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_repeat_does_not_extend_window() {
        let guard = InMemoryDispatchGuard::with_retention(Duration::from_secs(10));
        let key = DedupKey::new(1, "1");

        assert!(guard.admit(&key).await);
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!guard.admit(&key).await);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(guard.admit(&key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned() {
        let guard = InMemoryDispatchGuard::with_retention(Duration::from_secs(10));
        for i in 0..5 {
            assert!(guard.admit(&DedupKey::new(1, i.to_string())).await);
        }
        assert_eq!(guard.len(), 5);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(guard.admit(&DedupKey::new(2, "fresh")).await);
        assert_eq!(guard.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admit_single_winner() {
        let guard = Arc::new(InMemoryDispatchGuard::new());
        let key = DedupKey::new(7, "99");

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let guard = guard.clone();
                let key = key.clone();
                tokio::spawn(async move { guard.admit(&key).await })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(DedupKey::new(-100123, "42").to_string(), "-100123-42");
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::capture::RawCapture;
use crate::error::MailboxError;

use super::MailboxSource;

/// Process-local mailbox with the same read semantics as the remote one: the
/// latest capture stays readable until something replaces it.
#[derive(Default)]
pub struct InMemoryMailbox {
    latest: Mutex<Option<RawCapture>>,
    failures_pending: AtomicUsize,
    polls: AtomicUsize,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&self, capture: RawCapture) {
        let mut guard = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(capture);
    }

    /// Make the next `count` fetches fail as if the mailbox were unreachable.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailboxSource for InMemoryMailbox {
    async fn fetch(&self) -> Result<Option<RawCapture>, MailboxError> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MailboxError::Unreachable("simulated outage".into()));
        }

        let guard = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }
}

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::slots::SlotId;

/// The single live capture attempt: which slot is waiting, and the poll task
/// feeding it. Dropping the session stops its poll task.
#[derive(Debug)]
pub struct SyncSession {
    pub id: String,
    pub target: SlotId,
    pub started_at: DateTime<Utc>,
    cancel_token: CancellationToken,
    poll_task: Option<JoinHandle<()>>,
}

impl SyncSession {
    pub fn new(target: SlotId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target,
            started_at: Utc::now(),
            cancel_token: CancellationToken::new(),
            poll_task: None,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn attach_poll_task(&mut self, handle: JoinHandle<()>) {
        self.poll_task = Some(handle);
    }

    /// Wall-clock time since the session was armed.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Stop the poll timer. A fetch already in flight is abandoned; if it
    /// somehow completes, its session id no longer matches and it is dropped.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.poll_task.take() {
            handle.abort();
        }
    }
}

//! Polling side of the capture mailbox.
//!
//! The browser agent deposits captures out of band; the engine only ever asks
//! "what is the latest capture?" and never assumes the answer changes after it
//! has been read.

pub mod http;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::capture::RawCapture;
use crate::error::MailboxError;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub use http::HttpMailbox;
pub use memory::InMemoryMailbox;

/// One request/response round trip to wherever captures are deposited.
#[async_trait]
pub trait MailboxSource: Send + Sync {
    async fn fetch(&self) -> Result<Option<RawCapture>, MailboxError>;
}

/// Stateless poller over a [`MailboxSource`]. Failed or slow polls are logged
/// and reported as "nothing yet"; the next scheduled poll is the retry.
#[derive(Clone)]
pub struct MailboxClient {
    source: Arc<dyn MailboxSource>,
    request_timeout: Duration,
}

impl MailboxClient {
    pub fn new(source: Arc<dyn MailboxSource>, request_timeout: Duration) -> Self {
        Self {
            source,
            request_timeout,
        }
    }

    pub async fn poll(&self) -> Option<RawCapture> {
        let outcome = match tokio::time::timeout(self.request_timeout, self.source.fetch()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(MailboxError::Unreachable(format!(
                "no answer within {}ms",
                self.request_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(Some(capture)) if !capture.is_empty() => Some(capture),
            Ok(_) => None,
            Err(err) => {
                log_warn!("mailbox poll failed, waiting for next tick: {err}");
                None
            }
        }
    }
}

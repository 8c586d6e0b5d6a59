use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::capture::RawCapture;
use crate::error::MailboxError;
use crate::settings::MailboxSettings;

use super::MailboxSource;

const USER_AGENT: &str = concat!("variant-sync/", env!("CARGO_PKG_VERSION"));

/// Mailbox endpoint addressed by the shopper's session identity:
/// `GET {base_url}/{session_id}`.
pub struct HttpMailbox {
    client: Client,
    url: String,
}

impl HttpMailbox {
    pub fn new(settings: &MailboxSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .context("failed to build mailbox HTTP client")?;

        Ok(Self {
            client,
            url: mailbox_url(&settings.base_url, &settings.session_id),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn mailbox_url(base_url: &str, session_id: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(session_id.trim())
    )
}

/// Empty bodies, `null` and `204`/`404` all mean "nothing captured yet".
fn decode_body(body: &str) -> Result<Option<RawCapture>, MailboxError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let capture: RawCapture =
        serde_json::from_str(trimmed).map_err(|err| MailboxError::Malformed(err.to_string()))?;
    Ok((!capture.is_empty()).then_some(capture))
}

#[async_trait]
impl MailboxSource for HttpMailbox {
    async fn fetch(&self) -> Result<Option<RawCapture>, MailboxError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| MailboxError::Unreachable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MailboxError::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| MailboxError::Unreachable(err.to_string()))?;
        decode_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_session_scoped_url() {
        assert_eq!(
            mailbox_url("https://gift.example/api/variant-mailbox/", "user 42"),
            "https://gift.example/api/variant-mailbox/user%2042"
        );
    }

    #[test]
    fn empty_and_null_bodies_are_nothing() {
        assert_eq!(decode_body(""), Ok(None));
        assert_eq!(decode_body(" null "), Ok(None));
        assert_eq!(decode_body("{}"), Ok(None));
    }

    #[test]
    fn malformed_body_is_reported() {
        assert!(matches!(decode_body("<html>"), Err(MailboxError::Malformed(_))));
    }

    #[test]
    fn decodes_capture_body() {
        let capture = decode_body(r#"{"variants":{"color":"Red"},"image":"http://img"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(capture.image.as_deref(), Some("http://img"));
    }
}

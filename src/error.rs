use thiserror::Error;

use crate::slots::SlotId;

/// Rejected user or coordinator operations on a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("{0} slot is not active")]
    Inactive(SlotId),
    #[error("{0} slot is not armed for a capture")]
    NotArmed(SlotId),
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
    #[error("no custom field with id {0}")]
    UnknownCustomField(String),
}

/// Failures surfaced to the user when the preferences are submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("select at least one preference before adding this item")]
    NoPreferenceSelected,
}

/// A single mailbox poll that produced nothing usable. Always recovered by the
/// next scheduled poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxError {
    #[error("mailbox unreachable: {0}")]
    Unreachable(String),
    #[error("mailbox answered with HTTP {0}")]
    UnexpectedStatus(u16),
    #[error("mailbox returned a malformed capture: {0}")]
    Malformed(String),
}

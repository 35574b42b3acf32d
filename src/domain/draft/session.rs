//! Session host contract

use crate::domain::access_key::{AccessKey, ServerId};

use super::error::DraftError;

/// Result of a submission, reported back to the host
#[derive(Debug)]
pub enum SessionOutcome<'a> {
    /// The key was created or updated; the host may close the form
    Submitted(&'a AccessKey),
    /// The persistence layer rejected the request; the form stays open
    Failed(&'a DraftError),
}

/// Surface that opens an editing session and is told how it ended
pub trait SessionHost: Send + Sync {
    /// Server used when the draft does not carry one
    fn default_server_id(&self) -> ServerId;

    /// Key being edited, or None to create a new one
    fn existing_record(&self) -> Option<AccessKey>;

    /// Called once per completed submission attempt
    fn complete(&self, outcome: SessionOutcome<'_>);
}

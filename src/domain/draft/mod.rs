//! Access key drafts
//!
//! A draft is the editable, unsaved form of an access key. The controller
//! owns a draft for the length of one editing session and is the only
//! thing that submits it.

mod controller;
mod entity;
mod error;
mod session;

pub use controller::DraftController;
pub use entity::{AccessKeyDraft, DraftMode};
pub use error::{DraftError, SessionState};
pub use session::{SessionHost, SessionOutcome};

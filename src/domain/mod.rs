//! Domain layer - Access keys, quotas and drafts

pub mod access_key;
pub mod draft;
pub mod error;

pub use access_key::{
    AccessKey, AccessKeyId, AccessKeyRepository, DataLimitUnit, FinalizedRequest, ServerId,
};
pub use draft::{AccessKeyDraft, DraftController, DraftError, DraftMode, SessionState};
pub use error::DomainError;

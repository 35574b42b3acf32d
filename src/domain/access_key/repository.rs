//! Access key repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{AccessKey, AccessKeyId, ServerId};
use super::request::{EditAccessKeyRequest, NewAccessKeyRequest};
use crate::domain::DomainError;

/// Persistence layer for access keys
///
/// `create` and `update` are each invoked at most once per submission;
/// callers never retry them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccessKeyRepository: Send + Sync {
    /// Create a new access key
    async fn create(&self, request: NewAccessKeyRequest) -> Result<AccessKey, DomainError>;

    /// Update an existing access key
    async fn update(&self, request: EditAccessKeyRequest) -> Result<AccessKey, DomainError>;

    /// Get an access key by ID
    async fn get(&self, id: AccessKeyId) -> Result<Option<AccessKey>, DomainError>;

    /// List access keys, optionally only those of one server
    async fn list(&self, server_id: Option<ServerId>) -> Result<Vec<AccessKey>, DomainError>;
}

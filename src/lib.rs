//! Access Key Admin
//!
//! Provisioning and editing of server access keys:
//! - Data limits entered as a magnitude plus a 1024-based unit
//! - Optional expiration, never in the past
//! - Create/edit drafts with per-field validation and single-shot submission

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::DomainError;
use infrastructure::access_key::{AccessKeyService, FileAccessKeyRepository};

/// Open the configured store and wrap it in a service
pub async fn create_service_with_config(
    config: &AppConfig,
) -> Result<AccessKeyService<FileAccessKeyRepository>, DomainError> {
    let repository = FileAccessKeyRepository::open(&config.store.path).await?;
    Ok(AccessKeyService::new(Arc::new(repository)))
}

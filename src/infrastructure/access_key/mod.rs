//! Access key infrastructure implementations
//!
//! This module provides in-memory and file backed storage for access keys
//! and the service that opens editing sessions over them.

mod file_repository;
mod repository;
mod service;

pub use file_repository::FileAccessKeyRepository;
pub use repository::InMemoryAccessKeyRepository;
pub use service::AccessKeyService;

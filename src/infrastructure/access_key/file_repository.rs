//! JSON file backed access key repository
//!
//! The whole table is loaded on open and rewritten after every change.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::access_key::{
    AccessKey, AccessKeyId, AccessKeyRepository, EditAccessKeyRequest, NewAccessKeyRequest,
    ServerId,
};
use crate::domain::DomainError;

use super::repository::AccessKeyTable;

/// Access key repository persisted as a JSON document
#[derive(Debug)]
pub struct FileAccessKeyRepository {
    path: PathBuf,
    table: RwLock<AccessKeyTable>,
}

impl FileAccessKeyRepository {
    /// Open the store at `path`, starting empty if the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();

        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                DomainError::storage(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Access key store not found, starting empty");
                AccessKeyTable::default()
            }
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    /// Sibling file the next table is written to before replacing the store
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, table: &AccessKeyTable) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(table)
            .map_err(|e| DomainError::storage(format!("Failed to serialize store: {}", e)))?;

        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", staging.display(), e))
        })?;

        tokio::fs::rename(&staging, &self.path).await.map_err(|e| {
            DomainError::storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), "Access key store written");
        Ok(())
    }
}

#[async_trait]
impl AccessKeyRepository for FileAccessKeyRepository {
    async fn create(&self, request: NewAccessKeyRequest) -> Result<AccessKey, DomainError> {
        let mut table = self.table.write().await;
        let mut next = table.clone();

        let key = next.insert(request)?;
        self.persist(&next).await?;
        *table = next;

        Ok(key)
    }

    async fn update(&self, request: EditAccessKeyRequest) -> Result<AccessKey, DomainError> {
        let mut table = self.table.write().await;
        let mut next = table.clone();

        let key = next.apply(request)?;
        self.persist(&next).await?;
        *table = next;

        Ok(key)
    }

    async fn get(&self, id: AccessKeyId) -> Result<Option<AccessKey>, DomainError> {
        Ok(self.table.read().await.get(id))
    }

    async fn list(&self, server_id: Option<ServerId>) -> Result<Vec<AccessKey>, DomainError> {
        Ok(self.table.read().await.list(server_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access_key::DataLimitUnit;
    use chrono::{Duration, Utc};

    fn new_request(name: &str) -> NewAccessKeyRequest {
        NewAccessKeyRequest {
            server_id: ServerId::new(1),
            name: name.to_string(),
            data_limit: Some(750),
            data_limit_unit: DataLimitUnit::Mb,
            expires_at: Some(Utc::now() + Duration::days(3)),
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileAccessKeyRepository::open(dir.path().join("keys.json"))
            .await
            .unwrap();

        assert!(repo.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");

        let created = {
            let repo = FileAccessKeyRepository::open(&path).await.unwrap();
            repo.create(new_request("Alice")).await.unwrap()
        };

        let repo = FileAccessKeyRepository::open(&path).await.unwrap();
        let loaded = repo.get(created.id()).await.unwrap().unwrap();

        assert_eq!(loaded, created);

        let next = repo.create(new_request("Bob")).await.unwrap();
        assert_eq!(next.id(), AccessKeyId::new(2));
    }

    #[tokio::test]
    async fn test_rejected_change_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let repo = FileAccessKeyRepository::open(&path).await.unwrap();
        repo.create(new_request("Alice")).await.unwrap();

        assert!(repo.create(new_request("Alice")).await.is_err());

        let reopened = FileAccessKeyRepository::open(&path).await.unwrap();
        assert_eq!(reopened.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let repo = FileAccessKeyRepository::open(&path).await.unwrap();
        let key = repo.create(new_request("Alice")).await.unwrap();

        repo.update(EditAccessKeyRequest {
            id: key.id(),
            server_id: key.server_id(),
            name: "Alice".to_string(),
            data_limit: None,
            data_limit_unit: DataLimitUnit::Mb,
            expires_at: None,
        })
        .await
        .unwrap();

        let reopened = FileAccessKeyRepository::open(&path).await.unwrap();
        let loaded = reopened.get(key.id()).await.unwrap().unwrap();
        assert!(loaded.data_limit().is_none());
        assert!(loaded.expires_at().is_none());
    }

    #[tokio::test]
    async fn test_write_replaces_store_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let repo = FileAccessKeyRepository::open(&path).await.unwrap();

        repo.create(new_request("Alice")).await.unwrap();
        repo.create(new_request("Bob")).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("keys.json")]);

        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored["next_id"], 3);
    }

    #[tokio::test]
    async fn test_stale_staging_file_is_ignored_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(dir.path().join("keys.json.tmp"), "partial").unwrap();

        let repo = FileAccessKeyRepository::open(&path).await.unwrap();
        assert!(repo.list(None).await.unwrap().is_empty());

        repo.create(new_request("Alice")).await.unwrap();

        assert!(!dir.path().join("keys.json.tmp").exists());
        let reopened = FileAccessKeyRepository::open(&path).await.unwrap();
        assert_eq!(reopened.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileAccessKeyRepository::open(&path).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}

//! Access key service
//!
//! Provides lookups and hands out draft controllers that share the
//! service's repository.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access_key::{AccessKey, AccessKeyId, AccessKeyRepository, ServerId};
use crate::domain::draft::DraftController;
use crate::domain::DomainError;

/// Access key service for listing keys and opening drafts
#[derive(Debug)]
pub struct AccessKeyService<R>
where
    R: AccessKeyRepository,
{
    repository: Arc<R>,
}

impl<R: AccessKeyRepository> AccessKeyService<R> {
    /// Create a new access key service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get an access key by ID
    pub async fn get(&self, id: AccessKeyId) -> Result<Option<AccessKey>, DomainError> {
        self.repository.get(id).await
    }

    /// Get an access key by ID, failing if it does not exist
    pub async fn require(&self, id: AccessKeyId) -> Result<AccessKey, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Access key '{}' not found", id)))
    }

    /// List access keys, optionally for one server
    pub async fn list(&self, server_id: Option<ServerId>) -> Result<Vec<AccessKey>, DomainError> {
        debug!(server_id = ?server_id, "Listing access keys");
        self.repository.list(server_id).await
    }

    /// A controller with no open session
    pub fn draft_controller(&self) -> DraftController<R> {
        DraftController::new(self.repository.clone())
    }

    /// A controller with a blank draft for a new key
    pub fn create_session(&self, server_id: ServerId) -> Result<DraftController<R>, DomainError> {
        info!(server_id = %server_id, "Opening create session");

        let controller = self.draft_controller();
        controller
            .initialize(None, server_id)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(controller)
    }

    /// A controller with a draft seeded from the stored key
    pub async fn edit_session(
        &self,
        id: AccessKeyId,
        default_server_id: ServerId,
    ) -> Result<DraftController<R>, DomainError> {
        info!(id = %id, "Opening edit session");

        let record = self.require(id).await?;
        let controller = self.draft_controller();
        controller
            .initialize(Some(&record), default_server_id)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access_key::DataLimitUnit;
    use crate::domain::draft::{DraftMode, SessionState};
    use crate::infrastructure::access_key::InMemoryAccessKeyRepository;

    fn create_service() -> AccessKeyService<InMemoryAccessKeyRepository> {
        AccessKeyService::new(Arc::new(InMemoryAccessKeyRepository::new()))
    }

    #[tokio::test]
    async fn test_create_then_edit_round_trip() {
        let service = create_service();

        let create = service.create_session(ServerId::new(1)).unwrap();
        create.set_name("Alice").unwrap();
        create.set_data_limit_magnitude(Some(5)).unwrap();
        create.set_data_limit_unit(DataLimitUnit::Gb).unwrap();
        let created = create.finalize().await.unwrap();

        let edit = service
            .edit_session(created.id(), ServerId::new(1))
            .await
            .unwrap();
        assert_eq!(edit.mode(), Some(DraftMode::Edit(created.id())));

        let draft = edit.draft().unwrap();
        assert_eq!(draft.name(), "Alice");
        assert_eq!(draft.data_limit(), Some(5));
        assert_eq!(draft.data_limit_unit(), DataLimitUnit::Gb);

        edit.set_data_limit_unit(DataLimitUnit::Mb).unwrap();
        let updated = edit.finalize().await.unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.data_limit(), Some(5));
        assert_eq!(updated.data_limit_unit(), DataLimitUnit::Mb);
        assert_eq!(edit.state(), SessionState::Submitted);
    }

    #[tokio::test]
    async fn test_edit_session_for_missing_key() {
        let service = create_service();

        let result = service.edit_session(AccessKeyId::new(5), ServerId::new(1)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_name_surfaces_conflict() {
        let service = create_service();

        for expected_ok in [true, false] {
            let session = service.create_session(ServerId::new(1)).unwrap();
            session.set_name("Alice").unwrap();
            let result = session.finalize().await;

            assert_eq!(result.is_ok(), expected_ok);
            if !expected_ok {
                assert_eq!(session.state(), SessionState::Editing);
            }
        }

        assert_eq!(service.list(Some(ServerId::new(1))).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let service = create_service();
        let session = service.create_session(ServerId::new(2)).unwrap();
        session.set_name("Bob").unwrap();
        let key = session.finalize().await.unwrap();

        assert!(service.get(key.id()).await.unwrap().is_some());
        assert_eq!(service.list(None).await.unwrap().len(), 1);
        assert!(service.list(Some(ServerId::new(1))).await.unwrap().is_empty());
    }
}

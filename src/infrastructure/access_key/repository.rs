//! In-memory access key repository implementation

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::access_key::{
    AccessKey, AccessKeyId, AccessKeyRepository, EditAccessKeyRequest, NewAccessKeyRequest,
    ServerId, MAX_DATA_LIMIT,
};
use crate::domain::DomainError;

/// Access keys by id, plus the next id to hand out
///
/// Holds the rules the persistence layer enforces on its own: names are
/// unique per server, magnitudes stay within bounds, and a key never moves
/// to another server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccessKeyTable {
    next_id: i64,
    keys: BTreeMap<AccessKeyId, AccessKey>,
}

impl Default for AccessKeyTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            keys: BTreeMap::new(),
        }
    }
}

impl AccessKeyTable {
    fn check_data_limit(data_limit: Option<u64>) -> Result<(), DomainError> {
        match data_limit {
            Some(magnitude) if magnitude > MAX_DATA_LIMIT => Err(DomainError::validation(format!(
                "Data limit {} exceeds maximum of {}",
                magnitude, MAX_DATA_LIMIT
            ))),
            _ => Ok(()),
        }
    }

    fn check_name_available(
        &self,
        server_id: ServerId,
        name: &str,
        except: Option<AccessKeyId>,
    ) -> Result<(), DomainError> {
        let taken = self.keys.values().any(|k| {
            k.server_id() == server_id && k.name() == name && Some(k.id()) != except
        });

        if taken {
            return Err(DomainError::conflict(format!(
                "Access key named '{}' already exists on server {}",
                name, server_id
            )));
        }

        Ok(())
    }

    pub(crate) fn insert(&mut self, request: NewAccessKeyRequest) -> Result<AccessKey, DomainError> {
        Self::check_data_limit(request.data_limit)?;
        self.check_name_available(request.server_id, &request.name, None)?;

        let id = AccessKeyId::new(self.next_id);
        self.next_id += 1;

        let key = AccessKey::new(id, request.server_id, request.name)
            .with_data_limit(request.data_limit, request.data_limit_unit)
            .with_expires_at(request.expires_at);

        self.keys.insert(id, key.clone());
        Ok(key)
    }

    pub(crate) fn apply(&mut self, request: EditAccessKeyRequest) -> Result<AccessKey, DomainError> {
        Self::check_data_limit(request.data_limit)?;

        let current_server = self
            .keys
            .get(&request.id)
            .map(AccessKey::server_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("Access key '{}' not found", request.id))
            })?;

        if current_server != request.server_id {
            return Err(DomainError::validation(format!(
                "Access key '{}' belongs to server {} and cannot be moved to server {}",
                request.id, current_server, request.server_id
            )));
        }

        self.check_name_available(request.server_id, &request.name, Some(request.id))?;

        let key = self.keys.get_mut(&request.id).ok_or_else(|| {
            DomainError::not_found(format!("Access key '{}' not found", request.id))
        })?;

        key.apply_changes(
            request.name,
            request.data_limit,
            request.data_limit_unit,
            request.expires_at,
        );

        Ok(key.clone())
    }

    pub(crate) fn get(&self, id: AccessKeyId) -> Option<AccessKey> {
        self.keys.get(&id).cloned()
    }

    pub(crate) fn list(&self, server_id: Option<ServerId>) -> Vec<AccessKey> {
        self.keys
            .values()
            .filter(|k| server_id.is_none_or(|s| k.server_id() == s))
            .cloned()
            .collect()
    }
}

/// In-memory implementation of AccessKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryAccessKeyRepository {
    table: Arc<RwLock<AccessKeyTable>>,
}

impl InMemoryAccessKeyRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessKeyRepository for InMemoryAccessKeyRepository {
    async fn create(&self, request: NewAccessKeyRequest) -> Result<AccessKey, DomainError> {
        self.table.write().await.insert(request)
    }

    async fn update(&self, request: EditAccessKeyRequest) -> Result<AccessKey, DomainError> {
        self.table.write().await.apply(request)
    }

    async fn get(&self, id: AccessKeyId) -> Result<Option<AccessKey>, DomainError> {
        Ok(self.table.read().await.get(id))
    }

    async fn list(&self, server_id: Option<ServerId>) -> Result<Vec<AccessKey>, DomainError> {
        Ok(self.table.read().await.list(server_id))
    }
}

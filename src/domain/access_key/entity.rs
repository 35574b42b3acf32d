//! Access key entity and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quota::{DataLimit, DataLimitUnit};

/// Identifier of a persisted access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessKeyId(i64);

impl AccessKeyId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccessKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the server an access key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(i64);

impl ServerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted access key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    /// Unique identifier
    id: AccessKeyId,
    /// Owning server, never changes after creation
    server_id: ServerId,
    /// Display name, unique per server
    name: String,
    /// Quota magnitude in `data_limit_unit` (None = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    data_limit: Option<u64>,
    /// Unit the quota was entered in
    #[serde(default)]
    data_limit_unit: DataLimitUnit,
    /// Expiration timestamp (None = never expires)
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccessKey {
    /// Create a new access key with no quota and no expiration
    pub fn new(id: AccessKeyId, server_id: ServerId, name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id,
            server_id,
            name: name.into(),
            data_limit: None,
            data_limit_unit: DataLimitUnit::Bytes,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the quota
    pub fn with_data_limit(mut self, magnitude: Option<u64>, unit: DataLimitUnit) -> Self {
        self.data_limit = magnitude;
        self.data_limit_unit = unit;
        self
    }

    /// Set the expiration
    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn id(&self) -> AccessKeyId {
        self.id
    }

    pub fn server_id(&self) -> ServerId {
        self.server_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_limit(&self) -> Option<u64> {
        self.data_limit
    }

    pub fn data_limit_unit(&self) -> DataLimitUnit {
        self.data_limit_unit
    }

    /// Quota as a magnitude/unit pair, if one is set and within bounds
    pub fn quota(&self) -> Option<DataLimit> {
        self.data_limit
            .and_then(|magnitude| DataLimit::new(magnitude, self.data_limit_unit).ok())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check if the key has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires| expires < Utc::now())
    }

    /// Replace the editable fields and bump `updated_at`
    pub fn apply_changes(
        &mut self,
        name: impl Into<String>,
        data_limit: Option<u64>,
        data_limit_unit: DataLimitUnit,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.name = name.into();
        self.data_limit = data_limit;
        self.data_limit_unit = data_limit_unit;
        self.expires_at = expires_at;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> AccessKey {
        AccessKey::new(AccessKeyId::new(1), ServerId::new(7), "Alice")
    }

    #[test]
    fn test_new_key_defaults() {
        let key = key();
        assert_eq!(key.name(), "Alice");
        assert_eq!(key.server_id(), ServerId::new(7));
        assert!(key.data_limit().is_none());
        assert_eq!(key.data_limit_unit(), DataLimitUnit::Bytes);
        assert!(key.expires_at().is_none());
        assert!(!key.is_expired());
    }

    #[test]
    fn test_quota() {
        let key = key().with_data_limit(Some(5), DataLimitUnit::Gb);
        let quota = key.quota().unwrap();
        assert_eq!(quota.magnitude(), 5);
        assert_eq!(quota.unit(), DataLimitUnit::Gb);
    }

    #[test]
    fn test_is_expired() {
        let key = key().with_expires_at(Some(Utc::now() - Duration::hours(1)));
        assert!(key.is_expired());
    }

    #[test]
    fn test_apply_changes_bumps_updated_at() {
        let mut key = key();
        let before = key.updated_at();

        key.apply_changes("Bob", Some(10), DataLimitUnit::Mb, None);

        assert_eq!(key.name(), "Bob");
        assert_eq!(key.data_limit(), Some(10));
        assert_eq!(key.data_limit_unit(), DataLimitUnit::Mb);
        assert!(key.updated_at() >= before);
        assert_eq!(key.created_at(), before);
    }

    #[test]
    fn test_serialization_uses_unit_labels() {
        let key = key().with_data_limit(Some(5), DataLimitUnit::Gb);
        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json["data_limit"], 5);
        assert_eq!(json["data_limit_unit"], "GB");
        assert_eq!(json["server_id"], 7);
        assert!(json.get("expires_at").is_none());
    }
}

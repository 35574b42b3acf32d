//! Requests handed to the access key persistence layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{AccessKeyId, ServerId};
use super::quota::DataLimitUnit;

/// Request to create a new access key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccessKeyRequest {
    pub server_id: ServerId,
    pub name: String,
    /// Magnitude in `data_limit_unit`, as entered (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<u64>,
    #[serde(default)]
    pub data_limit_unit: DataLimitUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to update an existing access key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAccessKeyRequest {
    pub id: AccessKeyId,
    pub server_id: ServerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<u64>,
    #[serde(default)]
    pub data_limit_unit: DataLimitUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A fully validated draft, ready for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FinalizedRequest {
    Create(NewAccessKeyRequest),
    Update(EditAccessKeyRequest),
}

impl FinalizedRequest {
    pub fn server_id(&self) -> ServerId {
        match self {
            Self::Create(request) => request.server_id,
            Self::Update(request) => request.server_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Create(request) => &request.name,
            Self::Update(request) => &request.name,
        }
    }

    /// Id of the key being updated, if any
    pub fn source_id(&self) -> Option<AccessKeyId> {
        match self {
            Self::Create(_) => None,
            Self::Update(request) => Some(request.id),
        }
    }
}

//! Access key domain
//!
//! This module provides the access key record, quota units and
//! normalization, field validation, and the persistence trait.

mod entity;
mod quota;
mod repository;
mod request;
mod validation;

pub use entity::{AccessKey, AccessKeyId, ServerId};
pub use quota::{
    from_canonical_bytes, seed_unit_and_magnitude, to_canonical_bytes, unit_multiplier,
    validate_magnitude, DataLimit, DataLimitUnit, QuotaRangeError, UnknownUnitError,
    MAX_DATA_LIMIT,
};
#[cfg(test)]
pub use repository::MockAccessKeyRepository;
pub use repository::AccessKeyRepository;
pub use request::{EditAccessKeyRequest, FinalizedRequest, NewAccessKeyRequest};
pub use validation::{
    parse_magnitude, validate_data_limit, validate_expires_at, validate_name, AccessKeyField,
    FieldError, FieldErrors, MAX_ACCESS_KEY_NAME_LENGTH,
};

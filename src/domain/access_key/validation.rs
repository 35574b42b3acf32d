//! Access key field validation

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::quota::{validate_magnitude, QuotaRangeError};

/// Maximum length of an access key name, in characters
pub const MAX_ACCESS_KEY_NAME_LENGTH: usize = 64;

/// Editable fields of an access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKeyField {
    Name,
    DataLimit,
    DataLimitUnit,
    ExpiresAt,
}

impl AccessKeyField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DataLimit => "data_limit",
            Self::DataLimitUnit => "data_limit_unit",
            Self::ExpiresAt => "expires_at",
        }
    }
}

impl fmt::Display for AccessKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem with a single field
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Cannot exceed {0} characters")]
    TooLong(usize),

    #[error("'{0}' is not a whole number")]
    NotANumber(String),

    #[error(transparent)]
    OutOfRange(#[from] QuotaRangeError),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Expiration {0} is in the past")]
    InPast(DateTime<Utc>),
}

/// Field errors keyed by field, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<AccessKeyField, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or clear the error for a field
    pub fn set(&mut self, field: AccessKeyField, result: Result<(), FieldError>) {
        match result {
            Ok(()) => {
                self.0.remove(&field);
            }
            Err(e) => {
                self.0.insert(field, e);
            }
        }
    }

    pub fn get(&self, field: AccessKeyField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: AccessKeyField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccessKeyField, &FieldError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, error)?;
            first = false;
        }
        Ok(())
    }
}

/// Validate an access key name
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::Required);
    }

    if name.chars().count() > MAX_ACCESS_KEY_NAME_LENGTH {
        return Err(FieldError::TooLong(MAX_ACCESS_KEY_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an optional data limit magnitude
pub fn validate_data_limit(magnitude: Option<i64>) -> Result<Option<u64>, FieldError> {
    magnitude
        .map(validate_magnitude)
        .transpose()
        .map_err(FieldError::from)
}

/// Parse a data limit typed by a user
///
/// Blank input means no limit.
pub fn parse_magnitude(input: &str) -> Result<Option<i64>, FieldError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FieldError::NotANumber(trimmed.to_string()))
}

/// Validate an optional expiration against `now`
///
/// An expiration equal to `now` is accepted.
pub fn validate_expires_at(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), FieldError> {
    match expires_at {
        Some(instant) if instant < now => Err(FieldError::InPast(instant)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("a").is_ok());
        assert!(validate_name("Alice's phone").is_ok());
        assert!(validate_name(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_name(""), Err(FieldError::Required));
    }

    #[test]
    fn test_too_long_name() {
        assert_eq!(validate_name(&"x".repeat(65)), Err(FieldError::TooLong(64)));
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert!(validate_name(&"é".repeat(64)).is_ok());
    }

    #[test]
    fn test_parse_magnitude() {
        assert_eq!(parse_magnitude(""), Ok(None));
        assert_eq!(parse_magnitude("   "), Ok(None));
        assert_eq!(parse_magnitude(" 42 "), Ok(Some(42)));
        assert_eq!(parse_magnitude("-3"), Ok(Some(-3)));
        assert_eq!(
            parse_magnitude("12abc"),
            Err(FieldError::NotANumber("12abc".to_string()))
        );
        assert_eq!(
            parse_magnitude("1.5"),
            Err(FieldError::NotANumber("1.5".to_string()))
        );
    }

    #[test]
    fn test_validate_data_limit() {
        assert_eq!(validate_data_limit(None), Ok(None));
        assert_eq!(validate_data_limit(Some(0)), Ok(Some(0)));
        assert!(matches!(
            validate_data_limit(Some(-1)),
            Err(FieldError::OutOfRange(QuotaRangeError::Negative(-1)))
        ));
        assert!(validate_data_limit(Some(1_000_000_000_000_001)).is_err());
    }

    #[test]
    fn test_validate_expires_at() {
        let now = Utc::now();

        assert!(validate_expires_at(None, now).is_ok());
        assert!(validate_expires_at(Some(now), now).is_ok());
        assert!(validate_expires_at(Some(now + Duration::hours(1)), now).is_ok());
        assert_eq!(
            validate_expires_at(Some(now - Duration::seconds(1)), now),
            Err(FieldError::InPast(now - Duration::seconds(1)))
        );
    }

    #[test]
    fn test_field_errors_set_and_clear() {
        let mut errors = FieldErrors::new();

        errors.set(AccessKeyField::Name, Err(FieldError::Required));
        assert!(errors.contains(AccessKeyField::Name));
        assert_eq!(errors.len(), 1);

        errors.set(AccessKeyField::Name, Ok(()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.set(AccessKeyField::Name, Err(FieldError::Required));
        errors.set(AccessKeyField::DataLimitUnit, Err(FieldError::UnknownUnit("TB".into())));

        assert_eq!(
            errors.to_string(),
            "name: This field is required; data_limit_unit: Unknown unit 'TB'"
        );
    }
}

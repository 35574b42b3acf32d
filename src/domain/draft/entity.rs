//! Access key draft entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::access_key::{
    parse_magnitude, seed_unit_and_magnitude, validate_data_limit, validate_expires_at,
    validate_name, AccessKey, AccessKeyField, AccessKeyId, DataLimitUnit, EditAccessKeyRequest,
    FieldError, FieldErrors, FinalizedRequest, NewAccessKeyRequest, QuotaRangeError, ServerId,
    MAX_DATA_LIMIT,
};

/// Whether a draft creates a new key or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "source_id", rename_all = "snake_case")]
pub enum DraftMode {
    Create,
    Edit(AccessKeyId),
}

/// Mutable working copy of an access key
///
/// Setters never fail: they store the value and record whether the field is
/// valid, so a form can show every field error at once.
#[derive(Debug, Clone)]
pub struct AccessKeyDraft {
    mode: DraftMode,
    server_id: Option<ServerId>,
    name: String,
    data_limit: Option<i64>,
    data_limit_unit: DataLimitUnit,
    expires_at: Option<DateTime<Utc>>,
    errors: FieldErrors,
}

impl AccessKeyDraft {
    /// Blank draft for a new key
    pub fn new() -> Self {
        Self {
            mode: DraftMode::Create,
            server_id: None,
            name: String::new(),
            data_limit: None,
            data_limit_unit: DataLimitUnit::Bytes,
            expires_at: None,
            errors: FieldErrors::new(),
        }
    }

    /// Draft seeded verbatim from a persisted key
    ///
    /// A stored magnitude too large to edit is flagged on the data limit
    /// field; the draft cannot be saved until a new limit is entered.
    pub fn from_record(record: &AccessKey) -> Self {
        let (stored, data_limit_unit) =
            seed_unit_and_magnitude(record.data_limit(), Some(record.data_limit_unit()));

        let mut errors = FieldErrors::new();
        let data_limit = match stored {
            Some(magnitude) => match i64::try_from(magnitude) {
                Ok(magnitude) => Some(magnitude),
                Err(_) => {
                    errors.set(
                        AccessKeyField::DataLimit,
                        Err(FieldError::OutOfRange(QuotaRangeError::ExceedsMaximum {
                            magnitude,
                            max: MAX_DATA_LIMIT,
                        })),
                    );
                    None
                }
            },
            None => None,
        };

        Self {
            mode: DraftMode::Edit(record.id()),
            server_id: Some(record.server_id()),
            name: record.name().to_string(),
            data_limit,
            data_limit_unit,
            expires_at: record.expires_at(),
            errors,
        }
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn source_id(&self) -> Option<AccessKeyId> {
        match self.mode {
            DraftMode::Create => None,
            DraftMode::Edit(id) => Some(id),
        }
    }

    pub fn server_id(&self) -> Option<ServerId> {
        self.server_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_limit(&self) -> Option<i64> {
        self.data_limit
    }

    pub fn data_limit_unit(&self) -> DataLimitUnit {
        self.data_limit_unit
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.errors.set(AccessKeyField::Name, validate_name(&self.name));
    }

    /// Set the magnitude, read in whatever unit is currently selected
    pub fn set_data_limit(&mut self, magnitude: Option<i64>) {
        self.data_limit = magnitude;
        self.errors.set(
            AccessKeyField::DataLimit,
            validate_data_limit(magnitude).map(|_| ()),
        );
    }

    /// Set the magnitude from typed text; blank clears the limit
    pub fn set_data_limit_text(&mut self, input: &str) {
        match parse_magnitude(input) {
            Ok(magnitude) => self.set_data_limit(magnitude),
            Err(e) => {
                self.data_limit = None;
                self.errors.set(AccessKeyField::DataLimit, Err(e));
            }
        }
    }

    /// Change the unit without rescaling the magnitude
    ///
    /// A magnitude of 5 stays 5 when the unit moves from Bytes to GB; the
    /// number is reinterpreted, not converted.
    pub fn set_data_limit_unit(&mut self, unit: DataLimitUnit) {
        self.data_limit_unit = unit;
        self.errors.set(AccessKeyField::DataLimitUnit, Ok(()));
    }

    /// Select the unit by its label, keeping the previous unit if unknown
    pub fn select_data_limit_unit(&mut self, label: &str) {
        match label.parse::<DataLimitUnit>() {
            Ok(unit) => self.set_data_limit_unit(unit),
            Err(e) => self
                .errors
                .set(AccessKeyField::DataLimitUnit, Err(FieldError::UnknownUnit(e.0))),
        }
    }

    pub fn set_expires_at(&mut self, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.expires_at = expires_at;
        self.errors
            .set(AccessKeyField::ExpiresAt, validate_expires_at(expires_at, now));
    }

    /// Re-run every field check against current values
    ///
    /// Errors that only exist in the raw input (unparseable magnitude,
    /// unknown unit label, stored magnitude too large to hold) are kept
    /// until the field is edited again.
    pub fn revalidate(&mut self, now: DateTime<Utc>) {
        self.errors.set(AccessKeyField::Name, validate_name(&self.name));

        let raw_input_error = match self.errors.get(AccessKeyField::DataLimit) {
            Some(FieldError::NotANumber(_)) => true,
            Some(FieldError::OutOfRange(_)) => self.data_limit.is_none(),
            _ => false,
        };

        if !raw_input_error {
            self.errors.set(
                AccessKeyField::DataLimit,
                validate_data_limit(self.data_limit).map(|_| ()),
            );
        }

        self.errors.set(
            AccessKeyField::ExpiresAt,
            validate_expires_at(self.expires_at, now),
        );
    }

    /// Validate all fields and build the request for the persistence layer
    pub fn finalize(
        &mut self,
        default_server_id: ServerId,
        now: DateTime<Utc>,
    ) -> Result<FinalizedRequest, FieldErrors> {
        self.revalidate(now);

        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        let data_limit = validate_data_limit(self.data_limit).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.set(AccessKeyField::DataLimit, Err(e));
            errors
        })?;

        let server_id = self.server_id.unwrap_or(default_server_id);

        let request = match self.mode {
            DraftMode::Create => FinalizedRequest::Create(NewAccessKeyRequest {
                server_id,
                name: self.name.clone(),
                data_limit,
                data_limit_unit: self.data_limit_unit,
                expires_at: self.expires_at,
            }),
            DraftMode::Edit(id) => FinalizedRequest::Update(EditAccessKeyRequest {
                id,
                server_id,
                name: self.name.clone(),
                data_limit,
                data_limit_unit: self.data_limit_unit,
                expires_at: self.expires_at,
            }),
        };

        Ok(request)
    }
}

impl Default for AccessKeyDraft {
    fn default() -> Self {
        Self::new()
    }
}

//! Create and edit commands - drive one draft session from CLI arguments

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::access_key::{AccessKey, AccessKeyId, AccessKeyRepository, ServerId};
use crate::domain::draft::{DraftController, DraftError, SessionHost, SessionOutcome};

use super::{AccessKeyView, FormArgs};

/// Session host backed by command line arguments
#[derive(Debug)]
pub struct CliSessionHost {
    default_server_id: ServerId,
    record: Option<AccessKey>,
}

impl CliSessionHost {
    pub fn new(default_server_id: ServerId, record: Option<AccessKey>) -> Self {
        Self {
            default_server_id,
            record,
        }
    }
}

impl SessionHost for CliSessionHost {
    fn default_server_id(&self) -> ServerId {
        self.default_server_id
    }

    fn existing_record(&self) -> Option<AccessKey> {
        self.record.clone()
    }

    fn complete(&self, outcome: SessionOutcome<'_>) {
        match outcome {
            SessionOutcome::Submitted(key) => info!(id = %key.id(), "Access key saved"),
            SessionOutcome::Failed(e) => warn!(error = %e, "Access key was not saved"),
        }
    }
}

/// Apply the given fields to the draft
///
/// The unit is selected before the magnitude is entered; the magnitude is
/// read in whichever unit is selected at the end.
pub fn apply_form<R: AccessKeyRepository>(
    controller: &DraftController<R>,
    form: &FormArgs,
) -> Result<(), DraftError> {
    if let Some(name) = &form.name {
        controller.set_name(name.as_str())?;
    }

    if let Some(unit) = &form.unit {
        controller.select_data_limit_unit(unit)?;
    }

    if let Some(data_limit) = &form.data_limit {
        controller.set_data_limit_text(data_limit)?;
    }

    if form.no_expiry {
        controller.set_expires_at(None)?;
    } else if let Some(expires_at) = form.expires_at {
        controller.set_expires_at(Some(expires_at))?;
    }

    Ok(())
}

async fn submit<R: AccessKeyRepository>(controller: &DraftController<R>) -> anyhow::Result<()> {
    match controller.finalize().await {
        Ok(key) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&AccessKeyView::from(&key))?
            );
            Ok(())
        }
        Err(DraftError::Validation(errors)) => {
            for (field, error) in errors.iter() {
                eprintln!("{}: {}", field, error);
            }
            anyhow::bail!("Access key not saved: {} invalid field(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a new access key
pub async fn run_create(
    config: &AppConfig,
    server: Option<i64>,
    form: &FormArgs,
) -> anyhow::Result<()> {
    let service = crate::create_service_with_config(config).await?;
    let server_id = ServerId::new(server.unwrap_or(config.store.default_server_id));

    let controller = service.draft_controller();
    controller.open(Arc::new(CliSessionHost::new(server_id, None)))?;

    apply_form(&controller, form)?;
    submit(&controller).await
}

/// Edit an existing access key
pub async fn run_edit(config: &AppConfig, id: i64, form: &FormArgs) -> anyhow::Result<()> {
    let service = crate::create_service_with_config(config).await?;
    let record = service.require(AccessKeyId::new(id)).await?;
    let default_server_id = ServerId::new(config.store.default_server_id);

    let controller = service.draft_controller();
    controller.open(Arc::new(CliSessionHost::new(default_server_id, Some(record))))?;

    apply_form(&controller, form)?;
    submit(&controller).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::domain::access_key::{AccessKeyField, DataLimitUnit};
    use crate::infrastructure::access_key::InMemoryAccessKeyRepository;

    fn form() -> FormArgs {
        FormArgs {
            name: None,
            data_limit: None,
            unit: None,
            expires_at: None,
            no_expiry: false,
        }
    }

    fn controller() -> DraftController<InMemoryAccessKeyRepository> {
        DraftController::new(Arc::new(InMemoryAccessKeyRepository::new()))
    }

    #[test]
    fn test_apply_form_sets_fields() {
        let controller = controller();
        controller
            .open(Arc::new(CliSessionHost::new(ServerId::new(1), None)))
            .unwrap();

        let expires_at = Utc::now() + Duration::days(1);
        let args = FormArgs {
            name: Some("Alice".to_string()),
            data_limit: Some("5".to_string()),
            unit: Some("GB".to_string()),
            expires_at: Some(expires_at),
            ..form()
        };

        apply_form(&controller, &args).unwrap();

        let draft = controller.draft().unwrap();
        assert_eq!(draft.name(), "Alice");
        assert_eq!(draft.data_limit(), Some(5));
        assert_eq!(draft.data_limit_unit(), DataLimitUnit::Gb);
        assert_eq!(draft.expires_at(), Some(expires_at));
        assert!(draft.is_valid());
    }

    #[test]
    fn test_apply_form_no_expiry_clears_expiration() {
        let controller = controller();
        let record = AccessKey::new(AccessKeyId::new(3), ServerId::new(1), "Alice")
            .with_expires_at(Some(Utc::now() + Duration::days(1)));
        controller
            .open(Arc::new(CliSessionHost::new(ServerId::new(1), Some(record))))
            .unwrap();

        apply_form(
            &controller,
            &FormArgs {
                no_expiry: true,
                ..form()
            },
        )
        .unwrap();

        assert!(controller.draft().unwrap().expires_at().is_none());
    }

    #[tokio::test]
    async fn test_submit_reports_invalid_fields() {
        let controller = controller();
        controller
            .open(Arc::new(CliSessionHost::new(ServerId::new(1), None)))
            .unwrap();
        apply_form(
            &controller,
            &FormArgs {
                data_limit: Some("abc".to_string()),
                ..form()
            },
        )
        .unwrap();

        let result = submit(&controller).await;

        assert!(result.is_err());
        let errors = controller.field_errors();
        assert!(errors.contains(AccessKeyField::Name));
        assert!(errors.contains(AccessKeyField::DataLimit));
    }
}

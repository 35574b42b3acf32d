//! Draft controller
//!
//! Owns one editing session at a time: seeds the draft, applies field
//! changes and submits the finalized request to the repository at most once.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::access_key::{
    AccessKey, AccessKeyRepository, DataLimitUnit, FieldErrors, FinalizedRequest, ServerId,
};
use crate::domain::DomainError;

use super::entity::{AccessKeyDraft, DraftMode};
use super::error::{DraftError, SessionState};
use super::session::{SessionHost, SessionOutcome};

struct Session {
    state: SessionState,
    draft: Option<AccessKeyDraft>,
    default_server_id: Option<ServerId>,
    host: Option<Arc<dyn SessionHost>>,
    last_failure: Option<String>,
    generation: u64,
}

impl Session {
    fn uninitialized() -> Self {
        Self {
            state: SessionState::Uninitialized,
            draft: None,
            default_server_id: None,
            host: None,
            last_failure: None,
            generation: 0,
        }
    }
}

fn reject(operation: &'static str, state: SessionState) -> DraftError {
    error!(operation, state = %state, "Access key draft used in invalid state");
    DraftError::invalid_state(operation, state)
}

/// Controller for a single access key editing session
pub struct DraftController<R: AccessKeyRepository> {
    repository: Arc<R>,
    session: Mutex<Session>,
}

impl<R: AccessKeyRepository> DraftController<R> {
    /// Create a controller with no open session
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            session: Mutex::new(Session::uninitialized()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh draft, replacing any previous one
    ///
    /// With a source record the draft edits that key, otherwise it creates
    /// a new key on `default_server_id`.
    pub fn initialize(
        &self,
        source: Option<&AccessKey>,
        default_server_id: ServerId,
    ) -> Result<(), DraftError> {
        self.start(source, default_server_id, None)
    }

    /// Start a fresh draft from what the host supplies
    pub fn open(&self, host: Arc<dyn SessionHost>) -> Result<(), DraftError> {
        let source = host.existing_record();
        let default_server_id = host.default_server_id();
        self.start(source.as_ref(), default_server_id, Some(host))
    }

    fn start(
        &self,
        source: Option<&AccessKey>,
        default_server_id: ServerId,
        host: Option<Arc<dyn SessionHost>>,
    ) -> Result<(), DraftError> {
        let mut session = self.lock();

        if session.state == SessionState::Submitting {
            return Err(reject("initialize", session.state));
        }

        let draft = match source {
            Some(record) => AccessKeyDraft::from_record(record),
            None => AccessKeyDraft::new(),
        };

        info!(
            mode = ?draft.mode(),
            default_server_id = %default_server_id,
            "Opening access key draft"
        );

        let generation = session.generation + 1;
        *session = Session {
            state: SessionState::Editing,
            draft: Some(draft),
            default_server_id: Some(default_server_id),
            host,
            last_failure: None,
            generation,
        };

        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn mode(&self) -> Option<DraftMode> {
        self.lock().draft.as_ref().map(AccessKeyDraft::mode)
    }

    /// Snapshot of the current draft
    pub fn draft(&self) -> Option<AccessKeyDraft> {
        self.lock().draft.clone()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.lock()
            .draft
            .as_ref()
            .map(|draft| draft.errors().clone())
            .unwrap_or_default()
    }

    /// Message of the last rejected submission, cleared on the next attempt
    pub fn last_failure(&self) -> Option<String> {
        self.lock().last_failure.clone()
    }

    fn edit(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut AccessKeyDraft),
    ) -> Result<(), DraftError> {
        let mut session = self.lock();
        let state = session.state;

        match (state, session.draft.as_mut()) {
            (SessionState::Editing, Some(draft)) => {
                apply(&mut *draft);
                debug!(operation, valid = draft.is_valid(), "Access key draft updated");
                Ok(())
            }
            _ => Err(reject(operation, state)),
        }
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<(), DraftError> {
        let name = name.into();
        self.edit("set name", |draft| draft.set_name(name))
    }

    pub fn set_data_limit_magnitude(&self, magnitude: Option<i64>) -> Result<(), DraftError> {
        self.edit("set data limit", |draft| draft.set_data_limit(magnitude))
    }

    pub fn set_data_limit_text(&self, input: &str) -> Result<(), DraftError> {
        self.edit("set data limit", |draft| draft.set_data_limit_text(input))
    }

    /// Change the unit; the entered magnitude is reinterpreted, not rescaled
    pub fn set_data_limit_unit(&self, unit: DataLimitUnit) -> Result<(), DraftError> {
        self.edit("set data limit unit", |draft| draft.set_data_limit_unit(unit))
    }

    pub fn select_data_limit_unit(&self, label: &str) -> Result<(), DraftError> {
        self.edit("set data limit unit", |draft| {
            draft.select_data_limit_unit(label)
        })
    }

    pub fn set_expires_at(&self, expires_at: Option<DateTime<Utc>>) -> Result<(), DraftError> {
        self.edit("set expiration", |draft| {
            draft.set_expires_at(expires_at, Utc::now())
        })
    }

    /// Validate the draft and hand it to the repository
    ///
    /// While the request is in flight the draft is frozen and further
    /// `finalize` calls are rejected. Repository failures are returned
    /// unchanged and reopen the draft for editing; nothing is retried.
    pub async fn finalize(&self) -> Result<AccessKey, DraftError> {
        let (request, generation) = self.begin_submission()?;

        info!(
            source_id = ?request.source_id(),
            server_id = %request.server_id(),
            name = request.name(),
            "Submitting access key"
        );

        let result = match request {
            FinalizedRequest::Create(request) => self.repository.create(request).await,
            FinalizedRequest::Update(request) => self.repository.update(request).await,
        };

        self.complete_submission(generation, result)
    }

    fn begin_submission(&self) -> Result<(FinalizedRequest, u64), DraftError> {
        let mut session = self.lock();
        let state = session.state;
        let default_server_id = session.default_server_id;

        if state != SessionState::Editing {
            return Err(reject("finalize", state));
        }

        let (Some(draft), Some(default_server_id)) = (session.draft.as_mut(), default_server_id)
        else {
            return Err(reject("finalize", state));
        };

        match draft.finalize(default_server_id, Utc::now()) {
            Ok(request) => {
                session.state = SessionState::Submitting;
                session.last_failure = None;
                Ok((request, session.generation))
            }
            Err(errors) => {
                warn!(errors = %errors, "Access key draft failed validation");
                Err(DraftError::Validation(errors))
            }
        }
    }

    /// Settle a submission started by session `generation`
    ///
    /// The result is always returned to the caller, but the session is only
    /// updated and its host only notified if it is still the one that
    /// submitted and has not been discarded since.
    fn complete_submission(
        &self,
        generation: u64,
        result: Result<AccessKey, DomainError>,
    ) -> Result<AccessKey, DraftError> {
        let (outcome, host) = {
            let mut session = self.lock();
            let current =
                session.generation == generation && session.state == SessionState::Submitting;

            if !current {
                debug!(
                    generation,
                    state = %session.state,
                    "Submission settled after its session ended"
                );
            }

            let outcome = match result {
                Ok(key) => {
                    info!(id = %key.id(), "Access key saved");
                    if current {
                        session.state = SessionState::Submitted;
                    }
                    Ok(key)
                }
                Err(e) => {
                    warn!(error = %e, "Access key submission failed");
                    if current {
                        session.state = SessionState::Editing;
                        session.last_failure = Some(e.to_string());
                    }
                    Err(DraftError::Collaborator(e))
                }
            };

            let host = if current { session.host.clone() } else { None };
            (outcome, host)
        };

        if let Some(host) = host {
            match &outcome {
                Ok(key) => host.complete(SessionOutcome::Submitted(key)),
                Err(e) => host.complete(SessionOutcome::Failed(e)),
            }
        }

        outcome
    }

    /// Drop the draft without saving
    ///
    /// During a submission this only drops the local draft; the in-flight
    /// request still completes. Discarding twice is a no-op, discarding a
    /// submitted session is an error.
    pub fn discard(&self) -> Result<(), DraftError> {
        let mut session = self.lock();

        match session.state {
            SessionState::Editing | SessionState::Submitting => {
                info!(state = %session.state, "Discarding access key draft");
                session.state = SessionState::Discarded;
                session.draft = None;
                Ok(())
            }
            SessionState::Discarded => Ok(()),
            state => Err(reject("discard", state)),
        }
    }
}

impl<R: AccessKeyRepository> fmt::Debug for DraftController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

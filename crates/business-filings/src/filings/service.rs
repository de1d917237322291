use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::capabilities::{ActorContext, FilingCapabilities};
use super::domain::{EntityState, EntityType, FilingType};
use super::registry::{
    ApiFieldError, BusinessLookup, FilingSubmitter, RegistryApiError, SubmissionError,
};
use super::resources::{ConfigurationError, FilingResource, ResourceRegistry};
use super::rules::is_registry_identifier;
use super::sections::{SectionData, SectionKey};
use super::session::{FilingSession, SectionSlice, SessionId};
use super::template::{AssemblyError, ValidationError};
use super::wizard::{step_is_valid, FilingWizard, StepStatus, WizardError, WizardState};

/// Stored state of one filing in progress.
#[derive(Debug, Clone)]
pub struct FilingSessionRecord {
    pub session: FilingSession,
    pub wizard: FilingWizard,
    pub last_failure: Option<SubmissionFailure>,
    /// Set while the filing is with the registry. Writers are refused until it clears.
    pub submitting: bool,
    /// Bumped by the store on every update.
    pub revision: u64,
}

/// Storage abstraction so the service can be exercised without a database.
///
/// `update` only succeeds when `record.revision` still matches the stored
/// revision; it returns the stored record carrying the next revision.
pub trait SessionStore: Send + Sync {
    fn insert(&self, record: FilingSessionRecord) -> Result<FilingSessionRecord, SessionStoreError>;
    fn update(&self, record: FilingSessionRecord) -> Result<FilingSessionRecord, SessionStoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError>;
    fn remove(&self, id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session changed since it was read")]
    Stale,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Last rejected submission, kept so the filer can see what to fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailure {
    pub message: String,
    pub field_errors: Vec<ApiFieldError>,
}

impl From<&SubmissionError> for SubmissionFailure {
    fn from(error: &SubmissionError) -> Self {
        Self {
            message: error.to_string(),
            field_errors: error.field_errors().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFilingRequest {
    pub filing_type: FilingType,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub actor: ActorContext,
    #[serde(default)]
    pub filing_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NavigateCommand {
    Next,
    Back,
    JumpTo { step_id: String },
}

/// What API callers see of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub filing_type: FilingType,
    pub entity_type: EntityType,
    pub identifier: String,
    pub display_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_title: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    pub state: WizardState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<&'static str>,
    pub steps: Vec<StepStatus>,
    pub capabilities: FilingCapabilities,
    pub sections: Vec<SectionSlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<SubmissionFailure>,
}

/// Service composing the resource tables, session store, and registry collaborators.
pub struct FilingService<S, L, F> {
    resources: Arc<ResourceRegistry>,
    store: Arc<S>,
    lookup: Arc<L>,
    submitter: Arc<F>,
}

/// Clears `submitting` again if a submission is dropped before it settles,
/// e.g. when the client disconnects while the registry call is in flight.
struct SubmissionClaim<'a, S: SessionStore> {
    store: &'a S,
    id: &'a SessionId,
    armed: bool,
}

impl<'a, S: SessionStore> SubmissionClaim<'a, S> {
    fn new(store: &'a S, id: &'a SessionId) -> Self {
        Self {
            store,
            id,
            armed: true,
        }
    }

    fn settle(mut self) {
        self.armed = false;
    }
}

impl<S: SessionStore> Drop for SubmissionClaim<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(Some(mut record)) = self.store.fetch(self.id) else {
            return;
        };
        record.submitting = false;
        if let Err(error) = self.store.update(record) {
            warn!(session_id = %self.id, %error, "abandoned submission could not be released");
        }
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("fs-{id:06}"))
}

fn next_temporary_identifier() -> String {
    let id = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("T{id:09}")
}

impl<S, L, F> FilingService<S, L, F>
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    pub fn new(
        resources: Arc<ResourceRegistry>,
        store: Arc<S>,
        lookup: Arc<L>,
        submitter: Arc<F>,
    ) -> Self {
        Self {
            resources,
            store,
            lookup,
            submitter,
        }
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Open a filing session, fetching the business first when the filing acts on one.
    pub async fn start(&self, request: StartFilingRequest) -> Result<SessionView, FilingServiceError> {
        let filing_type = request.filing_type;
        let filing_date = request
            .filing_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let identifier = request
            .identifier
            .map(|identifier| identifier.trim().to_string())
            .filter(|identifier| !identifier.is_empty());
        if let Some(identifier) = identifier.as_deref() {
            if !is_registry_identifier(identifier) {
                return Err(FilingServiceError::InvalidRequest(format!(
                    "'{identifier}' is not a registry identifier"
                )));
            }
        }
        let id = next_session_id();

        let session = if filing_type.creates_business() {
            let entity_type = request.entity_type.ok_or_else(|| {
                FilingServiceError::InvalidRequest(format!("entityType is required for {filing_type}"))
            })?;
            let identifier = identifier.unwrap_or_else(next_temporary_identifier);
            FilingSession::new(id, filing_type, entity_type, identifier, request.actor, filing_date)
        } else {
            let identifier = identifier.ok_or_else(|| {
                FilingServiceError::InvalidRequest(format!("identifier is required for {filing_type}"))
            })?;
            let business = self
                .lookup
                .fetch_business(&identifier)
                .await?
                .ok_or_else(|| FilingServiceError::BusinessNotFound(identifier.clone()))?;

            if let Some(requested) = request.entity_type {
                if requested != business.legal_type {
                    return Err(FilingServiceError::InvalidRequest(format!(
                        "{identifier} is a {} business, not {requested}",
                        business.legal_type
                    )));
                }
            }
            if !filing_type.permitted_states().contains(&business.state) {
                return Err(FilingServiceError::BusinessState {
                    identifier,
                    state: business.state,
                    filing_type,
                });
            }

            FilingSession::new(
                id,
                filing_type,
                business.legal_type,
                identifier,
                request.actor,
                filing_date,
            )
            .with_business(business)
        };

        let resource = self.resources.resource(filing_type, session.entity_type)?;
        let record = FilingSessionRecord {
            wizard: FilingWizard::new(resource),
            session,
            last_failure: None,
            submitting: false,
            revision: 0,
        };
        let stored = self.store.insert(record)?;

        info!(
            session_id = %stored.session.id,
            filing_type = filing_type.name(),
            entity_type = stored.session.entity_type.code(),
            identifier = %stored.session.identifier,
            "filing session started"
        );
        self.view(&stored)
    }

    /// Record one section's data. Validation problems are returned on the view, not as errors.
    pub fn update_section(
        &self,
        id: &SessionId,
        data: SectionData,
    ) -> Result<SessionView, FilingServiceError> {
        let mut record = self.fetch_writable(id)?;
        if record.wizard.state().is_terminal() {
            return Err(terminal(&record.wizard).into());
        }

        let section = data.key();
        let resource = self.resource_for(&record.session)?;
        if resource.owner_of(section).is_none() {
            return Err(FilingServiceError::SectionNotInFiling {
                section,
                filing_type: record.session.filing_type,
            });
        }
        let capabilities = record.session.capabilities();
        if !capabilities.permits(section) {
            return Err(FilingServiceError::SectionNotPermitted(section));
        }

        let slice = record.session.record(data, &capabilities);
        info!(
            session_id = %id,
            section = section.name(),
            valid = slice.valid,
            errors = slice.errors.len(),
            "section recorded"
        );
        let record = self.store.update(record)?;
        self.view(&record)
    }

    pub fn navigate(
        &self,
        id: &SessionId,
        command: NavigateCommand,
    ) -> Result<SessionView, FilingServiceError> {
        let mut record = self.fetch_writable(id)?;
        let resource = self.resource_for(&record.session)?;
        let capabilities = record.session.capabilities();

        let step_id = match &command {
            NavigateCommand::Next => {
                let valid = record
                    .wizard
                    .current_step()
                    .and_then(|step_id| resource.step(step_id))
                    .is_some_and(|step| step_is_valid(step, &record.session, &capabilities));
                record.wizard.next(valid)?
            }
            NavigateCommand::Back => record.wizard.back()?,
            NavigateCommand::JumpTo { step_id } => record.wizard.jump_to(step_id, &capabilities)?,
        };

        info!(session_id = %id, step_id, "wizard moved");
        let record = self.store.update(record)?;
        self.view(&record)
    }

    /// Assemble and submit the filing.
    ///
    /// An accepted filing closes the session and drops its section data. On
    /// rejection the wizard returns to the step the registry complained about
    /// and the section data is kept for a retry.
    pub async fn submit(&self, id: &SessionId) -> Result<SessionView, FilingServiceError> {
        let mut record = self.fetch_writable(id)?;
        let resource = self.resource_for(&record.session)?;

        let request = match record.wizard.prepare_submission(&record.session, resource) {
            Ok(request) => request,
            Err(WizardError::Assembly(AssemblyError::Validation(error))) => {
                warn!(
                    session_id = %id,
                    step_id = error.step_id,
                    section = error.section.name(),
                    "filing incomplete"
                );
                return Err(FilingServiceError::Validation(error));
            }
            Err(other) => return Err(other.into()),
        };

        record.submitting = true;
        let mut record = self.store.update(record)?;
        let claim = SubmissionClaim::new(self.store.as_ref(), id);

        let outcome = self.submitter.submit(&request).await;
        record.submitting = false;
        match outcome {
            Ok(filing_id) => {
                record.wizard.complete(filing_id)?;
                record.last_failure = None;
                let view = self.view(&record)?;
                self.store.remove(id)?;
                claim.settle();
                info!(session_id = %id, %filing_id, "filing accepted, session closed");
                Ok(view)
            }
            Err(error) => {
                let step = record.wizard.reject(&error, resource)?;
                record.last_failure = Some(SubmissionFailure::from(&error));
                self.store.update(record)?;
                claim.settle();
                warn!(session_id = %id, error = %error, return_to = ?step, "filing rejected");
                Err(FilingServiceError::Submission(error))
            }
        }
    }

    /// Cancel the filing and drop its session.
    pub fn cancel(&self, id: &SessionId) -> Result<SessionView, FilingServiceError> {
        let mut record = self.fetch_writable(id)?;
        record.wizard.cancel()?;
        let record = self.store.update(record)?;
        self.store.remove(id)?;
        info!(session_id = %id, "filing cancelled");
        self.view(&record)
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionView, FilingServiceError> {
        let record = self.fetch(id)?;
        self.view(&record)
    }

    fn fetch(&self, id: &SessionId) -> Result<FilingSessionRecord, FilingServiceError> {
        Ok(self.store.fetch(id)?.ok_or(SessionStoreError::NotFound)?)
    }

    fn fetch_writable(&self, id: &SessionId) -> Result<FilingSessionRecord, FilingServiceError> {
        let record = self.fetch(id)?;
        if record.submitting {
            return Err(FilingServiceError::SubmissionInProgress);
        }
        Ok(record)
    }

    fn resource_for(&self, session: &FilingSession) -> Result<&FilingResource, ConfigurationError> {
        self.resources.resource(session.filing_type, session.entity_type)
    }

    fn view(&self, record: &FilingSessionRecord) -> Result<SessionView, FilingServiceError> {
        let session = &record.session;
        let resource = self.resource_for(session)?;
        let capabilities = session.capabilities();

        Ok(SessionView {
            id: session.id.clone(),
            filing_type: session.filing_type,
            entity_type: session.entity_type,
            identifier: session.identifier.clone(),
            display_name: resource.display_name,
            details_title: resource.details_title,
            legal_name: session
                .business
                .as_ref()
                .map(|business| business.legal_name.clone()),
            state: record.wizard.state(),
            current_step: record.wizard.current_step(),
            steps: record.wizard.statuses(session, resource, &capabilities),
            capabilities,
            sections: session.slices().map(|(_, slice)| slice.clone()).collect(),
            last_failure: record.last_failure.clone(),
        })
    }
}

fn terminal(wizard: &FilingWizard) -> WizardError {
    match wizard.state() {
        WizardState::Cancelled => WizardError::Terminal("cancelled"),
        _ => WizardError::Terminal("submitted"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilingServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("business {0} not found")]
    BusinessNotFound(String),
    #[error("{filing_type} cannot be filed for {identifier} while it is {}", .state.label())]
    BusinessState {
        identifier: String,
        state: EntityState,
        filing_type: FilingType,
    },
    #[error("section {section} is not part of a {filing_type} filing")]
    SectionNotInFiling {
        section: SectionKey,
        filing_type: FilingType,
    },
    #[error("section {0} is not available to this filer")]
    SectionNotPermitted(SectionKey),
    #[error("filing is being submitted")]
    SubmissionInProgress,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    #[error(transparent)]
    Lookup(#[from] RegistryApiError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

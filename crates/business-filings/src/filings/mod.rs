//! Business filing wizard: entity and filing model, field rules, per-filing
//! step descriptors, the template assembler, and the registry-facing service.

pub mod capabilities;
pub mod domain;
pub mod registry;
pub mod resources;
pub mod router;
pub mod rules;
pub mod sections;
pub mod service;
pub mod session;
pub mod steps;
pub mod template;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use capabilities::{resolve, AccountType, ActorContext, FilingCapabilities};
pub use domain::{BusinessEntity, EntityState, EntityType, FilingCode, FilingId, FilingType};
pub use registry::{
    ApiFieldError, BusinessLookup, FilingSubmitter, RegistryApiError, RegistryClient,
    SubmissionError,
};
pub use resources::{ConfigurationError, FilingResource, ResourceRegistry, Step};
pub use router::filing_router;
pub use sections::{SectionData, SectionKey};
pub use service::{
    FilingService, FilingServiceError, FilingSessionRecord, NavigateCommand, SessionStore,
    SessionStoreError, SessionView, StartFilingRequest,
};
pub use session::{FilingSession, SessionId};
pub use template::{assemble, AssemblyError, FilingDocument, ValidationError};
pub use wizard::{FilingWizard, SubmissionRequest, WizardError, WizardState};

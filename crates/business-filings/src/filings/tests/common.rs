use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Notify;

use crate::filings::domain::{
    Address, Affidavit, BusinessEntity, Certification, DissolutionStatement, DocumentDelivery,
    EntityState, EntityType, FilingId, Officer, OrgPerson, PartyType, Resolution, Role, RoleType,
};
use crate::filings::registry::{BusinessLookup, FilingSubmitter, RegistryApiError, SubmissionError};
use crate::filings::resources::ResourceRegistry;
use crate::filings::sections::SectionData;
use crate::filings::service::{
    FilingService, FilingSessionRecord, SessionStore, SessionStoreError, StartFilingRequest,
};
use crate::filings::session::SessionId;
use crate::filings::wizard::SubmissionRequest;
use crate::filings::{filing_router, ActorContext, FilingType};

pub(super) type TestService = FilingService<MemoryStore, MemoryLookup, RecordingSubmitter>;

pub(super) fn filing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub(super) fn business(identifier: &str, legal_type: EntityType, state: EntityState) -> BusinessEntity {
    serde_json::from_value(serde_json::json!({
        "identifier": identifier,
        "legalType": legal_type,
        "legalName": format!("{identifier} LTD."),
        "state": state,
    }))
    .expect("business fixture parses")
}

pub(super) fn lookup() -> MemoryLookup {
    MemoryLookup::default()
        .with(business("BC0871234", EntityType::BenefitCompany, EntityState::Active))
        .with(business("BC0870001", EntityType::LimitedCompany, EntityState::Historical))
        .with(business("CP0001234", EntityType::Cooperative, EntityState::Active))
        .with(business("CP0009999", EntityType::Cooperative, EntityState::Historical))
}

pub(super) fn build_service() -> (TestService, Arc<MemoryStore>, Arc<RecordingSubmitter>) {
    let store = Arc::new(MemoryStore::default());
    let submitter = Arc::new(RecordingSubmitter::default());
    let service = FilingService::new(
        Arc::new(ResourceRegistry::standard().expect("standard tables")),
        store.clone(),
        Arc::new(lookup()),
        submitter.clone(),
    );
    (service, store, submitter)
}

pub(super) fn build_gated_service() -> (
    FilingService<MemoryStore, MemoryLookup, GatedSubmitter>,
    Arc<MemoryStore>,
    Arc<GatedSubmitter>,
) {
    let store = Arc::new(MemoryStore::default());
    let submitter = Arc::new(GatedSubmitter::default());
    let service = FilingService::new(
        Arc::new(ResourceRegistry::standard().expect("standard tables")),
        store.clone(),
        Arc::new(lookup()),
        submitter.clone(),
    );
    (service, store, submitter)
}

pub(super) fn router_with_service(service: TestService) -> Router {
    filing_router(Arc::new(service))
}

pub(super) fn start_request(filing_type: FilingType, identifier: &str) -> StartFilingRequest {
    StartFilingRequest {
        filing_type,
        entity_type: None,
        identifier: Some(identifier.to_string()),
        actor: ActorContext::default(),
        filing_date: Some(filing_date()),
    }
}

pub(super) fn address() -> Address {
    Address {
        street_address: "1 Government St".to_string(),
        address_city: "Victoria".to_string(),
        address_region: "BC".to_string(),
        postal_code: "V8V 1X4".to_string(),
        address_country: "CA".to_string(),
        ..Address::default()
    }
}

pub(super) fn person(first_name: &str, roles: &[RoleType]) -> OrgPerson {
    OrgPerson {
        officer: Officer {
            party_type: PartyType::Person,
            first_name: first_name.to_string(),
            middle_name: None,
            last_name: "Doe".to_string(),
            organization_name: None,
            email: None,
        },
        roles: roles
            .iter()
            .map(|role_type| Role {
                role_type: *role_type,
                appointment_date: None,
            })
            .collect(),
        mailing_address: address(),
        delivery_address: Some(address()),
    }
}

/// Sections a non-staff filer needs for a corporate voluntary dissolution.
pub(super) fn dissolution_sections() -> Vec<SectionData> {
    vec![
        SectionData::DissolutionStatement(DissolutionStatement {
            dissolution_type: "voluntary".to_string(),
            dissolution_statement_type: None,
        }),
        SectionData::Parties(vec![person("Jane", &[RoleType::Custodian])]),
        SectionData::Resolution(Resolution {
            resolution_text: "Resolved that the company be dissolved.".to_string(),
            resolution_date: Some(filing_date()),
            signing_person: Some("Jane Doe".to_string()),
        }),
        SectionData::Affidavit(Affidavit {
            affidavit_confirmed: true,
            affidavit_file_key: None,
        }),
    ]
}

pub(super) fn review_sections() -> Vec<SectionData> {
    vec![
        SectionData::DocumentDelivery(DocumentDelivery {
            completing_party_email: Some("filer@example.ca".to_string()),
            document_optional_email: None,
        }),
        SectionData::Certify(Certification {
            certified_by: "Jane Doe".to_string(),
            is_certified: true,
        }),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<SessionId, FilingSessionRecord>>>,
}

impl SessionStore for MemoryStore {
    fn insert(&self, record: FilingSessionRecord) -> Result<FilingSessionRecord, SessionStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.session.id) {
            return Err(SessionStoreError::Conflict);
        }
        guard.insert(record.session.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        mut record: FilingSessionRecord,
    ) -> Result<FilingSessionRecord, SessionStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let stored = guard
            .get_mut(&record.session.id)
            .ok_or(SessionStoreError::NotFound)?;
        if stored.revision != record.revision {
            return Err(SessionStoreError::Stale);
        }
        record.revision += 1;
        *stored = record.clone();
        Ok(record)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.remove(id))
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _record: FilingSessionRecord) -> Result<FilingSessionRecord, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn update(
        &self,
        _record: FilingSessionRecord,
    ) -> Result<FilingSessionRecord, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryLookup {
    businesses: HashMap<String, BusinessEntity>,
}

impl MemoryLookup {
    pub(super) fn with(mut self, business: BusinessEntity) -> Self {
        self.businesses.insert(business.identifier.clone(), business);
        self
    }
}

#[async_trait]
impl BusinessLookup for MemoryLookup {
    async fn fetch_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError> {
        Ok(self.businesses.get(identifier).cloned())
    }
}

/// Records every payload it is handed; rejects while `rejection` is set.
#[derive(Default)]
pub(super) struct RecordingSubmitter {
    payloads: Mutex<Vec<Value>>,
    rejection: Mutex<Option<SubmissionError>>,
}

impl RecordingSubmitter {
    pub(super) fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().expect("submitter mutex poisoned").clone()
    }

    pub(super) fn reject_with(&self, error: SubmissionError) {
        *self.rejection.lock().expect("submitter mutex poisoned") = Some(error);
    }

    pub(super) fn accept(&self) {
        *self.rejection.lock().expect("submitter mutex poisoned") = None;
    }
}

#[async_trait]
impl FilingSubmitter for RecordingSubmitter {
    async fn submit(&self, request: &SubmissionRequest) -> Result<FilingId, SubmissionError> {
        self.payloads
            .lock()
            .expect("submitter mutex poisoned")
            .push(request.payload());
        match self.rejection.lock().expect("submitter mutex poisoned").clone() {
            Some(error) => Err(error),
            None => Ok(FilingId(1001)),
        }
    }
}

/// Holds each submission until `release` fires; `entered` fires once one is waiting.
#[derive(Default)]
pub(super) struct GatedSubmitter {
    pub(super) entered: Notify,
    pub(super) release: Notify,
    calls: AtomicUsize,
}

impl GatedSubmitter {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilingSubmitter for GatedSubmitter {
    async fn submit(&self, _request: &SubmissionRequest) -> Result<FilingId, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(FilingId(2002))
    }
}

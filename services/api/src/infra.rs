use async_trait::async_trait;
use business_filings::config::RegistryConfig;
use business_filings::filings::{
    BusinessEntity, BusinessLookup, EntityState, EntityType, FilingId, FilingSessionRecord,
    FilingSubmitter, RegistryApiError, RegistryClient, SessionId, SessionStore,
    SessionStoreError, SubmissionError, SubmissionRequest,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    records: Arc<Mutex<HashMap<SessionId, FilingSessionRecord>>>,
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: FilingSessionRecord) -> Result<FilingSessionRecord, SessionStoreError> {
        let mut guard = self.records.lock().expect("session store mutex poisoned");
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
        let mut guard = self.records.lock().expect("session store mutex poisoned");
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
        let guard = self.records.lock().expect("session store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<FilingSessionRecord>, SessionStoreError> {
        let mut guard = self.records.lock().expect("session store mutex poisoned");
        Ok(guard.remove(id))
    }
}

/// Local stand-in for the registry used when no API URL is configured.
pub(crate) struct InMemoryRegistry {
    businesses: Mutex<HashMap<String, BusinessEntity>>,
    filings: Mutex<Vec<Value>>,
    next_filing_id: AtomicU64,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self {
            businesses: Mutex::new(HashMap::new()),
            filings: Mutex::new(Vec::new()),
            next_filing_id: AtomicU64::new(100_001),
        }
    }
}

impl InMemoryRegistry {
    /// Registry seeded with one business per entity type and a historical company.
    pub(crate) fn seeded() -> Self {
        let registry = Self::default();
        for business in [
            BusinessEntity::new(
                "BC0871234",
                EntityType::BenefitCompany,
                "NORTHERN LIGHTS HOLDINGS LTD.",
                EntityState::Active,
            ),
            BusinessEntity::new(
                "BC0871235",
                EntityType::LimitedCompany,
                "FRASER VALLEY TIMBER LTD.",
                EntityState::Active,
            ),
            BusinessEntity::new(
                "BC0871236",
                EntityType::UnlimitedLiabilityCompany,
                "COASTAL MARINE ULC",
                EntityState::Active,
            ),
            BusinessEntity::new(
                "BC0871237",
                EntityType::CommunityContributionCompany,
                "OKANAGAN COMMUNITY ORCHARDS C.C.C.",
                EntityState::Active,
            ),
            BusinessEntity::new(
                "BC0870001",
                EntityType::LimitedCompany,
                "SKEENA RIVER OUTFITTERS LTD.",
                EntityState::Historical,
            ),
            BusinessEntity::new(
                "CP0001234",
                EntityType::Cooperative,
                "KOOTENAY GROWERS COOPERATIVE",
                EntityState::Active,
            ),
        ] {
            registry.insert(business);
        }
        registry
    }

    pub(crate) fn insert(&self, business: BusinessEntity) {
        let mut guard = self.businesses.lock().expect("registry mutex poisoned");
        guard.insert(business.identifier.clone(), business);
    }

    pub(crate) fn filings(&self) -> Vec<Value> {
        self.filings.lock().expect("registry mutex poisoned").clone()
    }
}

#[async_trait]
impl BusinessLookup for InMemoryRegistry {
    async fn fetch_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError> {
        let guard = self.businesses.lock().expect("registry mutex poisoned");
        Ok(guard.get(identifier).cloned())
    }
}

#[async_trait]
impl FilingSubmitter for InMemoryRegistry {
    async fn submit(&self, request: &SubmissionRequest) -> Result<FilingId, SubmissionError> {
        let filing_id = FilingId(self.next_filing_id.fetch_add(1, Ordering::Relaxed));
        self.filings
            .lock()
            .expect("registry mutex poisoned")
            .push(request.payload());
        info!(%filing_id, identifier = %request.identifier, "filing recorded in memory");
        Ok(filing_id)
    }
}

/// Registry collaborator chosen at start-up.
pub(crate) enum RegistryGateway {
    Http(RegistryClient),
    InMemory(InMemoryRegistry),
}

impl RegistryGateway {
    pub(crate) fn from_config(config: &RegistryConfig) -> Result<Self, RegistryApiError> {
        if config.base_url.is_none() {
            return Ok(Self::InMemory(InMemoryRegistry::seeded()));
        }
        Ok(Self::Http(RegistryClient::new(config)?))
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::InMemory(_) => "in-memory",
        }
    }
}

#[async_trait]
impl BusinessLookup for RegistryGateway {
    async fn fetch_business(
        &self,
        identifier: &str,
    ) -> Result<Option<BusinessEntity>, RegistryApiError> {
        match self {
            Self::Http(client) => client.fetch_business(identifier).await,
            Self::InMemory(registry) => registry.fetch_business(identifier).await,
        }
    }
}

#[async_trait]
impl FilingSubmitter for RegistryGateway {
    async fn submit(&self, request: &SubmissionRequest) -> Result<FilingId, SubmissionError> {
        match self {
            Self::Http(client) => client.submit(request).await,
            Self::InMemory(registry) => registry.submit(request).await,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_without_url_uses_seeded_registry() {
        let gateway = RegistryGateway::from_config(&RegistryConfig::default()).expect("gateway");
        assert_eq!(gateway.label(), "in-memory");
    }

    #[tokio::test]
    async fn seeded_registry_knows_demo_businesses() {
        let registry = InMemoryRegistry::seeded();
        let business = registry
            .fetch_business("CP0001234")
            .await
            .expect("lookup")
            .expect("seeded");
        assert_eq!(business.legal_type, EntityType::Cooperative);
        assert!(registry.fetch_business("BC9999999").await.expect("lookup").is_none());
    }

    fn record(id: &str) -> FilingSessionRecord {
        use business_filings::filings::{
            ActorContext, FilingSession, FilingType, FilingWizard, ResourceRegistry,
        };
        let registry = ResourceRegistry::standard().expect("standard tables");
        let resource = registry
            .resource(FilingType::Dissolution, EntityType::LimitedCompany)
            .expect("resource");
        FilingSessionRecord {
            session: FilingSession::new(
                SessionId(id.to_string()),
                FilingType::Dissolution,
                EntityType::LimitedCompany,
                "BC0871235",
                ActorContext::default(),
                NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid"),
            ),
            wizard: FilingWizard::new(resource),
            last_failure: None,
            submitting: false,
            revision: 0,
        }
    }

    #[test]
    fn session_store_refuses_writes_from_a_stale_read() {
        let store = InMemorySessionStore::default();
        let inserted = store.insert(record("fs-infra")).expect("insert");

        let first = store.update(inserted.clone()).expect("first write");
        assert_eq!(first.revision, 1);
        assert!(matches!(store.update(inserted), Err(SessionStoreError::Stale)));
        assert_eq!(store.update(first).expect("fresh write").revision, 2);

        assert!(matches!(
            store.update(record("fs-missing")),
            Err(SessionStoreError::NotFound)
        ));
    }

    #[test]
    fn dates_parse_from_iso_format() {
        assert_eq!(
            parse_date(" 2024-03-01 "),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid"))
        );
        assert!(parse_date("03/01/2024").is_err());
    }
}

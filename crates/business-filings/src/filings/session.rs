use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::capabilities::{resolve, ActorContext, FilingCapabilities};
use super::domain::{BusinessEntity, EntityType, FilingType};
use super::sections::{SectionData, SectionKey};
use super::steps::{validate_section, FieldError, StepContext};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest data recorded for a section along with its validation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSlice {
    pub data: SectionData,
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Everything one filing-in-progress knows about itself.
///
/// Passed explicitly to the validators, the assembler and the wizard; nothing
/// about a filing lives in global state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingSession {
    pub id: SessionId,
    pub filing_type: FilingType,
    pub entity_type: EntityType,
    /// Registry identifier, or a temporary one for filings that create a business.
    pub identifier: String,
    pub business: Option<BusinessEntity>,
    pub actor: ActorContext,
    pub filing_date: NaiveDate,
    slices: BTreeMap<SectionKey, SectionSlice>,
}

impl FilingSession {
    pub fn new(
        id: SessionId,
        filing_type: FilingType,
        entity_type: EntityType,
        identifier: impl Into<String>,
        actor: ActorContext,
        filing_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            filing_type,
            entity_type,
            identifier: identifier.into(),
            business: None,
            actor,
            filing_date,
            slices: BTreeMap::new(),
        }
    }

    pub fn with_business(mut self, business: BusinessEntity) -> Self {
        self.identifier = business.identifier.clone();
        self.business = Some(business);
        self
    }

    pub fn capabilities(&self) -> FilingCapabilities {
        resolve(self.filing_type, self.entity_type, &self.actor)
    }

    pub fn step_context(&self, capabilities: &FilingCapabilities) -> StepContext {
        StepContext {
            filing_type: self.filing_type,
            entity_type: self.entity_type,
            capabilities: *capabilities,
            staff: self.actor.user_capabilities().staff,
            filing_date: self.filing_date,
        }
    }

    /// Validate and store a section, replacing any earlier data for it.
    pub fn record(&mut self, data: SectionData, capabilities: &FilingCapabilities) -> &SectionSlice {
        let key = data.key();
        let errors = validate_section(&data, &self.step_context(capabilities));
        let slice = SectionSlice {
            data,
            valid: errors.is_empty(),
            errors,
        };
        self.slices.insert(key, slice);
        &self.slices[&key]
    }

    pub fn slice(&self, key: SectionKey) -> Option<&SectionSlice> {
        self.slices.get(&key)
    }

    pub fn slices(&self) -> impl Iterator<Item = (SectionKey, &SectionSlice)> {
        self.slices.iter().map(|(key, slice)| (*key, slice))
    }

    pub fn clear(&mut self, key: SectionKey) -> Option<SectionSlice> {
        self.slices.remove(&key)
    }

    /// Name the filer gave in the certify section, if recorded.
    pub fn certified_by(&self) -> Option<&str> {
        match self.slice(SectionKey::Certify).map(|slice| &slice.data) {
            Some(SectionData::Certify(certification)) => Some(certification.certified_by.as_str()),
            _ => None,
        }
    }
}

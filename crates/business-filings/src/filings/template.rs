//! Filing template assembler.
//!
//! Turns a session's section slices into the canonical filing document. The
//! output is all-or-nothing: any required, applicable section that is
//! missing or invalid stops assembly and names the step that owns it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::capabilities::FilingCapabilities;
use super::domain::{EntityType, FilingType};
use super::resources::FilingResource;
use super::sections::{SectionData, SectionKey};
use super::session::FilingSession;
use super::steps::FieldError;

/// Why a section kept the filing from being assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationReason {
    Missing,
    Invalid { messages: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("step '{step_id}' is incomplete: section {section} is {}", describe(.reason))]
pub struct ValidationError {
    pub step_id: &'static str,
    pub section: SectionKey,
    pub reason: ValidationReason,
}

fn describe(reason: &ValidationReason) -> String {
    match reason {
        ValidationReason::Missing => "missing".to_string(),
        ValidationReason::Invalid { messages } => format!("invalid ({})", messages.join("; ")),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session is a {session_filing}/{session_entity} filing but the resource describes {resource_filing}/{resource_entity}")]
    Mismatch {
        session_filing: FilingType,
        session_entity: EntityType,
        resource_filing: FilingType,
        resource_entity: EntityType,
    },
    #[error("section {section} could not be serialized: {source}")]
    Serialization {
        section: SectionKey,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingHeader {
    pub name: &'static str,
    pub date: NaiveDate,
    pub certified_by: String,
    pub is_future_effective: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
}

/// Assembled filing: a header followed by sections in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingDocument {
    filing_type: FilingType,
    header: FilingHeader,
    sections: BTreeMap<SectionKey, Value>,
}

impl FilingDocument {
    pub fn filing_type(&self) -> FilingType {
        self.filing_type
    }

    pub fn header(&self) -> &FilingHeader {
        &self.header
    }

    pub fn contains(&self, section: SectionKey) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn section(&self, section: SectionKey) -> Option<&Value> {
        self.sections.get(&section)
    }

    pub fn section_keys(&self) -> impl Iterator<Item = SectionKey> + '_ {
        self.sections.keys().copied()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Registry envelope: `{ "filing": { "header", "business", "<filingName>": {..} } }`.
    pub fn to_api_payload(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in &self.sections {
            match (key, value) {
                (SectionKey::Business, _) => {}
                // A section named after the filing is the filing body itself.
                (key, Value::Object(fields)) if key.name() == self.filing_type.name() => {
                    body.extend(fields.clone());
                }
                (key, value) => {
                    body.insert(key.name().to_string(), value.clone());
                }
            }
        }

        let mut filing = Map::new();
        filing.insert("header".to_string(), json!(self.header));
        if let Some(business) = self.sections.get(&SectionKey::Business) {
            filing.insert("business".to_string(), business.clone());
        }
        filing.insert(self.filing_type.name().to_string(), Value::Object(body));

        json!({ "filing": filing })
    }
}

impl Serialize for FilingDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + 1))?;
        map.serialize_entry("header", &self.header)?;
        for (key, value) in &self.sections {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}

/// Assemble the filing document for `session`.
///
/// Section gates come from the session's own actor and entity type, never
/// from the caller.
pub fn assemble(
    session: &FilingSession,
    resource: &FilingResource,
) -> Result<FilingDocument, AssemblyError> {
    if session.filing_type != resource.filing_type || session.entity_type != resource.entity_type {
        return Err(AssemblyError::Mismatch {
            session_filing: session.filing_type,
            session_entity: session.entity_type,
            resource_filing: resource.filing_type,
            resource_entity: resource.entity_type,
        });
    }

    let capabilities = &session.capabilities();
    check_complete(session, resource, capabilities)?;

    let mut sections = BTreeMap::new();
    sections.insert(SectionKey::Business, business_section(session));

    for step in &resource.steps {
        for requirement in &step.sections {
            let key = requirement.section;
            if !capabilities.permits(key) {
                continue;
            }
            let Some(slice) = session.slice(key) else {
                continue;
            };
            let value = slice
                .data
                .to_value()
                .map_err(|source| AssemblyError::Serialization {
                    section: key,
                    source,
                })?;
            sections.insert(key, value);
        }
    }

    Ok(FilingDocument {
        filing_type: session.filing_type,
        header: header(session, capabilities),
        sections,
    })
}

/// First required-and-missing or invalid section, in step order.
fn check_complete(
    session: &FilingSession,
    resource: &FilingResource,
    capabilities: &FilingCapabilities,
) -> Result<(), ValidationError> {
    for step in &resource.steps {
        for requirement in &step.sections {
            if !capabilities.permits(requirement.section) {
                continue;
            }
            match session.slice(requirement.section) {
                None if requirement.required => {
                    return Err(ValidationError {
                        step_id: step.id,
                        section: requirement.section,
                        reason: ValidationReason::Missing,
                    });
                }
                Some(slice) if !slice.valid => {
                    return Err(ValidationError {
                        step_id: step.id,
                        section: requirement.section,
                        reason: ValidationReason::Invalid {
                            messages: messages(&slice.errors),
                        },
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn messages(errors: &[FieldError]) -> Vec<String> {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect()
}

fn header(session: &FilingSession, capabilities: &FilingCapabilities) -> FilingHeader {
    let effective = match session.slice(SectionKey::EffectiveDateTime).map(|slice| &slice.data) {
        Some(SectionData::EffectiveDateTime(effective))
            if capabilities.effective_date_time && effective.is_future_effective =>
        {
            effective.effective_date_time
        }
        _ => None,
    };

    FilingHeader {
        name: session.filing_type.name(),
        date: session.filing_date,
        certified_by: session.certified_by().unwrap_or_default().to_string(),
        is_future_effective: effective.is_some(),
        effective_date: effective.map(|when| when.to_rfc3339()),
    }
}

fn business_section(session: &FilingSession) -> Value {
    if let Some(business) = &session.business {
        let mut section = json!({
            "identifier": business.identifier,
            "legalType": business.legal_type,
            "legalName": business.legal_name,
        });
        if let Some(founding) = &business.founding_date {
            section["foundingDate"] = json!(founding);
        }
        return section;
    }

    let mut section = json!({
        "identifier": session.identifier,
        "legalType": session.entity_type,
    });
    if let Some(SectionData::NameRequest(name_request)) =
        session.slice(SectionKey::NameRequest).map(|slice| &slice.data)
    {
        if let Some(name) = &name_request.legal_name {
            section["legalName"] = json!(name);
        }
    }
    section
}

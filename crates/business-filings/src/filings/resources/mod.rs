//! Static per-filing, per-entity-type descriptors: wizard steps, fee codes, and titles.

mod amalgamation;
mod continuation_out;
mod dissolution;
mod incorporation;
mod restoration;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{EntityType, FilingCode, FilingType, FilingTypeCode};
use super::sections::SectionKey;

/// A section a step is responsible for collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequirement {
    pub section: SectionKey,
    pub required: bool,
}

pub(crate) const fn required(section: SectionKey) -> SectionRequirement {
    SectionRequirement {
        section,
        required: true,
    }
}

pub(crate) const fn optional(section: SectionKey) -> SectionRequirement {
    SectionRequirement {
        section,
        required: false,
    }
}

/// One wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: &'static str,
    pub step: u8,
    pub icon: &'static str,
    pub text: &'static str,
    pub to: &'static str,
    pub component: &'static str,
    pub sections: Vec<SectionRequirement>,
}

impl Step {
    pub fn owns(&self, section: SectionKey) -> bool {
        self.sections.iter().any(|req| req.section == section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingResource {
    pub filing_type: FilingType,
    pub entity_type: EntityType,
    pub display_name: &'static str,
    pub steps: Vec<Step>,
    pub filing_data: Vec<FilingCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_title: Option<&'static str>,
}

impl FilingResource {
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn owner_of(&self, section: SectionKey) -> Option<&Step> {
        self.steps.iter().find(|step| step.owns(section))
    }
}

/// Misconfigured descriptor tables. Raised at start-up, never during a filing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no {filing_type} resource configured for entity type {entity_type}")]
    MissingResource {
        filing_type: FilingType,
        entity_type: EntityType,
    },
    #[error("{filing_type} does not support entity type {entity_type}")]
    UnsupportedEntityType {
        filing_type: FilingType,
        entity_type: EntityType,
    },
    #[error("duplicate {filing_type} resource for entity type {entity_type}")]
    DuplicateResource {
        filing_type: FilingType,
        entity_type: EntityType,
    },
    #[error("{filing_type}/{entity_type} resource has no steps")]
    EmptySteps {
        filing_type: FilingType,
        entity_type: EntityType,
    },
    #[error("{filing_type}/{entity_type} step '{step_id}' is numbered {found}, expected {expected}")]
    StepOrder {
        filing_type: FilingType,
        entity_type: EntityType,
        step_id: &'static str,
        expected: u8,
        found: u8,
    },
    #[error("{filing_type}/{entity_type} repeats step id '{step_id}'")]
    DuplicateStepId {
        filing_type: FilingType,
        entity_type: EntityType,
        step_id: &'static str,
    },
    #[error("{filing_type}/{entity_type} section {section} is owned by more than one step")]
    DuplicateSection {
        filing_type: FilingType,
        entity_type: EntityType,
        section: SectionKey,
    },
    #[error("{filing_type}/{entity_type} resource has no filing codes")]
    MissingFilingData {
        filing_type: FilingType,
        entity_type: EntityType,
    },
    #[error("{filing_type}/{entity_type} filing code is declared for {found}")]
    FilingDataMismatch {
        filing_type: FilingType,
        entity_type: EntityType,
        found: EntityType,
    },
}

/// Immutable lookup of every configured descriptor.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: BTreeMap<(FilingType, EntityType), FilingResource>,
}

impl ResourceRegistry {
    /// The descriptor tables shipped with the service.
    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::from_resources(standard_resources())
    }

    pub fn from_resources(resources: Vec<FilingResource>) -> Result<Self, ConfigurationError> {
        let mut table = BTreeMap::new();

        for resource in resources {
            check_resource(&resource)?;
            let key = (resource.filing_type, resource.entity_type);
            if table.contains_key(&key) {
                return Err(ConfigurationError::DuplicateResource {
                    filing_type: key.0,
                    entity_type: key.1,
                });
            }
            table.insert(key, resource);
        }

        for filing_type in FilingType::ordered() {
            for &entity_type in filing_type.supported_entity_types() {
                if !table.contains_key(&(filing_type, entity_type)) {
                    return Err(ConfigurationError::MissingResource {
                        filing_type,
                        entity_type,
                    });
                }
            }
        }

        Ok(Self { resources: table })
    }

    pub fn resource(
        &self,
        filing_type: FilingType,
        entity_type: EntityType,
    ) -> Result<&FilingResource, ConfigurationError> {
        self.resources
            .get(&(filing_type, entity_type))
            .ok_or_else(|| {
                if filing_type.supported_entity_types().contains(&entity_type) {
                    ConfigurationError::MissingResource {
                        filing_type,
                        entity_type,
                    }
                } else {
                    ConfigurationError::UnsupportedEntityType {
                        filing_type,
                        entity_type,
                    }
                }
            })
    }

    pub fn resources_for(&self, filing_type: FilingType) -> impl Iterator<Item = &FilingResource> {
        self.resources
            .values()
            .filter(move |resource| resource.filing_type == filing_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilingResource> {
        self.resources.values()
    }
}

fn check_resource(resource: &FilingResource) -> Result<(), ConfigurationError> {
    let filing_type = resource.filing_type;
    let entity_type = resource.entity_type;

    if !filing_type.supported_entity_types().contains(&entity_type) {
        return Err(ConfigurationError::UnsupportedEntityType {
            filing_type,
            entity_type,
        });
    }

    if resource.steps.is_empty() {
        return Err(ConfigurationError::EmptySteps {
            filing_type,
            entity_type,
        });
    }

    let mut step_ids = BTreeSet::new();
    let mut sections = BTreeSet::new();
    for (index, step) in resource.steps.iter().enumerate() {
        let expected = u8::try_from(index + 1).unwrap_or(u8::MAX);
        if step.step != expected {
            return Err(ConfigurationError::StepOrder {
                filing_type,
                entity_type,
                step_id: step.id,
                expected,
                found: step.step,
            });
        }
        if !step_ids.insert(step.id) {
            return Err(ConfigurationError::DuplicateStepId {
                filing_type,
                entity_type,
                step_id: step.id,
            });
        }
        for requirement in &step.sections {
            if !sections.insert(requirement.section) {
                return Err(ConfigurationError::DuplicateSection {
                    filing_type,
                    entity_type,
                    section: requirement.section,
                });
            }
        }
    }

    if resource.filing_data.is_empty() {
        return Err(ConfigurationError::MissingFilingData {
            filing_type,
            entity_type,
        });
    }
    if let Some(code) = resource
        .filing_data
        .iter()
        .find(|code| code.entity_type != entity_type)
    {
        return Err(ConfigurationError::FilingDataMismatch {
            filing_type,
            entity_type,
            found: code.entity_type,
        });
    }

    Ok(())
}

fn standard_resources() -> Vec<FilingResource> {
    let mut resources = Vec::new();
    resources.extend(incorporation::resources());
    resources.extend(dissolution::resources());
    resources.extend(restoration::resources());
    resources.extend(amalgamation::resources());
    resources.extend(continuation_out::resources());
    resources
}

pub(crate) fn filing_code(entity_type: EntityType, code: FilingTypeCode) -> Vec<FilingCode> {
    vec![FilingCode {
        entity_type,
        filing_type_code: code,
    }]
}

/// Closing step shared by most filings: delivery, certification, and staff-only extras.
pub(crate) fn review_step(
    number: u8,
    to: &'static str,
    component: &'static str,
    with_effective_date: bool,
) -> Step {
    let mut sections = Vec::new();
    if with_effective_date {
        sections.push(optional(SectionKey::EffectiveDateTime));
    }
    sections.extend([
        required(SectionKey::DocumentDelivery),
        optional(SectionKey::FolioNumber),
        required(SectionKey::Certify),
        optional(SectionKey::CourtOrder),
        required(SectionKey::StaffPayment),
    ]);

    Step {
        id: step_id(number),
        step: number,
        icon: "mdi-text-box-check-outline",
        text: "Review\nand Confirm",
        to,
        component,
        sections,
    }
}

pub(crate) const fn step_id(number: u8) -> &'static str {
    match number {
        1 => "step-1-btn",
        2 => "step-2-btn",
        3 => "step-3-btn",
        4 => "step-4-btn",
        5 => "step-5-btn",
        _ => "step-n-btn",
    }
}

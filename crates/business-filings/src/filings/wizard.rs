//! Wizard controller: step navigation, submission preparation, and the
//! terminal submitted/cancelled states.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::capabilities::FilingCapabilities;
use super::domain::{FilingCode, FilingId, FilingType};
use super::registry::SubmissionError;
use super::resources::{FilingResource, Step};
use super::sections::SectionKey;
use super::session::FilingSession;
use super::template::{self, AssemblyError, FilingDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WizardState {
    Step { index: usize },
    Submitted { filing_id: FilingId },
    Cancelled,
}

impl WizardState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted { .. } | Self::Cancelled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("already at the last step")]
    AtLastStep,
    #[error("step '{0}' has not been visited yet")]
    NotVisited(String),
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("filing is already {0}")]
    Terminal(&'static str),
    #[error("step '{0}' is not complete")]
    StepInvalid(&'static str),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Everything the submitter needs to send one filing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub filing_type: FilingType,
    pub identifier: String,
    pub document: FilingDocument,
    pub filing_codes: Vec<FilingCode>,
}

impl SubmissionRequest {
    pub fn creates_business(&self) -> bool {
        self.filing_type.creates_business()
    }

    /// Request body for the registry filings endpoint.
    pub fn payload(&self) -> Value {
        let mut payload = self.document.to_api_payload();
        payload["filingData"] = json!(self.filing_codes);
        payload
    }
}

/// Progress through one descriptor's steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingWizard {
    state: WizardState,
    step_ids: Vec<&'static str>,
    visited: BTreeSet<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub id: &'static str,
    pub step: u8,
    pub text: &'static str,
    pub valid: bool,
    pub visited: bool,
    pub current: bool,
}

impl FilingWizard {
    pub fn new(resource: &FilingResource) -> Self {
        Self {
            state: WizardState::Step { index: 0 },
            step_ids: resource.steps.iter().map(|step| step.id).collect(),
            visited: BTreeSet::from([0]),
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> Option<&'static str> {
        match self.state {
            WizardState::Step { index } => self.step_ids.get(index).copied(),
            _ => None,
        }
    }

    fn current_index(&self) -> Result<usize, WizardError> {
        match self.state {
            WizardState::Step { index } => Ok(index),
            WizardState::Submitted { .. } => Err(WizardError::Terminal("submitted")),
            WizardState::Cancelled => Err(WizardError::Terminal("cancelled")),
        }
    }

    fn move_to(&mut self, index: usize) -> &'static str {
        self.state = WizardState::Step { index };
        self.visited.insert(index);
        self.step_ids[index]
    }

    /// Advance when the current step is complete.
    pub fn next(&mut self, step_valid: bool) -> Result<&'static str, WizardError> {
        let index = self.current_index()?;
        if index + 1 >= self.step_ids.len() {
            return Err(WizardError::AtLastStep);
        }
        if !step_valid {
            return Err(WizardError::StepInvalid(self.step_ids[index]));
        }
        Ok(self.move_to(index + 1))
    }

    pub fn back(&mut self) -> Result<&'static str, WizardError> {
        let index = self.current_index()?;
        Ok(self.move_to(index.saturating_sub(1)))
    }

    pub fn jump_to(
        &mut self,
        step_id: &str,
        capabilities: &FilingCapabilities,
    ) -> Result<&'static str, WizardError> {
        self.current_index()?;
        let index = self
            .step_ids
            .iter()
            .position(|id| *id == step_id)
            .ok_or_else(|| WizardError::UnknownStep(step_id.to_string()))?;
        if !capabilities.jump_anywhere && !self.visited.contains(&index) {
            return Err(WizardError::NotVisited(step_id.to_string()));
        }
        Ok(self.move_to(index))
    }

    pub fn cancel(&mut self) -> Result<(), WizardError> {
        self.current_index()?;
        self.state = WizardState::Cancelled;
        Ok(())
    }

    /// Assemble the document once every step is complete.
    pub fn prepare_submission(
        &self,
        session: &FilingSession,
        resource: &FilingResource,
    ) -> Result<SubmissionRequest, WizardError> {
        self.current_index()?;
        let document = template::assemble(session, resource)?;
        Ok(SubmissionRequest {
            filing_type: session.filing_type,
            identifier: session.identifier.clone(),
            document,
            filing_codes: resource.filing_data.clone(),
        })
    }

    pub fn complete(&mut self, filing_id: FilingId) -> Result<(), WizardError> {
        self.current_index()?;
        self.state = WizardState::Submitted { filing_id };
        Ok(())
    }

    /// Return to the step owning the section the registry complained about.
    ///
    /// Leaves the state unchanged when no field error names a known section.
    pub fn reject(
        &mut self,
        error: &SubmissionError,
        resource: &FilingResource,
    ) -> Result<Option<&'static str>, WizardError> {
        self.current_index()?;
        let target = error
            .field_errors()
            .iter()
            .find_map(|field_error| owning_step(resource, &field_error.path));

        let Some(step_id) = target else {
            return Ok(None);
        };
        let index = self
            .step_ids
            .iter()
            .position(|id| *id == step_id)
            .ok_or_else(|| WizardError::UnknownStep(step_id.to_string()))?;
        debug!(step_id, "returning to step named by registry error");
        Ok(Some(self.move_to(index)))
    }

    pub fn statuses(
        &self,
        session: &FilingSession,
        resource: &FilingResource,
        capabilities: &FilingCapabilities,
    ) -> Vec<StepStatus> {
        resource
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepStatus {
                id: step.id,
                step: step.step,
                text: step.text,
                valid: step_is_valid(step, session, capabilities),
                visited: self.visited.contains(&index),
                current: self.state == WizardState::Step { index },
            })
            .collect()
    }
}

/// A step is complete when each applicable required section is present and
/// every recorded section it owns is valid.
pub fn step_is_valid(
    step: &Step,
    session: &FilingSession,
    capabilities: &FilingCapabilities,
) -> bool {
    step.sections
        .iter()
        .filter(|req| capabilities.permits(req.section))
        .all(|req| match session.slice(req.section) {
            Some(slice) => slice.valid,
            None => !req.required,
        })
}

/// Deepest section named in an API error path such as
/// `/filing/incorporationApplication/offices/registeredOffice`.
fn owning_step(resource: &FilingResource, path: &str) -> Option<&'static str> {
    path.split(['/', '.'])
        .filter_map(|segment| SectionKey::from_name(segment.trim()))
        .filter_map(|section| resource.owner_of(section))
        .last()
        .map(|step| step.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filings::domain::EntityType;
    use crate::filings::registry::ApiFieldError;
    use crate::filings::resources::ResourceRegistry;

    fn restoration() -> FilingResource {
        ResourceRegistry::standard()
            .expect("standard tables")
            .resource(FilingType::Restoration, EntityType::BenefitCompany)
            .expect("resource")
            .clone()
    }

    fn caps(jump_anywhere: bool) -> FilingCapabilities {
        FilingCapabilities {
            court_order: false,
            staff_payment: false,
            folio_number: false,
            effective_date_time: true,
            share_structure: true,
            jump_anywhere,
        }
    }

    #[test]
    fn next_requires_a_valid_step_and_stops_at_the_end() {
        let resource = restoration();
        let mut wizard = FilingWizard::new(&resource);
        assert_eq!(wizard.current_step(), Some("step-1-btn"));

        assert!(matches!(wizard.next(false), Err(WizardError::StepInvalid("step-1-btn"))));
        assert_eq!(wizard.next(true).expect("advance"), "step-2-btn");
        assert_eq!(wizard.next(true).expect("advance"), "step-3-btn");
        assert_eq!(wizard.next(true).expect("advance"), "step-4-btn");
        assert!(matches!(wizard.next(true), Err(WizardError::AtLastStep)));

        assert_eq!(wizard.back().expect("back"), "step-3-btn");
    }

    #[test]
    fn back_at_first_step_stays_put() {
        let mut wizard = FilingWizard::new(&restoration());
        assert_eq!(wizard.back().expect("back"), "step-1-btn");
    }

    #[test]
    fn jumping_ahead_requires_staff_or_a_visit() {
        let resource = restoration();
        let mut wizard = FilingWizard::new(&resource);
        assert!(matches!(
            wizard.jump_to("step-3-btn", &caps(false)),
            Err(WizardError::NotVisited(_))
        ));
        assert_eq!(wizard.jump_to("step-3-btn", &caps(true)).expect("staff jump"), "step-3-btn");
        assert_eq!(wizard.jump_to("step-1-btn", &caps(false)).expect("visited"), "step-1-btn");
        assert!(matches!(
            wizard.jump_to("step-9-btn", &caps(true)),
            Err(WizardError::UnknownStep(_))
        ));
    }

    #[test]
    fn terminal_states_refuse_transitions() {
        let resource = restoration();
        let mut wizard = FilingWizard::new(&resource);
        wizard.complete(FilingId(42)).expect("complete");
        assert_eq!(wizard.state(), WizardState::Submitted { filing_id: FilingId(42) });
        assert!(matches!(wizard.back(), Err(WizardError::Terminal("submitted"))));

        let mut wizard = FilingWizard::new(&resource);
        wizard.cancel().expect("cancel");
        assert!(matches!(wizard.next(true), Err(WizardError::Terminal("cancelled"))));
        assert!(matches!(wizard.cancel(), Err(WizardError::Terminal("cancelled"))));
    }

    #[test]
    fn rejection_returns_to_the_owning_step() {
        let resource = restoration();
        let mut wizard = FilingWizard::new(&resource);
        let error = SubmissionError::Rejected {
            status: 400,
            message: "invalid filing".to_string(),
            field_errors: vec![ApiFieldError {
                error: "Applicant is required".to_string(),
                path: "/filing/restoration/parties".to_string(),
            }],
        };
        assert_eq!(wizard.reject(&error, &resource).expect("reject"), Some("step-2-btn"));
        assert_eq!(wizard.current_step(), Some("step-2-btn"));

        let unrelated = SubmissionError::Transport("connection reset".to_string());
        assert_eq!(wizard.reject(&unrelated, &resource).expect("reject"), None);
        assert_eq!(wizard.current_step(), Some("step-2-btn"));
    }
}

use super::{filing_code, optional, required, step_id, FilingResource, Step};
use crate::filings::domain::{EntityType, FilingType, FilingTypeCode};
use crate::filings::sections::SectionKey;

pub(super) fn resources() -> Vec<FilingResource> {
    EntityType::corporations()
        .into_iter()
        .map(|entity_type| FilingResource {
            filing_type: FilingType::ConsentContinuationOut,
            entity_type,
            display_name: entity_type.full_description(),
            steps: steps(),
            filing_data: filing_code(entity_type, FilingTypeCode::ConsentContinuationOut),
            details_title: Some("Company Details"),
        })
        .collect()
}

/// The whole filing lives on one page.
fn steps() -> Vec<Step> {
    vec![Step {
        id: step_id(1),
        step: 1,
        icon: "mdi-domain-plus",
        text: "Six Month Consent\nto Continue Out",
        to: "consent-continuation-out",
        component: "ConsentContinuationOut",
        sections: vec![
            required(SectionKey::ConsentContinuationOut),
            required(SectionKey::DocumentDelivery),
            optional(SectionKey::FolioNumber),
            required(SectionKey::Certify),
            optional(SectionKey::CourtOrder),
            required(SectionKey::StaffPayment),
        ],
    }]
}

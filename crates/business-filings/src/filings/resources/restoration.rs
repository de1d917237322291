use super::{filing_code, optional, required, review_step, step_id, FilingResource, Step};
use crate::filings::domain::{EntityType, FilingType, FilingTypeCode};
use crate::filings::sections::SectionKey;

pub(super) fn resources() -> Vec<FilingResource> {
    EntityType::corporations()
        .into_iter()
        .map(|entity_type| FilingResource {
            filing_type: FilingType::Restoration,
            entity_type,
            display_name: entity_type.full_description(),
            steps: steps(),
            filing_data: filing_code(entity_type, FilingTypeCode::RestorationFull),
            details_title: Some("Company Details"),
        })
        .collect()
}

fn steps() -> Vec<Step> {
    vec![
        Step {
            id: step_id(1),
            step: 1,
            icon: "mdi-domain",
            text: "Business Name\nand Type",
            to: "restoration-business-name",
            component: "RestorationBusinessName",
            sections: vec![
                required(SectionKey::Restoration),
                optional(SectionKey::NameRequest),
            ],
        },
        Step {
            id: step_id(2),
            step: 2,
            icon: "mdi-account-multiple-plus",
            text: "Applicant\nInformation",
            to: "restoration-applicant-information",
            component: "RestorationApplicantInformation",
            sections: vec![required(SectionKey::Parties)],
        },
        Step {
            id: step_id(3),
            step: 3,
            icon: "mdi-list-box",
            text: "Business\nInformation",
            to: "restoration-business-information",
            component: "RestorationBusinessInformation",
            sections: vec![
                required(SectionKey::Offices),
                required(SectionKey::ContactPoint),
            ],
        },
        review_step(
            4,
            "restoration-review-confirm",
            "RestorationReviewConfirm",
            false,
        ),
    ]
}

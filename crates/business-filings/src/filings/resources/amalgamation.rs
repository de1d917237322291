use super::{filing_code, required, review_step, step_id, FilingResource, Step};
use crate::filings::domain::{EntityType, FilingType, FilingTypeCode};
use crate::filings::sections::SectionKey;

pub(super) fn resources() -> Vec<FilingResource> {
    EntityType::corporations()
        .into_iter()
        .map(|entity_type| FilingResource {
            filing_type: FilingType::AmalgamationApplication,
            entity_type,
            display_name: entity_type.full_description(),
            steps: steps(),
            filing_data: filing_code(entity_type, FilingTypeCode::AmalgamationRegular),
            details_title: Some("Amalgamated Company Details"),
        })
        .collect()
}

fn steps() -> Vec<Step> {
    vec![
        Step {
            id: step_id(1),
            step: 1,
            icon: "mdi-domain",
            text: "Amalgamation\nInformation",
            to: "amalgamation-regular-information",
            component: "AmalgRegInformation",
            sections: vec![
                required(SectionKey::Amalgamation),
                required(SectionKey::NameRequest),
            ],
        },
        Step {
            id: step_id(2),
            step: 2,
            icon: "mdi-account-multiple-plus",
            text: "Add People\nand Roles",
            to: "amalgamation-regular-people-roles",
            component: "AmalgRegPeopleRoles",
            sections: vec![required(SectionKey::Parties)],
        },
        Step {
            id: step_id(3),
            step: 3,
            icon: "mdi-list-box",
            text: "Business\nInformation",
            to: "amalgamation-regular-business-info",
            component: "AmalgRegBusinessInfo",
            sections: vec![
                required(SectionKey::Offices),
                required(SectionKey::ContactPoint),
            ],
        },
        Step {
            id: step_id(4),
            step: 4,
            icon: "mdi-sitemap",
            text: "Create Share\nStructure",
            to: "amalgamation-regular-share-structure",
            component: "AmalgRegShareStructure",
            sections: vec![required(SectionKey::ShareStructure)],
        },
        review_step(
            5,
            "amalgamation-regular-review-confirm",
            "AmalgRegReviewConfirm",
            true,
        ),
    ]
}

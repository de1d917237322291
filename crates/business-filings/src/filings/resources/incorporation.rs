use super::{filing_code, optional, required, review_step, step_id, FilingResource, Step};
use crate::filings::domain::{EntityType, FilingType, FilingTypeCode};
use crate::filings::sections::SectionKey;

pub(super) fn resources() -> Vec<FilingResource> {
    let mut resources: Vec<FilingResource> = EntityType::corporations()
        .into_iter()
        .map(|entity_type| FilingResource {
            filing_type: FilingType::IncorporationApplication,
            entity_type,
            display_name: entity_type.full_description(),
            steps: corporation_steps(),
            filing_data: filing_code(entity_type, FilingTypeCode::IncorporationBc),
            details_title: Some("Company Details"),
        })
        .collect();

    resources.push(FilingResource {
        filing_type: FilingType::IncorporationApplication,
        entity_type: EntityType::Cooperative,
        display_name: EntityType::Cooperative.full_description(),
        steps: cooperative_steps(),
        filing_data: filing_code(
            EntityType::Cooperative,
            FilingTypeCode::IncorporationCooperative,
        ),
        details_title: Some("Association Details"),
    });

    resources
}

fn define_step(text: &'static str) -> Step {
    Step {
        id: step_id(1),
        step: 1,
        icon: "mdi-domain",
        text,
        to: "define-company",
        component: "IncorporationDefineCompany",
        sections: vec![
            required(SectionKey::NameRequest),
            required(SectionKey::Offices),
            required(SectionKey::ContactPoint),
        ],
    }
}

fn people_step() -> Step {
    Step {
        id: step_id(2),
        step: 2,
        icon: "mdi-account-multiple-plus",
        text: "Add People\nand Roles",
        to: "add-people-and-roles",
        component: "IncorporationPeopleRoles",
        sections: vec![required(SectionKey::Parties)],
    }
}

fn corporation_steps() -> Vec<Step> {
    vec![
        define_step("Define Your\nCompany"),
        people_step(),
        Step {
            id: step_id(3),
            step: 3,
            icon: "mdi-sitemap",
            text: "Create Share\nStructure",
            to: "create-share-structure",
            component: "IncorporationShareStructure",
            sections: vec![required(SectionKey::ShareStructure)],
        },
        Step {
            id: step_id(4),
            step: 4,
            icon: "mdi-handshake",
            text: "Upload Incorporation\nAgreement",
            to: "incorporation-agreement",
            component: "IncorporationAgreement",
            sections: vec![required(SectionKey::IncorporationAgreement)],
        },
        review_step(5, "incorporation-review-confirm", "IncorporationReviewConfirm", true),
    ]
}

fn cooperative_steps() -> Vec<Step> {
    vec![
        define_step("Define Your\nAssociation"),
        people_step(),
        Step {
            id: step_id(3),
            step: 3,
            icon: "mdi-format-list-text",
            text: "Create\nRules",
            to: "incorporation-rules",
            component: "IncorporationRules",
            sections: vec![required(SectionKey::Rules)],
        },
        Step {
            id: step_id(4),
            step: 4,
            icon: "mdi-text-box-multiple",
            text: "Create\nMemorandum",
            to: "incorporation-memorandum",
            component: "IncorporationMemorandum",
            sections: vec![required(SectionKey::Memorandum)],
        },
        Step {
            id: step_id(5),
            step: 5,
            icon: "mdi-text-box-check-outline",
            text: "Review\nand Confirm",
            to: "incorporation-review-confirm",
            component: "IncorporationReviewConfirm",
            sections: vec![
                required(SectionKey::DocumentDelivery),
                optional(SectionKey::FolioNumber),
                required(SectionKey::Certify),
                required(SectionKey::StaffPayment),
            ],
        },
    ]
}

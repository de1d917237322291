use super::{filing_code, optional, required, review_step, step_id, FilingResource, Step};
use crate::filings::domain::{EntityType, FilingType, FilingTypeCode};
use crate::filings::sections::SectionKey;

pub(super) fn resources() -> Vec<FilingResource> {
    EntityType::ordered()
        .into_iter()
        .map(|entity_type| FilingResource {
            filing_type: FilingType::Dissolution,
            entity_type,
            display_name: entity_type.full_description(),
            steps: steps(entity_type),
            filing_data: filing_code(entity_type, FilingTypeCode::DissolutionVoluntary),
            details_title: None,
        })
        .collect()
}

fn steps(entity_type: EntityType) -> Vec<Step> {
    let cooperative = entity_type == EntityType::Cooperative;
    let text = if cooperative {
        "Dissolution\nStatement and Affidavit"
    } else {
        "Define\nDissolution"
    };
    // Cooperatives appoint no custodian of records.
    let parties = if cooperative {
        optional(SectionKey::Parties)
    } else {
        required(SectionKey::Parties)
    };

    vec![
        Step {
            id: step_id(1),
            step: 1,
            icon: "mdi-domain-remove",
            text,
            to: "define-dissolution",
            component: "DissolutionDefineDissolution",
            sections: vec![
                required(SectionKey::DissolutionStatement),
                parties,
                required(SectionKey::Resolution),
                required(SectionKey::Affidavit),
            ],
        },
        review_step(
            2,
            "dissolution-review-confirm",
            "DissolutionReviewConfirm",
            true,
        ),
    ]
}

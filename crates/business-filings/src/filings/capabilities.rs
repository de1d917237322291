//! Capability resolution shared by the step validators, the assembler, and the wizard.

use serde::{Deserialize, Serialize};

use super::domain::{EntityType, FilingType};
use super::sections::SectionKey;

pub const STAFF_ROLE: &str = "staff";

/// What an entity type supports, independent of who is filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCapabilities {
    pub supports_effective_date_time: bool,
    pub supports_share_structure: bool,
    pub requires_records_office: bool,
    pub minimum_directors: usize,
    pub court_order_filings: &'static [FilingType],
}

const ALL_FILINGS: [FilingType; 5] = FilingType::ordered();

const CORPORATION: EntityCapabilities = EntityCapabilities {
    supports_effective_date_time: true,
    supports_share_structure: true,
    requires_records_office: true,
    minimum_directors: 1,
    court_order_filings: &ALL_FILINGS,
};

const COOPERATIVE: EntityCapabilities = EntityCapabilities {
    supports_effective_date_time: false,
    supports_share_structure: false,
    requires_records_office: false,
    minimum_directors: 3,
    court_order_filings: &[FilingType::Dissolution],
};

pub const fn entity_capabilities(entity_type: EntityType) -> &'static EntityCapabilities {
    match entity_type {
        EntityType::BenefitCompany
        | EntityType::LimitedCompany
        | EntityType::UnlimitedLiabilityCompany
        | EntityType::CommunityContributionCompany => &CORPORATION,
        EntityType::Cooperative => &COOPERATIVE,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Basic,
    Premium,
}

/// Who is driving the wizard, as supplied by the authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub account_type: AccountType,
}

impl ActorContext {
    pub fn staff() -> Self {
        Self {
            roles: vec![STAFF_ROLE.to_string()],
            account_type: AccountType::Basic,
        }
    }

    pub fn premium() -> Self {
        Self {
            roles: Vec::new(),
            account_type: AccountType::Premium,
        }
    }

    pub fn user_capabilities(&self) -> UserCapabilities {
        UserCapabilities {
            staff: self
                .roles
                .iter()
                .any(|role| role.trim().eq_ignore_ascii_case(STAFF_ROLE)),
            premium: self.account_type == AccountType::Premium,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCapabilities {
    pub staff: bool,
    pub premium: bool,
}

/// Resolved switches for one filing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingCapabilities {
    pub court_order: bool,
    pub staff_payment: bool,
    pub folio_number: bool,
    pub effective_date_time: bool,
    pub share_structure: bool,
    pub jump_anywhere: bool,
}

impl FilingCapabilities {
    /// Whether a section may appear in the assembled document at all.
    pub fn permits(&self, section: SectionKey) -> bool {
        match section {
            SectionKey::CourtOrder => self.court_order,
            SectionKey::StaffPayment => self.staff_payment,
            SectionKey::FolioNumber => self.folio_number,
            SectionKey::EffectiveDateTime => self.effective_date_time,
            SectionKey::ShareStructure => self.share_structure,
            _ => true,
        }
    }
}

pub fn resolve(
    filing_type: FilingType,
    entity_type: EntityType,
    actor: &ActorContext,
) -> FilingCapabilities {
    let entity = entity_capabilities(entity_type);
    let user = actor.user_capabilities();

    FilingCapabilities {
        court_order: user.staff && entity.court_order_filings.contains(&filing_type),
        staff_payment: user.staff,
        folio_number: user.premium && !user.staff,
        effective_date_time: entity.supports_effective_date_time,
        share_structure: entity.supports_share_structure,
        jump_anywhere: user.staff,
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{
    Affidavit, AmalgamationDetails, Certification, ContactPoint, ContinuationOutDetails,
    CourtOrder, DissolutionStatement, DocumentDelivery, DocumentUpload, EffectiveDateTime,
    IncorporationAgreement, NameRequest, OfficeAddresses, OrgPerson, Resolution,
    RestorationDetails, ShareStructure, StaffPayment,
};

/// Canonical section names of an assembled filing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    Business,
    NameRequest,
    Offices,
    ContactPoint,
    Parties,
    ShareStructure,
    IncorporationAgreement,
    Rules,
    Memorandum,
    DissolutionStatement,
    Affidavit,
    Resolution,
    Restoration,
    Amalgamation,
    ConsentContinuationOut,
    CourtOrder,
    StaffPayment,
    Certify,
    DocumentDelivery,
    FolioNumber,
    EffectiveDateTime,
}

impl SectionKey {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::NameRequest => "nameRequest",
            Self::Offices => "offices",
            Self::ContactPoint => "contactPoint",
            Self::Parties => "parties",
            Self::ShareStructure => "shareStructure",
            Self::IncorporationAgreement => "incorporationAgreement",
            Self::Rules => "rules",
            Self::Memorandum => "memorandum",
            Self::DissolutionStatement => "dissolutionStatement",
            Self::Affidavit => "affidavit",
            Self::Resolution => "resolution",
            Self::Restoration => "restoration",
            Self::Amalgamation => "amalgamation",
            Self::ConsentContinuationOut => "consentContinuationOut",
            Self::CourtOrder => "courtOrder",
            Self::StaffPayment => "staffPayment",
            Self::Certify => "certify",
            Self::DocumentDelivery => "documentDelivery",
            Self::FolioNumber => "folioNumber",
            Self::EffectiveDateTime => "effectiveDateTime",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }

    pub const fn ordered() -> [Self; 21] {
        [
            Self::Business,
            Self::NameRequest,
            Self::Offices,
            Self::ContactPoint,
            Self::Parties,
            Self::ShareStructure,
            Self::IncorporationAgreement,
            Self::Rules,
            Self::Memorandum,
            Self::DissolutionStatement,
            Self::Affidavit,
            Self::Resolution,
            Self::Restoration,
            Self::Amalgamation,
            Self::ConsentContinuationOut,
            Self::CourtOrder,
            Self::StaffPayment,
            Self::Certify,
            Self::DocumentDelivery,
            Self::FolioNumber,
            Self::EffectiveDateTime,
        ]
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data captured by a wizard step for one section of the filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "camelCase")]
pub enum SectionData {
    NameRequest(NameRequest),
    Offices(OfficeAddresses),
    ContactPoint(ContactPoint),
    Parties(Vec<OrgPerson>),
    ShareStructure(ShareStructure),
    IncorporationAgreement(IncorporationAgreement),
    Rules(DocumentUpload),
    Memorandum(DocumentUpload),
    DissolutionStatement(DissolutionStatement),
    Affidavit(Affidavit),
    Resolution(Resolution),
    Restoration(RestorationDetails),
    Amalgamation(AmalgamationDetails),
    ConsentContinuationOut(ContinuationOutDetails),
    CourtOrder(CourtOrder),
    StaffPayment(StaffPayment),
    Certify(Certification),
    DocumentDelivery(DocumentDelivery),
    FolioNumber(String),
    EffectiveDateTime(EffectiveDateTime),
}

impl SectionData {
    pub fn key(&self) -> SectionKey {
        match self {
            Self::NameRequest(_) => SectionKey::NameRequest,
            Self::Offices(_) => SectionKey::Offices,
            Self::ContactPoint(_) => SectionKey::ContactPoint,
            Self::Parties(_) => SectionKey::Parties,
            Self::ShareStructure(_) => SectionKey::ShareStructure,
            Self::IncorporationAgreement(_) => SectionKey::IncorporationAgreement,
            Self::Rules(_) => SectionKey::Rules,
            Self::Memorandum(_) => SectionKey::Memorandum,
            Self::DissolutionStatement(_) => SectionKey::DissolutionStatement,
            Self::Affidavit(_) => SectionKey::Affidavit,
            Self::Resolution(_) => SectionKey::Resolution,
            Self::Restoration(_) => SectionKey::Restoration,
            Self::Amalgamation(_) => SectionKey::Amalgamation,
            Self::ConsentContinuationOut(_) => SectionKey::ConsentContinuationOut,
            Self::CourtOrder(_) => SectionKey::CourtOrder,
            Self::StaffPayment(_) => SectionKey::StaffPayment,
            Self::Certify(_) => SectionKey::Certify,
            Self::DocumentDelivery(_) => SectionKey::DocumentDelivery,
            Self::FolioNumber(_) => SectionKey::FolioNumber,
            Self::EffectiveDateTime(_) => SectionKey::EffectiveDateTime,
        }
    }

    /// JSON body of the section as it appears in the assembled document.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::NameRequest(data) => serde_json::to_value(data),
            Self::Offices(data) => serde_json::to_value(data),
            Self::ContactPoint(data) => serde_json::to_value(data),
            Self::Parties(data) => serde_json::to_value(data),
            Self::ShareStructure(data) => serde_json::to_value(data),
            Self::IncorporationAgreement(data) => serde_json::to_value(data),
            Self::Rules(data) | Self::Memorandum(data) => serde_json::to_value(data),
            Self::DissolutionStatement(data) => serde_json::to_value(data),
            Self::Affidavit(data) => serde_json::to_value(data),
            Self::Resolution(data) => serde_json::to_value(data),
            Self::Restoration(data) => serde_json::to_value(data),
            Self::Amalgamation(data) => serde_json::to_value(data),
            Self::ConsentContinuationOut(data) => serde_json::to_value(data),
            Self::CourtOrder(data) => serde_json::to_value(data),
            Self::StaffPayment(data) => serde_json::to_value(data),
            Self::Certify(data) => serde_json::to_value(data),
            Self::DocumentDelivery(data) => serde_json::to_value(data),
            Self::FolioNumber(data) => serde_json::to_value(data),
            Self::EffectiveDateTime(data) => serde_json::to_value(data),
        }
    }
}

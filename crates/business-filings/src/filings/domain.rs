use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Corporate form governing which filing sections apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "BEN")]
    BenefitCompany,
    #[serde(rename = "BC")]
    LimitedCompany,
    #[serde(rename = "ULC")]
    UnlimitedLiabilityCompany,
    #[serde(rename = "CC")]
    CommunityContributionCompany,
    #[serde(rename = "CP")]
    Cooperative,
}

impl EntityType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::BenefitCompany,
            Self::LimitedCompany,
            Self::UnlimitedLiabilityCompany,
            Self::CommunityContributionCompany,
            Self::Cooperative,
        ]
    }

    pub const fn corporations() -> [Self; 4] {
        [
            Self::BenefitCompany,
            Self::LimitedCompany,
            Self::UnlimitedLiabilityCompany,
            Self::CommunityContributionCompany,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::BenefitCompany => "BEN",
            Self::LimitedCompany => "BC",
            Self::UnlimitedLiabilityCompany => "ULC",
            Self::CommunityContributionCompany => "CC",
            Self::Cooperative => "CP",
        }
    }

    pub const fn full_description(self) -> &'static str {
        match self {
            Self::BenefitCompany => "BC Benefit Company",
            Self::LimitedCompany => "BC Limited Company",
            Self::UnlimitedLiabilityCompany => "BC Unlimited Liability Company",
            Self::CommunityContributionCompany => "BC Community Contribution Company",
            Self::Cooperative => "Cooperative Association",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for EntityType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|entity_type| entity_type.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCode::EntityType(value.to_string()))
    }
}

/// Lifecycle state of a business as reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityState {
    Active,
    Historical,
    Liquidation,
}

impl EntityState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Historical => "Historical",
            Self::Liquidation => "Liquidation",
        }
    }
}

/// Filings the wizard knows how to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingType {
    IncorporationApplication,
    Dissolution,
    Restoration,
    AmalgamationApplication,
    ConsentContinuationOut,
}

impl FilingType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::IncorporationApplication,
            Self::Dissolution,
            Self::Restoration,
            Self::AmalgamationApplication,
            Self::ConsentContinuationOut,
        ]
    }

    /// Registry name of the filing, used as the body key of the API payload.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IncorporationApplication => "incorporationApplication",
            Self::Dissolution => "dissolution",
            Self::Restoration => "restoration",
            Self::AmalgamationApplication => "amalgamationApplication",
            Self::ConsentContinuationOut => "consentContinuationOut",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::IncorporationApplication => "Incorporation Application",
            Self::Dissolution => "Voluntary Dissolution",
            Self::Restoration => "Restoration Application",
            Self::AmalgamationApplication => "Amalgamation Application (Regular)",
            Self::ConsentContinuationOut => "Six Month Consent to Continue Out",
        }
    }

    pub fn supported_entity_types(self) -> &'static [EntityType] {
        const ALL: [EntityType; 5] = EntityType::ordered();
        const CORPORATIONS: [EntityType; 4] = EntityType::corporations();
        match self {
            Self::IncorporationApplication | Self::Dissolution => &ALL,
            Self::Restoration | Self::AmalgamationApplication | Self::ConsentContinuationOut => {
                &CORPORATIONS
            }
        }
    }

    /// Filings that bring a new business into existence are keyed by a temporary identifier.
    pub const fn creates_business(self) -> bool {
        matches!(
            self,
            Self::IncorporationApplication | Self::AmalgamationApplication
        )
    }

    /// States an existing business must be in for this filing to start.
    pub fn permitted_states(self) -> &'static [EntityState] {
        match self {
            Self::Dissolution | Self::ConsentContinuationOut => &[EntityState::Active],
            Self::Restoration => &[EntityState::Historical],
            Self::IncorporationApplication | Self::AmalgamationApplication => &[],
        }
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilingType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();
        Self::ordered()
            .into_iter()
            .find(|filing_type| filing_type.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownCode::FilingType(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownCode {
    #[error("unknown entity type '{0}'")]
    EntityType(String),
    #[error("unknown filing type '{0}'")]
    FilingType(String),
}

/// Fee codes the registry expects alongside a submitted filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingTypeCode {
    #[serde(rename = "BCINC")]
    IncorporationBc,
    #[serde(rename = "OTINC")]
    IncorporationCooperative,
    #[serde(rename = "DIS_VOL")]
    DissolutionVoluntary,
    #[serde(rename = "RESTF")]
    RestorationFull,
    #[serde(rename = "AMALR")]
    AmalgamationRegular,
    #[serde(rename = "CONTO")]
    ConsentContinuationOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingCode {
    pub entity_type: EntityType,
    pub filing_type_code: FilingTypeCode,
}

/// Identifier returned by the registry for an accepted filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingId(pub u64);

impl fmt::Display for FilingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address_additional: Option<String>,
    pub address_city: String,
    pub address_region: String,
    pub postal_code: String,
    pub address_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_instructions: Option<String>,
}

impl Address {
    /// Names of required address fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("streetAddress", &self.street_address),
            ("addressCity", &self.address_city),
            ("addressRegion", &self.address_region),
            ("postalCode", &self.postal_code),
            ("addressCountry", &self.address_country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeAddress {
    pub delivery_address: Address,
    pub mailing_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeAddresses {
    pub registered_office: OfficeAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_office: Option<OfficeAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateName {
    pub name: String,
    #[serde(default)]
    pub name_type: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessWarning {
    pub code: String,
    pub message: String,
    pub warning_type: String,
    pub filing: String,
}

/// Business as returned by the registry Business API.
///
/// Fields the wizard never reads are optional so older or newer API
/// revisions still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessEntity {
    pub identifier: String,
    pub legal_type: EntityType,
    #[serde(default)]
    pub legal_name: String,
    pub state: EntityState,
    #[serde(default)]
    pub office_address: Option<OfficeAddresses>,
    #[serde(default)]
    pub business_contact: Option<ContactPoint>,
    #[serde(default)]
    pub warnings: Vec<BusinessWarning>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub alternate_names: Vec<AlternateName>,
    #[serde(default)]
    pub admin_freeze: bool,
    #[serde(default = "default_good_standing")]
    pub good_standing: bool,
    #[serde(default)]
    pub has_restrictions: bool,
    #[serde(default)]
    pub founding_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub state_filing: Option<String>,
    #[serde(default)]
    pub last_address_change_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_annual_report_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_director_change_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_annual_report: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ar_min_date: Option<NaiveDate>,
    #[serde(default)]
    pub ar_max_date: Option<NaiveDate>,
    #[serde(default)]
    pub dissolution_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fiscal_year_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_annual_general_meeting_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_ledger_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitter: Option<String>,
}

fn default_good_standing() -> bool {
    true
}

impl BusinessEntity {
    /// Business in good standing with only the fields the wizard reads.
    pub fn new(
        identifier: impl Into<String>,
        legal_type: EntityType,
        legal_name: impl Into<String>,
        state: EntityState,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            legal_type,
            legal_name: legal_name.into(),
            state,
            office_address: None,
            business_contact: None,
            warnings: Vec::new(),
            tax_id: None,
            alternate_names: Vec::new(),
            admin_freeze: false,
            good_standing: true,
            has_restrictions: false,
            founding_date: None,
            start_date: None,
            state_filing: None,
            last_address_change_date: None,
            last_annual_report_date: None,
            last_director_change_date: None,
            next_annual_report: None,
            ar_min_date: None,
            ar_max_date: None,
            dissolution_date: None,
            fiscal_year_end_date: None,
            last_annual_general_meeting_date: None,
            last_ledger_timestamp: None,
            last_modified: None,
            submitter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    Person,
    Organization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub party_type: PartyType,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    #[serde(rename = "Completing Party")]
    CompletingParty,
    Incorporator,
    Director,
    Custodian,
    Applicant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_type: RoleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
}

/// Person or organization together with the roles it holds in the filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgPerson {
    pub officer: Officer,
    pub roles: Vec<Role>,
    pub mailing_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
}

impl OrgPerson {
    pub fn has_role(&self, role_type: RoleType) -> bool {
        self.roles.iter().any(|role| role.role_type == role_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRequest {
    pub legal_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nr_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSeries {
    pub name: String,
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_number_of_shares: Option<u64>,
    #[serde(default)]
    pub has_rights_or_restrictions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareClass {
    pub name: String,
    pub priority: u32,
    #[serde(default)]
    pub has_maximum_shares: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_number_of_shares: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub has_rights_or_restrictions: bool,
    #[serde(default)]
    pub series: Vec<ShareSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStructure {
    pub share_classes: Vec<ShareClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncorporationAgreement {
    pub agreement_type: String,
}

/// Uploaded document plus the filer's confirmation that it is the final copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DissolutionStatement {
    pub dissolution_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolution_statement_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affidavit {
    pub affidavit_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affidavit_file_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub resolution_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_person: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestorationType {
    FullRestoration,
    LimitedRestoration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalType {
    CourtOrder,
    Registrar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationDetails {
    #[serde(rename = "type")]
    pub restoration_type: RestorationType,
    pub approval_type: ApprovalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_order_number: Option<String>,
    #[serde(default)]
    pub relationships: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmalgamatingRole {
    Amalgamating,
    Holding,
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmalgamatingBusiness {
    pub identifier: String,
    pub legal_name: String,
    pub role: AmalgamatingRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmalgamationDetails {
    #[serde(rename = "type")]
    pub amalgamation_type: String,
    pub amalgamating_businesses: Vec<AmalgamatingBusiness>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignJurisdiction {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationOutDetails {
    pub foreign_jurisdiction: ForeignJurisdiction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtOrder {
    #[serde(default)]
    pub file_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_plan_of_arrangement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffPaymentOption {
    None,
    Fas,
    Bcol,
    NoFee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayment {
    pub option: StaffPaymentOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_slip_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcol_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folio_number: Option<String>,
    #[serde(default)]
    pub is_priority: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub certified_by: String,
    pub is_certified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDelivery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completing_party_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_optional_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveDateTime {
    pub is_future_effective: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<DateTime<Utc>>,
}

//! Section validators behind each wizard step.
//!
//! Validation never fails as a fault: every problem becomes a [`FieldError`]
//! attached to the section slice so the caller can show it next to the field.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::capabilities::{entity_capabilities, FilingCapabilities};
use super::domain::{
    Address, AmalgamationDetails, ApprovalType, Certification, ContactPoint,
    ContinuationOutDetails, CourtOrder, DocumentDelivery, DocumentUpload, EffectiveDateTime,
    EntityType, FilingType, NameRequest, OfficeAddresses, OrgPerson, PartyType,
    RestorationDetails, RestorationType, RoleType, ShareStructure, StaffPayment,
    StaffPaymentOption,
};
use super::rules::{self, ValidationRule};
use super::sections::{SectionData, SectionKey};

/// Latest a future effective filing may be scheduled, counted from the filing date.
pub const MAX_FUTURE_EFFECTIVE_DAYS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub section: SectionKey,
    pub field: String,
    pub message: String,
}

/// Everything a validator may consult besides the section data itself.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub filing_type: FilingType,
    pub entity_type: EntityType,
    pub capabilities: FilingCapabilities,
    pub staff: bool,
    pub filing_date: NaiveDate,
}

struct Findings {
    section: SectionKey,
    errors: Vec<FieldError>,
}

impl Findings {
    fn new(section: SectionKey) -> Self {
        Self {
            section,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            section: self.section,
            field: field.into(),
            message: message.into(),
        });
    }

    fn check(&mut self, field: impl Into<String>, rules: &[ValidationRule], value: &str) {
        if let Err(message) = rules::validate(rules, value) {
            self.push(field, message);
        }
    }

    fn require(&mut self, field: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "Required");
        }
    }

    fn address(&mut self, prefix: &str, address: &Address) {
        for missing in address.missing_fields() {
            self.push(format!("{prefix}.{missing}"), "Required");
        }
    }
}

/// Validate one section against the rules that apply to this filing.
pub fn validate_section(data: &SectionData, ctx: &StepContext) -> Vec<FieldError> {
    let mut findings = Findings::new(data.key());

    match data {
        SectionData::NameRequest(name_request) => name_request_rules(&mut findings, name_request, ctx),
        SectionData::Offices(offices) => office_rules(&mut findings, offices, ctx),
        SectionData::ContactPoint(contact) => contact_rules(&mut findings, contact),
        SectionData::Parties(parties) => party_rules(&mut findings, parties, ctx),
        SectionData::ShareStructure(structure) => share_rules(&mut findings, structure),
        SectionData::IncorporationAgreement(agreement) => {
            findings.require("agreementType", &agreement.agreement_type);
        }
        SectionData::Rules(upload) | SectionData::Memorandum(upload) => {
            upload_rules(&mut findings, upload);
        }
        SectionData::DissolutionStatement(statement) => {
            findings.require("dissolutionType", &statement.dissolution_type);
            if ctx.entity_type == EntityType::Cooperative
                && statement.dissolution_statement_type.is_none()
            {
                findings.push("dissolutionStatementType", "Required");
            }
        }
        SectionData::Affidavit(affidavit) => {
            if !affidavit.affidavit_confirmed {
                findings.push("affidavitConfirmed", "Affidavit must be confirmed");
            }
        }
        SectionData::Resolution(resolution) => {
            findings.require("resolutionText", &resolution.resolution_text);
            if resolution
                .resolution_date
                .is_some_and(|date| date > ctx.filing_date)
            {
                findings.push("resolutionDate", "Date cannot be in the future");
            }
        }
        SectionData::Restoration(details) => restoration_rules(&mut findings, details, ctx),
        SectionData::Amalgamation(details) => amalgamation_rules(&mut findings, details),
        SectionData::ConsentContinuationOut(details) => continuation_out_rules(&mut findings, details),
        SectionData::CourtOrder(order) => court_order_rules(&mut findings, order, ctx),
        SectionData::StaffPayment(payment) => staff_payment_rules(&mut findings, payment),
        SectionData::Certify(certification) => certify_rules(&mut findings, certification),
        SectionData::DocumentDelivery(delivery) => delivery_rules(&mut findings, delivery, ctx),
        SectionData::FolioNumber(folio) => {
            findings.check("folioNumber", rules::FOLIO_NUMBER_RULES, folio);
        }
        SectionData::EffectiveDateTime(effective) => effective_date_rules(&mut findings, effective, ctx),
    }

    findings.errors
}

fn name_request_rules(findings: &mut Findings, name_request: &NameRequest, ctx: &StepContext) {
    if name_request.legal_type != ctx.entity_type {
        findings.push(
            "legalType",
            format!("Name request is for a {} business", name_request.legal_type),
        );
    }
    if let Some(number) = &name_request.nr_number {
        let digits = number.trim().trim_start_matches("NR").trim();
        if digits.len() != 7 || !digits.chars().all(|c| c.is_ascii_digit()) {
            findings.push("nrNumber", "Enter a valid NR number");
        }
    }
    if let Some(name) = &name_request.legal_name {
        findings.require("legalName", name);
    }
}

fn office_rules(findings: &mut Findings, offices: &OfficeAddresses, ctx: &StepContext) {
    findings.address(
        "registeredOffice.deliveryAddress",
        &offices.registered_office.delivery_address,
    );
    findings.address(
        "registeredOffice.mailingAddress",
        &offices.registered_office.mailing_address,
    );

    match &offices.records_office {
        Some(records) => {
            findings.address("recordsOffice.deliveryAddress", &records.delivery_address);
            findings.address("recordsOffice.mailingAddress", &records.mailing_address);
        }
        None if entity_capabilities(ctx.entity_type).requires_records_office => {
            findings.push("recordsOffice", "Required");
        }
        None => {}
    }
}

fn contact_rules(findings: &mut Findings, contact: &ContactPoint) {
    findings.check("email", rules::EMAIL_RULES, &contact.email);
    if let Some(phone) = &contact.phone {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if digits != 10 {
            findings.push("phone", "Enter a valid phone number");
        }
    }
    if let Some(extension) = &contact.extension {
        if extension.len() > 5 || !extension.chars().all(|c| c.is_ascii_digit()) {
            findings.push("extension", "Enter a valid extension");
        }
    }
}

fn party_rules(findings: &mut Findings, parties: &[OrgPerson], ctx: &StepContext) {
    for (index, party) in parties.iter().enumerate() {
        let officer = &party.officer;
        match officer.party_type {
            PartyType::Person => {
                findings.check(
                    format!("parties[{index}].firstName"),
                    rules::FIRST_NAME_RULES,
                    &officer.first_name,
                );
                if let Some(middle) = &officer.middle_name {
                    findings.check(
                        format!("parties[{index}].middleName"),
                        rules::MIDDLE_NAME_RULES,
                        middle,
                    );
                }
                findings.check(
                    format!("parties[{index}].lastName"),
                    rules::LAST_NAME_RULES,
                    &officer.last_name,
                );
            }
            PartyType::Organization => findings.require(
                format!("parties[{index}].organizationName"),
                officer.organization_name.as_deref().unwrap_or_default(),
            ),
        }
        if let Some(email) = &officer.email {
            findings.check(format!("parties[{index}].email"), rules::EMAIL_RULES, email);
        }
        if party.roles.is_empty() {
            findings.push(format!("parties[{index}].roles"), "At least one role is required");
        }
        findings.address(&format!("parties[{index}].mailingAddress"), &party.mailing_address);
    }

    let count = |role: RoleType| parties.iter().filter(|party| party.has_role(role)).count();
    let mut require_role = |role: RoleType, minimum: usize, message: &str| {
        if count(role) < minimum {
            findings.push("roles", message);
        }
    };

    match ctx.filing_type {
        FilingType::IncorporationApplication => {
            require_role(RoleType::CompletingParty, 1, "A completing party is required");
            let minimum = entity_capabilities(ctx.entity_type).minimum_directors;
            let message = format!("At least {minimum} director(s) required");
            require_role(RoleType::Director, minimum, &message);
            if ctx.entity_type != EntityType::Cooperative {
                require_role(RoleType::Incorporator, 1, "An incorporator is required");
            }
        }
        FilingType::AmalgamationApplication => {
            require_role(RoleType::CompletingParty, 1, "A completing party is required");
            require_role(RoleType::Director, 1, "At least 1 director(s) required");
        }
        FilingType::Dissolution if ctx.entity_type != EntityType::Cooperative => {
            require_role(RoleType::Custodian, 1, "A custodian of records is required");
        }
        FilingType::Restoration => {
            require_role(RoleType::Applicant, 1, "An applicant is required");
        }
        FilingType::Dissolution | FilingType::ConsentContinuationOut => {}
    }
}

fn share_rules(findings: &mut Findings, structure: &ShareStructure) {
    if structure.share_classes.is_empty() {
        findings.push("shareClasses", "At least one share class is required");
    }

    let mut names = BTreeSet::new();
    for (index, class) in structure.share_classes.iter().enumerate() {
        findings.require(format!("shareClasses[{index}].name"), &class.name);
        if !names.insert(class.name.trim().to_ascii_lowercase()) {
            findings.push(format!("shareClasses[{index}].name"), "Share class name must be unique");
        }
        if class.has_maximum_shares && class.max_number_of_shares.is_none() {
            findings.push(format!("shareClasses[{index}].maxNumberOfShares"), "Required");
        }
        if class.par_value.is_some() && class.currency.is_none() {
            findings.push(format!("shareClasses[{index}].currency"), "Required");
        }
        for (series_index, series) in class.series.iter().enumerate() {
            let field = format!("shareClasses[{index}].series[{series_index}]");
            findings.require(format!("{field}.name"), &series.name);
            if let (Some(series_max), Some(class_max)) =
                (series.max_number_of_shares, class.max_number_of_shares)
            {
                if series_max > class_max {
                    findings.push(
                        format!("{field}.maxNumberOfShares"),
                        "Cannot exceed the share class maximum",
                    );
                }
            }
        }
    }
}

fn upload_rules(findings: &mut Findings, upload: &DocumentUpload) {
    if upload.file_key.as_deref().map_or(true, str::is_empty) {
        findings.push("fileKey", "A document must be uploaded");
    }
    if !upload.confirmed {
        findings.push("confirmed", "Confirmation is required");
    }
}

fn restoration_rules(findings: &mut Findings, details: &RestorationDetails, ctx: &StepContext) {
    if details.restoration_type == RestorationType::LimitedRestoration {
        match details.expiry {
            None => findings.push("expiry", "Required"),
            Some(expiry) if expiry <= ctx.filing_date => {
                findings.push("expiry", "Expiry must be in the future");
            }
            Some(_) => {}
        }
    }
    if details.approval_type == ApprovalType::CourtOrder {
        findings.check(
            "courtOrderNumber",
            rules::COURT_ORDER_FILE_NUMBER_RULES,
            details.court_order_number.as_deref().unwrap_or_default(),
        );
    }
    if details.restoration_type == RestorationType::FullRestoration
        && details.relationships.is_empty()
    {
        findings.push("relationships", "At least one relationship is required");
    }
}

fn amalgamation_rules(findings: &mut Findings, details: &AmalgamationDetails) {
    findings.require("type", &details.amalgamation_type);
    if details.amalgamating_businesses.len() < 2 {
        findings.push(
            "amalgamatingBusinesses",
            "At least two amalgamating businesses are required",
        );
    }
    let mut seen = BTreeSet::new();
    for (index, business) in details.amalgamating_businesses.iter().enumerate() {
        findings.require(
            format!("amalgamatingBusinesses[{index}].identifier"),
            &business.identifier,
        );
        if !seen.insert(business.identifier.trim().to_ascii_uppercase()) {
            findings.push(
                format!("amalgamatingBusinesses[{index}].identifier"),
                "Business is already in the list",
            );
        }
    }
}

fn continuation_out_rules(findings: &mut Findings, details: &ContinuationOutDetails) {
    let jurisdiction = &details.foreign_jurisdiction;
    findings.require("foreignJurisdiction.country", &jurisdiction.country);
    let home = jurisdiction.country.trim().eq_ignore_ascii_case("CA")
        && jurisdiction
            .region
            .as_deref()
            .is_some_and(|region| region.trim().eq_ignore_ascii_case("BC"));
    if home {
        findings.push(
            "foreignJurisdiction.region",
            "Cannot continue out to British Columbia",
        );
    }
    if let Some(text) = &details.details {
        if text.chars().count() > 2000 {
            findings.push("details", "Cannot exceed 2000 characters");
        }
    }
}

fn court_order_rules(findings: &mut Findings, order: &CourtOrder, ctx: &StepContext) {
    if order.file_number.is_empty() {
        if order.has_plan_of_arrangement {
            findings.push("fileNumber", "Court order file number is required");
        }
        return;
    }
    findings.check("fileNumber", rules::COURT_ORDER_FILE_NUMBER_RULES, &order.file_number);
    if order.order_date.is_some_and(|date| date > ctx.filing_date) {
        findings.push("orderDate", "Date cannot be in the future");
    }
}

fn staff_payment_rules(findings: &mut Findings, payment: &StaffPayment) {
    let digits = |value: Option<&str>, len: usize| {
        value.is_some_and(|v| v.len() == len && v.chars().all(|c| c.is_ascii_digit()))
    };

    match payment.option {
        StaffPaymentOption::None => findings.push("option", "Select a payment option"),
        StaffPaymentOption::Fas => {
            if !digits(payment.routing_slip_number.as_deref(), 9) {
                findings.push("routingSlipNumber", "Routing slip number must be 9 digits");
            }
        }
        StaffPaymentOption::Bcol => {
            if !digits(payment.bcol_account_number.as_deref(), 6) {
                findings.push("bcolAccountNumber", "Account number must be 6 digits");
            }
            let dat_ok = payment.dat_number.as_deref().is_some_and(|dat| {
                dat.len() == 8
                    && dat.starts_with('C')
                    && dat[1..].chars().all(|c| c.is_ascii_digit())
            });
            if !dat_ok {
                findings.push("datNumber", "DAT number must be the letter C followed by 7 digits");
            }
            if let Some(folio) = &payment.folio_number {
                findings.check("folioNumber", rules::FOLIO_NUMBER_RULES, folio);
            }
        }
        StaffPaymentOption::NoFee => {}
    }
}

fn certify_rules(findings: &mut Findings, certification: &Certification) {
    findings.check("certifiedBy", rules::CERTIFIED_BY_RULES, &certification.certified_by);
    if !certification.is_certified {
        findings.push("isCertified", "Certification is required");
    }
}

fn delivery_rules(findings: &mut Findings, delivery: &DocumentDelivery, ctx: &StepContext) {
    match &delivery.completing_party_email {
        Some(email) => findings.check("completingPartyEmail", rules::EMAIL_RULES, email),
        None if !ctx.staff => findings.push("completingPartyEmail", "Required"),
        None => {}
    }
    if let Some(email) = &delivery.document_optional_email {
        if !email.is_empty() {
            findings.check("documentOptionalEmail", rules::EMAIL_RULES, email);
        }
    }
}

fn effective_date_rules(findings: &mut Findings, effective: &EffectiveDateTime, ctx: &StepContext) {
    if !effective.is_future_effective {
        return;
    }
    let Some(when) = effective.effective_date_time else {
        findings.push("effectiveDateTime", "Required");
        return;
    };
    let date = when.date_naive();
    // An upper bound past the end of the calendar counts as out of window.
    let latest = ctx
        .filing_date
        .checked_add_days(Days::new(MAX_FUTURE_EFFECTIVE_DAYS));
    if date <= ctx.filing_date {
        findings.push("effectiveDateTime", "Date must be in the future");
    } else if latest.map_or(true, |latest| date > latest) {
        findings.push(
            "effectiveDateTime",
            format!("Date cannot be more than {MAX_FUTURE_EFFECTIVE_DAYS} days in the future"),
        );
    }
}

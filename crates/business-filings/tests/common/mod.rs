//! Fixtures shared by the crate's integration scenarios.
#![allow(dead_code)]

use business_filings::filings::domain::{
    Address, Certification, ContactPoint, ContinuationOutDetails, DocumentDelivery,
    DocumentUpload, ForeignJurisdiction, IncorporationAgreement, NameRequest, Officer,
    OfficeAddress, OfficeAddresses, OrgPerson, PartyType, Role, RoleType, ShareClass,
    ShareStructure, StaffPayment, StaffPaymentOption,
};
use business_filings::filings::{
    ActorContext, EntityType, FilingResource, FilingSession, FilingType, ResourceRegistry,
    SectionData, SessionId,
};
use chrono::NaiveDate;

pub fn filing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub fn resource(filing_type: FilingType, entity_type: EntityType) -> FilingResource {
    ResourceRegistry::standard()
        .expect("standard tables")
        .resource(filing_type, entity_type)
        .expect("supported pair")
        .clone()
}

pub fn session(
    filing_type: FilingType,
    entity_type: EntityType,
    identifier: &str,
    actor: ActorContext,
) -> FilingSession {
    FilingSession::new(
        SessionId("fs-test".to_string()),
        filing_type,
        entity_type,
        identifier.to_string(),
        actor,
        filing_date(),
    )
}

/// Record every section, panicking on anything the filing does not permit.
pub fn record_all(session: &mut FilingSession, sections: Vec<SectionData>) {
    let capabilities = session.capabilities();
    for data in sections {
        assert!(
            capabilities.permits(data.key()),
            "{} is not permitted",
            data.key()
        );
        session.record(data, &capabilities);
    }
}

pub fn address() -> Address {
    Address {
        street_address: "200-940 Blanshard St".to_string(),
        address_city: "Victoria".to_string(),
        address_region: "BC".to_string(),
        postal_code: "V8W 3E6".to_string(),
        address_country: "CA".to_string(),
        ..Address::default()
    }
}

fn office() -> OfficeAddress {
    OfficeAddress {
        delivery_address: address(),
        mailing_address: address(),
    }
}

pub fn person(first_name: &str, roles: &[RoleType]) -> OrgPerson {
    OrgPerson {
        officer: Officer {
            party_type: PartyType::Person,
            first_name: first_name.to_string(),
            middle_name: None,
            last_name: "Nguyen".to_string(),
            organization_name: None,
            email: Some(format!("{}@example.ca", first_name.to_lowercase())),
        },
        roles: roles
            .iter()
            .map(|role_type| Role {
                role_type: *role_type,
                appointment_date: Some(filing_date()),
            })
            .collect(),
        mailing_address: address(),
        delivery_address: None,
    }
}

pub fn review(certified_by: &str) -> Vec<SectionData> {
    vec![
        SectionData::DocumentDelivery(DocumentDelivery {
            completing_party_email: Some("filer@example.ca".to_string()),
            document_optional_email: None,
        }),
        SectionData::Certify(Certification {
            certified_by: certified_by.to_string(),
            is_certified: true,
        }),
    ]
}

pub fn fas_payment() -> SectionData {
    SectionData::StaffPayment(StaffPayment {
        option: StaffPaymentOption::Fas,
        routing_slip_number: Some("123456789".to_string()),
        bcol_account_number: None,
        dat_number: None,
        folio_number: None,
        is_priority: false,
    })
}

fn define_company(entity_type: EntityType, legal_name: &str) -> Vec<SectionData> {
    let records_office = (entity_type != EntityType::Cooperative).then(office);
    vec![
        SectionData::NameRequest(NameRequest {
            legal_type: entity_type,
            nr_number: Some("NR 1234567".to_string()),
            legal_name: Some(legal_name.to_string()),
        }),
        SectionData::Offices(OfficeAddresses {
            registered_office: office(),
            records_office,
        }),
        SectionData::ContactPoint(ContactPoint {
            email: "office@example.ca".to_string(),
            phone: Some("(250) 555-0100".to_string()),
            extension: None,
        }),
    ]
}

/// Every section a non-staff filer completes for a corporate incorporation.
pub fn corporation_incorporation(entity_type: EntityType) -> Vec<SectionData> {
    let mut sections = define_company(entity_type, "NORTHERN LIGHTS HOLDINGS LTD.");
    sections.push(SectionData::Parties(vec![person(
        "Amelia",
        &[RoleType::CompletingParty, RoleType::Incorporator, RoleType::Director],
    )]));
    sections.push(SectionData::ShareStructure(ShareStructure {
        share_classes: vec![ShareClass {
            name: "Class A Shares".to_string(),
            priority: 1,
            has_maximum_shares: true,
            max_number_of_shares: Some(10_000),
            par_value: None,
            currency: None,
            has_rights_or_restrictions: false,
            series: Vec::new(),
        }],
    }));
    sections.push(SectionData::IncorporationAgreement(IncorporationAgreement {
        agreement_type: "sample".to_string(),
    }));
    sections.extend(review("Amelia Nguyen"));
    sections
}

/// Every section a non-staff filer completes for a cooperative incorporation.
pub fn cooperative_incorporation() -> Vec<SectionData> {
    let mut sections = define_company(EntityType::Cooperative, "KOOTENAY GROWERS COOPERATIVE");
    sections.push(SectionData::Parties(vec![
        person("Amelia", &[RoleType::CompletingParty, RoleType::Director]),
        person("Bryce", &[RoleType::Director]),
        person("Chantal", &[RoleType::Director]),
    ]));
    let upload = |key: &str| DocumentUpload {
        file_key: Some(key.to_string()),
        file_name: Some(format!("{key}.pdf")),
        confirmed: true,
    };
    sections.push(SectionData::Rules(upload("rules")));
    sections.push(SectionData::Memorandum(upload("memorandum")));
    sections.extend(review("Amelia Nguyen"));
    sections
}

pub fn continuation_out() -> Vec<SectionData> {
    let mut sections = vec![SectionData::ConsentContinuationOut(ContinuationOutDetails {
        foreign_jurisdiction: ForeignJurisdiction {
            country: "CA".to_string(),
            region: Some("AB".to_string()),
        },
        details: Some("Continuing to Alberta.".to_string()),
    })];
    sections.extend(review("Amelia Nguyen"));
    sections
}

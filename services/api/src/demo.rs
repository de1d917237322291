use crate::infra::{InMemoryRegistry, InMemorySessionStore};
use business_filings::error::AppError;
use business_filings::filings::domain::{
    Address, Affidavit, Certification, DissolutionStatement, DocumentDelivery, Officer,
    OrgPerson, PartyType, Resolution, Role, RoleType, StaffPayment, StaffPaymentOption,
};
use business_filings::filings::{
    resolve, ActorContext, EntityType, FilingService, FilingType, NavigateCommand,
    ResourceRegistry, SectionData, SessionView, StartFilingRequest,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ResourceArgs {
    /// Filing type, e.g. incorporationApplication or consent-continuation-out
    #[arg(long)]
    pub(crate) filing_type: FilingType,
    /// Entity type code: BEN, BC, ULC, CC or CP
    #[arg(long)]
    pub(crate) entity_type: EntityType,
    /// Resolve capabilities for a staff filer
    #[arg(long)]
    pub(crate) staff: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Business to dissolve. Must be active in the in-memory registry.
    #[arg(long, default_value = "BC0871234")]
    pub(crate) identifier: String,
    /// Filing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) filing_date: Option<NaiveDate>,
    /// File as staff, which adds the staff payment section.
    #[arg(long)]
    pub(crate) staff: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            identifier: "BC0871234".to_string(),
            filing_date: None,
            staff: false,
        }
    }
}

pub(crate) fn run_resource_listing(args: ResourceArgs) -> Result<(), AppError> {
    let registry = ResourceRegistry::standard()?;
    let resource = registry.resource(args.filing_type, args.entity_type)?;
    let actor = if args.staff {
        ActorContext::staff()
    } else {
        ActorContext::default()
    };
    let capabilities = resolve(args.filing_type, args.entity_type, &actor);

    println!("{} | {}", args.filing_type.label(), resource.display_name);
    if let Some(title) = resource.details_title {
        println!("Details title: {title}");
    }
    for step in &resource.steps {
        println!(
            "{}. {} ({} -> {})",
            step.step,
            step.text.replace('\n', " "),
            step.component,
            step.to
        );
        for requirement in &step.sections {
            let availability = match (capabilities.permits(requirement.section), requirement.required) {
                (false, _) => "not available",
                (true, true) => "required",
                (true, false) => "optional",
            };
            println!("   - {} [{availability}]", requirement.section);
        }
    }
    let codes: Vec<String> = resource
        .filing_data
        .iter()
        .map(|code| {
            serde_json::to_value(code.filing_type_code)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default()
        })
        .collect();
    println!("Filing codes: {}", codes.join(", "));
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        identifier,
        filing_date,
        staff,
    } = args;
    let filing_date = filing_date.unwrap_or_else(|| Local::now().date_naive());
    let actor = if staff {
        ActorContext::staff()
    } else {
        ActorContext::default()
    };

    let registry = Arc::new(InMemoryRegistry::seeded());
    let service = FilingService::new(
        Arc::new(ResourceRegistry::standard()?),
        Arc::new(InMemorySessionStore::default()),
        registry.clone(),
        registry.clone(),
    );

    println!("Voluntary dissolution demo");
    let view = service
        .start(StartFilingRequest {
            filing_type: FilingType::Dissolution,
            entity_type: None,
            identifier: Some(identifier),
            actor,
            filing_date: Some(filing_date),
        })
        .await?;
    render_view(&view);

    for section in dissolution_sections(filing_date) {
        service.update_section(&view.id, section)?;
    }
    let view = service.navigate(&view.id, NavigateCommand::Next)?;
    println!("\nAfter completing the dissolution step");
    render_view(&view);

    for section in review_sections(staff) {
        service.update_section(&view.id, section)?;
    }
    let view = service.submit(&view.id).await?;
    println!("\nSubmitted");
    render_view(&view);

    for payload in registry.filings() {
        let pretty = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        println!("\nRegistry payload\n{pretty}");
    }
    Ok(())
}

fn render_view(view: &SessionView) {
    println!(
        "Session {} | {} {} | {}",
        view.id,
        view.display_name,
        view.identifier,
        view.legal_name.as_deref().unwrap_or("(unnamed)")
    );
    for step in &view.steps {
        let marker = if step.current { ">" } else { " " };
        let status = if step.valid { "complete" } else { "incomplete" };
        println!("{marker} {}. {} [{status}]", step.step, step.text.replace('\n', " "));
    }
}

fn demo_address() -> Address {
    Address {
        street_address: "1 Government St".to_string(),
        address_city: "Victoria".to_string(),
        address_region: "BC".to_string(),
        postal_code: "V8W 1A1".to_string(),
        address_country: "CA".to_string(),
        ..Address::default()
    }
}

fn dissolution_sections(filing_date: NaiveDate) -> Vec<SectionData> {
    let custodian = OrgPerson {
        officer: Officer {
            party_type: PartyType::Person,
            first_name: "Avery".to_string(),
            middle_name: None,
            last_name: "Tremblay".to_string(),
            organization_name: None,
            email: Some("avery@example.ca".to_string()),
        },
        roles: vec![Role {
            role_type: RoleType::Custodian,
            appointment_date: Some(filing_date),
        }],
        mailing_address: demo_address(),
        delivery_address: Some(demo_address()),
    };

    vec![
        SectionData::DissolutionStatement(DissolutionStatement {
            dissolution_type: "voluntary".to_string(),
            dissolution_statement_type: None,
        }),
        SectionData::Parties(vec![custodian]),
        SectionData::Resolution(Resolution {
            resolution_text: "Resolved that the company be voluntarily dissolved.".to_string(),
            resolution_date: Some(filing_date),
            signing_person: Some("Avery Tremblay".to_string()),
        }),
        SectionData::Affidavit(Affidavit {
            affidavit_confirmed: true,
            affidavit_file_key: None,
        }),
    ]
}

fn review_sections(staff: bool) -> Vec<SectionData> {
    let mut sections = vec![
        SectionData::DocumentDelivery(DocumentDelivery {
            completing_party_email: Some("avery@example.ca".to_string()),
            document_optional_email: None,
        }),
        SectionData::Certify(Certification {
            certified_by: "Avery Tremblay".to_string(),
            is_certified: true,
        }),
    ];
    if staff {
        sections.push(SectionData::StaffPayment(StaffPayment {
            option: StaffPaymentOption::NoFee,
            routing_slip_number: None,
            bcol_account_number: None,
            dat_number: None,
            folio_number: None,
            is_priority: false,
        }));
    }
    sections
}

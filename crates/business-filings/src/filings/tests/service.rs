use super::common::*;
use crate::filings::capabilities::ActorContext;
use crate::filings::domain::{CourtOrder, EntityState, EntityType, FilingId, ShareStructure};
use crate::filings::registry::{ApiFieldError, SubmissionError};
use crate::filings::resources::ConfigurationError;
use crate::filings::sections::{SectionData, SectionKey};
use crate::filings::service::{
    FilingServiceError, NavigateCommand, SessionStore, SessionStoreError, StartFilingRequest,
};
use crate::filings::template::ValidationReason;
use crate::filings::wizard::{WizardError, WizardState};
use crate::filings::FilingType;

#[tokio::test]
async fn start_fetches_business_and_opens_first_step() {
    let (service, store, _) = build_service();

    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");

    assert_eq!(view.entity_type, EntityType::BenefitCompany);
    assert_eq!(view.display_name, "BC Benefit Company");
    assert_eq!(view.legal_name.as_deref(), Some("BC0871234 LTD."));
    assert_eq!(view.current_step, Some("step-1-btn"));
    assert_eq!(view.steps.len(), 2);
    assert!(view.steps[0].visited && !view.steps[1].visited);
    assert!(store.fetch(&view.id).expect("fetch").is_some());
}

#[tokio::test]
async fn start_rejects_business_in_the_wrong_state() {
    let (service, _, _) = build_service();

    match service
        .start(start_request(FilingType::Restoration, "BC0871234"))
        .await
    {
        Err(FilingServiceError::BusinessState { state, .. }) => {
            assert_eq!(state, EntityState::Active)
        }
        other => panic!("expected state error, got {other:?}"),
    }

    assert!(service
        .start(start_request(FilingType::Restoration, "BC0870001"))
        .await
        .is_ok());
}

#[tokio::test]
async fn start_reports_unknown_business_and_unsupported_pairs() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service
            .start(start_request(FilingType::Dissolution, "BC9999999"))
            .await,
        Err(FilingServiceError::BusinessNotFound(identifier)) if identifier == "BC9999999"
    ));

    assert!(matches!(
        service
            .start(start_request(FilingType::Restoration, "CP0009999"))
            .await,
        Err(FilingServiceError::Configuration(
            ConfigurationError::UnsupportedEntityType { .. }
        ))
    ));
}

#[tokio::test]
async fn start_refuses_identifiers_outside_the_registry_format() {
    let (service, store, _) = build_service();

    for identifier in ["../../internal", "BC0871234/filings", "bc0871234"] {
        assert!(
            matches!(
                service
                    .start(start_request(FilingType::Dissolution, identifier))
                    .await,
                Err(FilingServiceError::InvalidRequest(_))
            ),
            "{identifier} should be refused"
        );
    }

    let incorporation = StartFilingRequest {
        filing_type: FilingType::IncorporationApplication,
        entity_type: Some(EntityType::BenefitCompany),
        identifier: Some("t123?draft=true".to_string()),
        actor: ActorContext::default(),
        filing_date: Some(filing_date()),
    };
    assert!(matches!(
        service.start(incorporation).await,
        Err(FilingServiceError::InvalidRequest(_))
    ));
    assert!(store.records.lock().expect("store mutex poisoned").is_empty());
}

#[tokio::test]
async fn incorporation_gets_a_temporary_identifier() {
    let (service, _, _) = build_service();

    let missing_type = StartFilingRequest {
        filing_type: FilingType::IncorporationApplication,
        entity_type: None,
        identifier: None,
        actor: ActorContext::default(),
        filing_date: Some(filing_date()),
    };
    assert!(matches!(
        service.start(missing_type).await,
        Err(FilingServiceError::InvalidRequest(_))
    ));

    let view = service
        .start(StartFilingRequest {
            filing_type: FilingType::IncorporationApplication,
            entity_type: Some(EntityType::Cooperative),
            identifier: None,
            actor: ActorContext::default(),
            filing_date: Some(filing_date()),
        })
        .await
        .expect("incorporation starts");
    assert!(view.identifier.starts_with('T'));
    assert_eq!(view.details_title, Some("Association Details"));
    assert!(!view.capabilities.effective_date_time);
}

#[tokio::test]
async fn sections_outside_the_filing_or_capabilities_are_refused() {
    let (service, _, _) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");

    let court_order = SectionData::CourtOrder(CourtOrder {
        file_number: "S-123456".to_string(),
        order_date: None,
        has_plan_of_arrangement: false,
    });
    assert!(matches!(
        service.update_section(&view.id, court_order),
        Err(FilingServiceError::SectionNotPermitted(SectionKey::CourtOrder))
    ));

    let shares = SectionData::ShareStructure(ShareStructure {
        share_classes: Vec::new(),
    });
    assert!(matches!(
        service.update_section(&view.id, shares),
        Err(FilingServiceError::SectionNotInFiling {
            section: SectionKey::ShareStructure,
            ..
        })
    ));
}

#[tokio::test]
async fn next_waits_for_a_complete_step() {
    let (service, _, _) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");

    assert!(matches!(
        service.navigate(&view.id, NavigateCommand::Next),
        Err(FilingServiceError::Wizard(WizardError::StepInvalid("step-1-btn")))
    ));

    for section in dissolution_sections() {
        let updated = service
            .update_section(&view.id, section)
            .expect("section recorded");
        assert!(updated.sections.iter().all(|slice| slice.valid));
    }

    let moved = service
        .navigate(&view.id, NavigateCommand::Next)
        .expect("step complete");
    assert_eq!(moved.current_step, Some("step-2-btn"));
    assert!(moved.steps[0].valid);

    let back = service
        .navigate(
            &view.id,
            NavigateCommand::JumpTo {
                step_id: "step-1-btn".to_string(),
            },
        )
        .expect("visited step");
    assert_eq!(back.current_step, Some("step-1-btn"));
}

#[tokio::test]
async fn submit_assembles_and_completes_the_filing() {
    let (service, store, submitter) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in dissolution_sections().into_iter().chain(review_sections()) {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }

    let submitted = service.submit(&view.id).await.expect("filing accepted");
    assert_eq!(
        submitted.state,
        WizardState::Submitted {
            filing_id: FilingId(1001)
        }
    );

    let payloads = submitter.payloads();
    assert_eq!(payloads.len(), 1);
    let filing = &payloads[0]["filing"];
    assert_eq!(filing["header"]["name"], "dissolution");
    assert_eq!(filing["header"]["certifiedBy"], "Jane Doe");
    assert_eq!(filing["business"]["identifier"], "BC0871234");
    assert_eq!(
        filing["dissolution"]["dissolutionStatement"]["dissolutionType"],
        "voluntary"
    );
    assert!(filing["dissolution"].get("staffPayment").is_none());
    assert_eq!(payloads[0]["filingData"][0]["filingTypeCode"], "DIS_VOL");

    assert!(store.fetch(&view.id).expect("fetch").is_none());
    assert!(matches!(
        service.update_section(&view.id, review_sections().remove(0)),
        Err(FilingServiceError::Store(SessionStoreError::NotFound))
    ));
    assert!(matches!(
        service.submit(&view.id).await,
        Err(FilingServiceError::Store(SessionStoreError::NotFound))
    ));
    assert_eq!(submitter.payloads().len(), 1);
}

#[tokio::test]
async fn incomplete_submission_names_the_first_failing_step() {
    let (service, _, submitter) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in review_sections() {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }

    match service.submit(&view.id).await {
        Err(FilingServiceError::Validation(error)) => {
            assert_eq!(error.step_id, "step-1-btn");
            assert_eq!(error.section, SectionKey::DissolutionStatement);
            assert_eq!(error.reason, ValidationReason::Missing);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(submitter.payloads().is_empty());
}

#[tokio::test]
async fn rejected_submission_returns_to_owning_step_and_keeps_data() {
    let (service, store, submitter) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in dissolution_sections().into_iter().chain(review_sections()) {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }
    service
        .navigate(&view.id, NavigateCommand::Next)
        .expect("step complete");

    submitter.reject_with(SubmissionError::Rejected {
        status: 400,
        message: "Custodian address invalid".to_string(),
        field_errors: vec![ApiFieldError {
            error: "Custodian address invalid".to_string(),
            path: "/filing/dissolution/parties/0/mailingAddress".to_string(),
        }],
    });

    assert!(matches!(
        service.submit(&view.id).await,
        Err(FilingServiceError::Submission(SubmissionError::Rejected { status: 400, .. }))
    ));

    let after = service.get(&view.id).expect("session kept");
    assert_eq!(after.current_step, Some("step-1-btn"));
    assert_eq!(after.sections.len(), 6);
    let failure = after.last_failure.expect("failure recorded");
    assert_eq!(failure.field_errors.len(), 1);

    submitter.accept();
    let retried = service.submit(&view.id).await.expect("retry accepted");
    assert!(retried.last_failure.is_none());
    assert!(store.fetch(&view.id).expect("fetch").is_none());
}

#[tokio::test]
async fn cancel_drops_the_session() {
    let (service, store, _) = build_service();
    let view = service
        .start(start_request(FilingType::ConsentContinuationOut, "BC0871234"))
        .await
        .expect("session starts");

    let cancelled = service.cancel(&view.id).expect("cancelled");
    assert_eq!(cancelled.state, WizardState::Cancelled);
    assert!(store.fetch(&view.id).expect("fetch").is_none());
    assert!(matches!(
        service.get(&view.id),
        Err(FilingServiceError::Store(SessionStoreError::NotFound))
    ));
}

#[tokio::test]
async fn sessions_mid_submission_refuse_every_write() {
    let (service, store, submitter) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in dissolution_sections().into_iter().chain(review_sections()) {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }

    let mut record = store.fetch(&view.id).expect("fetch").expect("stored");
    record.submitting = true;
    store.update(record).expect("flag stored");

    assert!(matches!(
        service.update_section(&view.id, review_sections().remove(0)),
        Err(FilingServiceError::SubmissionInProgress)
    ));
    assert!(matches!(
        service.navigate(&view.id, NavigateCommand::Next),
        Err(FilingServiceError::SubmissionInProgress)
    ));
    assert!(matches!(
        service.submit(&view.id).await,
        Err(FilingServiceError::SubmissionInProgress)
    ));
    assert!(matches!(
        service.cancel(&view.id),
        Err(FilingServiceError::SubmissionInProgress)
    ));
    assert!(service.get(&view.id).is_ok());
    assert!(submitter.payloads().is_empty());
}

#[tokio::test]
async fn writes_from_a_stale_read_are_refused() {
    let (service, store, _) = build_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");

    let stale = store.fetch(&view.id).expect("fetch").expect("stored");
    service
        .update_section(&view.id, review_sections().remove(0))
        .expect("section recorded");

    assert!(matches!(
        store.update(stale),
        Err(SessionStoreError::Stale)
    ));
    let kept = service.get(&view.id).expect("session kept");
    assert_eq!(kept.sections.len(), 1);
}

#[tokio::test]
async fn in_flight_submission_holds_off_other_writers() {
    let (service, store, gate) = build_gated_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in dissolution_sections().into_iter().chain(review_sections()) {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }

    let meanwhile = async {
        gate.entered.notified().await;
        let update = service.update_section(&view.id, review_sections().remove(0));
        let second = service.submit(&view.id).await;
        let cancel = service.cancel(&view.id);
        gate.release.notify_one();
        (update, second, cancel)
    };
    let (submitted, (update, second, cancel)) =
        tokio::join!(service.submit(&view.id), meanwhile);

    assert!(matches!(update, Err(FilingServiceError::SubmissionInProgress)));
    assert!(matches!(second, Err(FilingServiceError::SubmissionInProgress)));
    assert!(matches!(cancel, Err(FilingServiceError::SubmissionInProgress)));
    assert_eq!(
        submitted.expect("filing accepted").state,
        WizardState::Submitted {
            filing_id: FilingId(2002)
        }
    );
    assert_eq!(gate.calls(), 1);
    assert!(store.fetch(&view.id).expect("fetch").is_none());
}

#[tokio::test]
async fn abandoned_submission_releases_the_session() {
    let (service, store, gate) = build_gated_service();
    let view = service
        .start(start_request(FilingType::Dissolution, "BC0871234"))
        .await
        .expect("session starts");
    for section in dissolution_sections().into_iter().chain(review_sections()) {
        service
            .update_section(&view.id, section)
            .expect("section recorded");
    }

    tokio::select! {
        _ = service.submit(&view.id) => panic!("submission finished while held"),
        _ = gate.entered.notified() => {}
    }

    let record = store.fetch(&view.id).expect("fetch").expect("session kept");
    assert!(!record.submitting);
    assert!(service
        .update_section(&view.id, review_sections().remove(0))
        .is_ok());
    assert!(service.cancel(&view.id).is_ok());
}

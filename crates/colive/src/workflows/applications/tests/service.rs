use std::sync::Arc;

use rust_decimal::Decimal;

use super::common::*;
use crate::config::WizardConfig;
use crate::ids::{ApplicationId, ChapterId, UserId};
use crate::pricing::{ChapterBooking, GuestCount, MemberType, PricingAdjustments};
use crate::storage::RepositoryError;
use crate::workflows::applications::{
    AnswerInput, ApplicationService, ApplicationServiceError, ApplicationStatus, ChapterRepository,
    Navigation, StayNotice, StayRequest, WizardError,
};
use crate::workflows::onboarding::{ColiverRepository, ColiverStatus};
use crate::workflows::payments::{PaymentRepository, PaymentStatus};
use crate::workflows::todos::{TaskType, TodoRepository};

fn submit(service: &ApplicationService<crate::storage::InMemoryStore>, id: &ApplicationId) {
    service
        .select_chapter(id, ChapterId::from("chp-seoul"))
        .expect("chapter selected");
    for answer in ["community", ""] {
        service
            .answer(
                id,
                AnswerInput {
                    answer: answer.to_string(),
                    navigation: Navigation::Next,
                },
            )
            .expect("answered");
    }
}

#[test]
fn availability_prices_every_chapter() {
    let (service, _store) = build_service();
    let request = StayRequest {
        date_join: join(),
        date_leave: leave(),
        guests: GuestCount::One,
        member_type: MemberType::New,
    };

    let report = service
        .check_availability(&request, today())
        .expect("availability");

    assert_eq!(report.nights, 31);
    assert!(report.notice.is_none());
    assert_eq!(report.options.len(), 2);
    let seoul = report
        .options
        .iter()
        .find(|option| option.chapter_id == ChapterId::from("chp-seoul"))
        .expect("seoul listed");
    assert!(seoul.is_available);
    assert_eq!(seoul.pricing.final_total, Decimal::from(930_000));
}

#[test]
fn short_stays_carry_a_notice() {
    let (service, _store) = build_service();
    let request = StayRequest {
        date_join: join(),
        date_leave: date(2099, 3, 11),
        guests: GuestCount::One,
        member_type: MemberType::New,
    };

    let report = service
        .check_availability(&request, today())
        .expect("availability");
    assert_eq!(report.notice, Some(StayNotice::Short));
}

#[test]
fn start_rejects_invalid_dates() {
    let (service, _store) = build_service();
    let mut details = details(MemberType::New);
    details.date_leave = details.date_join;

    match service.start(UserId::from("usr-jiwoo"), details, today()) {
        Err(ApplicationServiceError::Validation(error)) => {
            assert!(error.has_field("date_leave"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn start_raises_review_todo() {
    let (service, store) = build_service();
    let view = started(&service, MemberType::New);

    let todos = store
        .todos_for(TaskType::ApplicationReview, view.application_id.as_str())
        .expect("todos");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].coliver_name.as_deref(), Some("Jiwoo Park"));
}

#[test]
fn unknown_chapter_is_rejected() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);

    let result = service.select_chapter(&view.application_id, ChapterId::from("chp-nowhere"));
    assert!(matches!(
        result,
        Err(ApplicationServiceError::UnknownChapter(_))
    ));
}

#[test]
fn missing_application_is_not_found() {
    let (service, _store) = build_service();
    let result = service.get(&ApplicationId::from("app-missing"));
    assert!(matches!(
        result,
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn withdrawn_applications_drop_out_of_listing() {
    let (service, _store) = build_service();
    let first = started(&service, MemberType::New);
    let second = started(&service, MemberType::New);

    let view = service.withdraw(&first.application_id).expect("withdrawn");
    assert_eq!(view.status, "Withdrawn");
    assert_eq!(view.application_status, "Withdrawn");

    let listed = service
        .list_for_user(&UserId::from("usr-jiwoo"))
        .expect("listing");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].application_id, second.application_id);

    assert!(matches!(
        service.withdraw(&first.application_id),
        Err(ApplicationServiceError::Wizard(WizardError::NotEditable(_)))
    ));
}

#[test]
fn update_details_only_while_draft() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);

    let mut changed = details(MemberType::New);
    changed.guests = GuestCount::Two;
    let updated = service
        .update_details(&view.application_id, changed.clone(), today())
        .expect("draft can change");
    assert_eq!(updated.guests, GuestCount::Two);

    submit(&service, &view.application_id);
    let result = service.update_details(&view.application_id, changed, today());
    assert!(matches!(
        result,
        Err(ApplicationServiceError::Wizard(WizardError::NotEditable(_)))
    ));
}

#[test]
fn moving_dates_onto_a_booked_stay_is_rejected() {
    let (service, store) = build_service();
    store
        .add_booking(ChapterBooking {
            chapter_id: ChapterId::from("chp-seoul"),
            start_date: date(2099, 5, 1),
            end_date: date(2099, 5, 20),
        })
        .expect("booking");
    let view = started(&service, MemberType::New);
    service
        .select_chapter(&view.application_id, ChapterId::from("chp-seoul"))
        .expect("march is free");

    let mut overlapping = details(MemberType::New);
    overlapping.date_join = date(2099, 5, 5);
    overlapping.date_leave = date(2099, 5, 25);
    let result = service.update_details(&view.application_id, overlapping, today());
    assert!(matches!(
        result,
        Err(ApplicationServiceError::ChapterUnavailable(id)) if id == ChapterId::from("chp-seoul")
    ));
    let record = service.record(&view.application_id).expect("record");
    assert_eq!(record.application.details.date_join, join());

    let mut later = details(MemberType::New);
    later.date_join = date(2099, 5, 20);
    later.date_leave = date(2099, 6, 10);
    let moved = service
        .update_details(&view.application_id, later, today())
        .expect("free after the booking ends");
    assert_eq!(moved.date_join, date(2099, 5, 20));
    assert_eq!(moved.chapter_id, Some(ChapterId::from("chp-seoul")));
}

#[test]
fn archived_applications_use_historical_rates() {
    let store = seeded_store();
    let live = PricingAdjustments {
        member_discount_percent: Decimal::from(10),
        guest_increase_percent: Decimal::from(20),
    };
    let service = ApplicationService::new(Arc::clone(&store), live, WizardConfig::default());
    let view = started(&service, MemberType::Returning);
    service
        .select_chapter(&view.application_id, ChapterId::from("chp-seoul"))
        .expect("chapter selected");

    let active = service.pricing(&view.application_id).expect("pricing");
    assert_eq!(active.final_total, Decimal::from(837_000));

    service
        .set_active(&view.application_id, false)
        .expect("archived");
    let archived = service.pricing(&view.application_id).expect("pricing");
    assert_eq!(archived.final_total, Decimal::from(902_100));
}

#[test]
fn pricing_without_chapter_is_empty() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);

    let pricing = service.pricing(&view.application_id).expect("pricing");
    assert_eq!(pricing.total_nights, 0);
    assert_eq!(pricing.final_total, Decimal::ZERO);
}

#[test]
fn manual_cost_overrides_quote() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    service
        .select_chapter(&view.application_id, ChapterId::from("chp-seoul"))
        .expect("chapter selected");
    service
        .set_manual_cost(&view.application_id, Some(Decimal::from(500_000)))
        .expect("manual cost");

    let pricing = service.pricing(&view.application_id).expect("pricing");
    assert!(pricing.manual_override);
    assert_eq!(pricing.final_total, Decimal::from(500_000));
}

#[test]
fn moving_to_onboarding_creates_coliver_booking_and_payment() {
    let (service, store) = build_service();
    let view = started(&service, MemberType::New);
    submit(&service, &view.application_id);

    let change = service
        .set_application_status(&view.application_id, ApplicationStatus::Onboarding)
        .expect("status change");
    let report = change.onboarding.expect("onboarding ran");

    assert!(report.coliver_created);
    assert!(report.booking_created);
    assert_eq!(report.payments_created.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(change.application.application_status, "Onboarding");

    let coliver = store
        .fetch_coliver(&report.coliver_id)
        .expect("fetch")
        .expect("coliver stored");
    assert_eq!(coliver.status, ColiverStatus::Onboarding);
    assert_eq!(coliver.chapter_id, Some(ChapterId::from("chp-seoul")));

    let payments = store
        .payments_for_user(&UserId::from("usr-jiwoo"))
        .expect("payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, Decimal::from(930_000));
    assert_eq!(payments[0].status, PaymentStatus::Requested);
    assert_eq!(payments[0].due_date, Some(join()));
    assert_eq!(payments[0].description, "Stay at Seoul for Jiwoo Park");

    let reviews = store
        .todos_for(TaskType::PaymentReview, payments[0].id.as_str())
        .expect("todos");
    assert_eq!(reviews.len(), 1);
}

#[test]
fn repeated_onboarding_reuses_records() {
    let (service, store) = build_service();
    let view = started(&service, MemberType::New);
    submit(&service, &view.application_id);
    let id = view.application_id.clone();

    let first = service
        .set_application_status(&id, ApplicationStatus::Onboarding)
        .expect("onboarded")
        .onboarding
        .expect("report");

    let unchanged = service
        .set_application_status(&id, ApplicationStatus::Onboarding)
        .expect("same status");
    assert!(unchanged.onboarding.is_none());

    service
        .set_application_status(&id, ApplicationStatus::Accepted)
        .expect("moved back");
    let second = service
        .set_application_status(&id, ApplicationStatus::Onboarding)
        .expect("onboarded again")
        .onboarding
        .expect("report");

    assert_eq!(second.coliver_id, first.coliver_id);
    assert!(!second.coliver_created);
    assert!(!second.booking_created);
    assert!(second.payments_created.is_empty());
    assert_eq!(second.payments_refreshed, first.payments_created);

    assert_eq!(store.colivers().expect("colivers").len(), 1);
    assert_eq!(
        store
            .payments_for_user(&UserId::from("usr-jiwoo"))
            .expect("payments")
            .len(),
        1
    );
}

#[test]
fn onboarded_stay_blocks_the_chapter() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    submit(&service, &view.application_id);
    service
        .set_application_status(&view.application_id, ApplicationStatus::Onboarding)
        .expect("onboarded");

    let other = started(&service, MemberType::New);
    let result = service.select_chapter(&other.application_id, ChapterId::from("chp-seoul"));
    assert!(matches!(
        result,
        Err(ApplicationServiceError::ChapterUnavailable(_))
    ));

    let request = StayRequest {
        date_join: join(),
        date_leave: leave(),
        guests: GuestCount::One,
        member_type: MemberType::New,
    };
    let report = service
        .check_availability(&request, today())
        .expect("availability");
    let seoul = report
        .options
        .iter()
        .find(|option| option.chapter_id == ChapterId::from("chp-seoul"))
        .expect("seoul listed");
    assert!(!seoul.is_available);
}

use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::WizardConfig;
use crate::ids::{ChapterId, QuestionId, TemplateId, UserId};
use crate::pricing::{Chapter, GuestCount, MemberType, PricingAdjustments};
use crate::storage::InMemoryStore;
use crate::workflows::applications::{
    ApplicantDetails, ApplicationService, ApplicationView, Question, QuestionKind, QuestionSet,
};
use crate::workflows::payments::{AmountType, AutomaticPaymentTemplate, DueDateAnchor};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Far enough ahead that handlers reading the wall clock accept the stay.
pub(super) fn today() -> NaiveDate {
    date(2099, 1, 15)
}

pub(super) fn join() -> NaiveDate {
    date(2099, 3, 1)
}

pub(super) fn leave() -> NaiveDate {
    date(2099, 4, 1)
}

pub(super) fn seoul() -> Chapter {
    Chapter::flat(ChapterId::from("chp-seoul"), "Seoul", Decimal::from(30_000))
}

pub(super) fn busan() -> Chapter {
    Chapter::flat(ChapterId::from("chp-busan"), "Busan", Decimal::from(25_000))
}

pub(super) fn question(id: &str, set: QuestionSet, order: u32, kind: QuestionKind) -> Question {
    Question {
        id: QuestionId::from(id),
        set,
        text: format!("Question {id}"),
        description: String::new(),
        kind,
        choices: Vec::new(),
        order,
        is_active: true,
        required: true,
    }
}

pub(super) fn details(member_type: MemberType) -> ApplicantDetails {
    ApplicantDetails {
        first_name: "Jiwoo".to_string(),
        last_name: "Park".to_string(),
        email: "jiwoo@example.com".to_string(),
        date_join: join(),
        date_leave: leave(),
        guests: GuestCount::One,
        member_type,
    }
}

pub(super) fn deposit_template() -> AutomaticPaymentTemplate {
    AutomaticPaymentTemplate {
        id: TemplateId::from("tpl-deposit"),
        title: "Stay payment".to_string(),
        description_template: "Stay at {chapter_name} for {coliver_name}".to_string(),
        date_type: DueDateAnchor::Arrival,
        days_offset: 0,
        amount_type: AmountType::TotalCost,
        fixed_amount: None,
        percentage: None,
        is_active: true,
        applies_to_all_colivers: true,
    }
}

/// Store with two chapters, two application questions, and one reintroduction question.
pub(super) fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.put_chapter(seoul()).expect("chapter");
    store.put_chapter(busan()).expect("chapter");
    store
        .put_question(question("q-why", QuestionSet::Application, 1, QuestionKind::Text))
        .expect("question");
    store
        .put_question(question(
            "q-house-rules",
            QuestionSet::Application,
            2,
            QuestionKind::Information,
        ))
        .expect("question");
    store
        .put_question(question(
            "q-since",
            QuestionSet::Reintroduction,
            1,
            QuestionKind::Text,
        ))
        .expect("question");
    store.put_template(deposit_template()).expect("template");
    store
}

pub(super) fn build_service() -> (ApplicationService<InMemoryStore>, Arc<InMemoryStore>) {
    let store = seeded_store();
    let service = ApplicationService::new(
        Arc::clone(&store),
        PricingAdjustments::default(),
        WizardConfig::default(),
    );
    (service, store)
}

pub(super) fn started(
    service: &ApplicationService<InMemoryStore>,
    member_type: MemberType,
) -> ApplicationView {
    service
        .start(UserId::from("usr-jiwoo"), details(member_type), today())
        .expect("application starts")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

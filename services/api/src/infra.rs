use chrono::NaiveDate;
use colive::config::AppConfig;
use colive::ids::{ChapterId, QuestionId, TemplateId};
use colive::pricing::{Chapter, PricingAdjustments, PricingTier};
use colive::storage::{InMemoryStore, RepositoryError};
use colive::workflows::applications::{ApplicationService, Question, QuestionKind, QuestionSet};
use colive::workflows::onboarding::ResidencyService;
use colive::workflows::payments::{
    AmountType, AutomaticPaymentTemplate, DueDateAnchor, PaymentService,
};
use colive::workflows::requests::RequestService;
use colive::workflows::todos::TodoBoard;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every workflow service wired to one shared store.
pub(crate) struct Services {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) applications: Arc<ApplicationService<InMemoryStore>>,
    pub(crate) payments: Arc<PaymentService<InMemoryStore>>,
    pub(crate) residency: Arc<ResidencyService<InMemoryStore>>,
    pub(crate) todos: Arc<TodoBoard<InMemoryStore>>,
    pub(crate) requests: Arc<RequestService<InMemoryStore>>,
}

impl Services {
    pub(crate) fn new(store: Arc<InMemoryStore>, config: &AppConfig) -> Self {
        let applications = ApplicationService::new(
            Arc::clone(&store),
            PricingAdjustments::from(&config.pricing),
            config.wizard.clone(),
        );
        Self {
            applications: Arc::new(applications),
            payments: Arc::new(PaymentService::new(Arc::clone(&store))),
            residency: Arc::new(ResidencyService::new(Arc::clone(&store))),
            todos: Arc::new(TodoBoard::new(Arc::clone(&store))),
            requests: Arc::new(RequestService::new(Arc::clone(&store))),
            store,
        }
    }

    /// Services over the demo seed.
    pub(crate) fn seeded(config: &AppConfig) -> Result<Self, RepositoryError> {
        Ok(Self::new(seeded_store()?, config))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn won(amount: i64) -> Decimal {
    Decimal::from(amount)
}

fn tier(name: &str, duration_days: i64, price_per_night: i64, tier_order: u32) -> PricingTier {
    PricingTier {
        name: name.to_string(),
        duration_days,
        price_per_night: won(price_per_night),
        tier_order,
    }
}

pub(crate) fn demo_chapters() -> Vec<Chapter> {
    let mut seoul = Chapter::flat(ChapterId::from("chp-seoul"), "Seoul Seongsu", won(32_000));
    seoul.description = "Converted print shop next to the Seoul Forest".to_string();
    seoul.use_tiered_pricing = true;
    seoul.tiers = vec![
        tier("First week", 7, 38_000, 1),
        tier("Rest of the first month", 23, 33_000, 2),
        tier("Long stay", 365, 29_000, 3),
    ];

    let mut jeju = Chapter::flat(ChapterId::from("chp-jeju"), "Jeju Aewol", won(27_000));
    jeju.description = "Stone house a short walk from the coast".to_string();
    jeju.use_short_term_pricing = true;
    jeju.short_term_threshold_days = 14;
    jeju.short_term_price_per_night = won(36_000);

    let busan = Chapter::flat(ChapterId::from("chp-busan"), "Busan Yeongdo", won(25_000));

    vec![seoul, jeju, busan]
}

fn question(id: &str, set: QuestionSet, order: u32, kind: QuestionKind, text: &str) -> Question {
    Question {
        id: QuestionId::from(id),
        set,
        text: text.to_string(),
        description: String::new(),
        kind,
        choices: Vec::new(),
        order,
        is_active: true,
        required: kind != QuestionKind::Information,
    }
}

pub(crate) fn demo_questions() -> Vec<Question> {
    let mut work = question(
        "qst-work",
        QuestionSet::Application,
        2,
        QuestionKind::MultipleChoice,
        "How will you spend most of your days?",
    );
    work.choices = vec![
        "Remote work".to_string(),
        "Building my own project".to_string(),
        "Studying".to_string(),
    ];

    vec![
        question(
            "qst-why",
            QuestionSet::Application,
            1,
            QuestionKind::Text,
            "Why do you want to live in a coliving community?",
        ),
        work,
        question(
            "qst-house-rules",
            QuestionSet::Application,
            3,
            QuestionKind::Information,
            "Quiet hours start at 22:00 and shared spaces are cleaned together on Sundays.",
        ),
        question(
            "qst-since",
            QuestionSet::Reintroduction,
            1,
            QuestionKind::Text,
            "What has changed for you since your last stay?",
        ),
    ]
}

pub(crate) fn demo_templates() -> Vec<AutomaticPaymentTemplate> {
    vec![
        AutomaticPaymentTemplate {
            id: TemplateId::from("tpl-deposit"),
            title: "Deposit".to_string(),
            description_template: "Deposit for {coliver_name} at {chapter_name}".to_string(),
            date_type: DueDateAnchor::Arrival,
            days_offset: -14,
            amount_type: AmountType::Fixed,
            fixed_amount: Some(won(300_000)),
            percentage: None,
            is_active: true,
            applies_to_all_colivers: true,
        },
        AutomaticPaymentTemplate {
            id: TemplateId::from("tpl-stay"),
            title: "Stay payment".to_string(),
            description_template:
                "Stay at {chapter_name} from {arrival_date} to {departure_date}".to_string(),
            date_type: DueDateAnchor::Arrival,
            days_offset: 0,
            amount_type: AmountType::TotalCost,
            fixed_amount: None,
            percentage: None,
            is_active: true,
            applies_to_all_colivers: true,
        },
        AutomaticPaymentTemplate {
            id: TemplateId::from("tpl-cleaning"),
            title: "Cleaning fee".to_string(),
            description_template: "Departure cleaning for {coliver_name}".to_string(),
            date_type: DueDateAnchor::Departure,
            days_offset: 0,
            amount_type: AmountType::PercentageCost,
            fixed_amount: None,
            percentage: Some(won(5)),
            is_active: true,
            applies_to_all_colivers: false,
        },
    ]
}

/// Store preloaded with the demo chapters, questions, and payment templates.
pub(crate) fn seeded_store() -> Result<Arc<InMemoryStore>, RepositoryError> {
    let store = Arc::new(InMemoryStore::new());
    for chapter in demo_chapters() {
        store.put_chapter(chapter)?;
    }
    for question in demo_questions() {
        store.put_question(question)?;
    }
    for template in demo_templates() {
        store.put_template(template)?;
    }
    Ok(store)
}

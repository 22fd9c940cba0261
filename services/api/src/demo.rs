use crate::infra::{demo_chapters, Services};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use colive::config::AppConfig;
use colive::error::AppError;
use colive::ids::{ChapterId, TemplateId, UserId};
use colive::pricing::{
    price_stay, Chapter, ChapterRateSheet, GuestCount, MemberType, PricingAdjustments,
    StayPricing, StayTerms,
};
use colive::workflows::applications::{
    AnswerInput, ApplicantDetails, ApplicationStatus, ApplicationView, Navigation,
    ReintroductionDecision, StayRequest, WizardStep,
};
use colive::workflows::onboarding::GenerationReport;
use colive::workflows::payments::{Payment, ProofSubmission};
use colive::workflows::requests::NewMaintenanceRequest;
use colive::workflows::todos::Todo;
use rust_decimal::Decimal;
use std::path::PathBuf;

const DEMO_ANSWERS: [&str; 3] = [
    "I work remotely and want a home base with people who cook together.",
    "Remote work",
    "",
];

const REINTRODUCTION_ANSWER: &str = "I spent the winter travelling and am back for a longer stay.";

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Number of nights to price
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub(crate) nights: i64,
    /// Chapter tier CSV (chapter,tier_name,duration_days,price_per_night,tier_order)
    #[arg(long)]
    pub(crate) rate_sheet: Option<PathBuf>,
    /// Chapter to price
    #[arg(long, default_value = "Seoul Seongsu")]
    pub(crate) chapter: String,
    /// Apply the returning member discount
    #[arg(long)]
    pub(crate) returning: bool,
    /// Guests sharing the room (1 or 2)
    #[arg(long, default_value = "1", value_parser = parse_guests)]
    pub(crate) guests: GuestCount,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Only generate payments for this template (inactive templates are rejected)
    #[arg(long)]
    pub(crate) template: Option<String>,
    /// Report what would be created without writing payments
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the demo date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Days between today and the applicant's arrival
    #[arg(long, default_value_t = 21)]
    pub(crate) lead_days: i64,
    /// Length of the requested stay in nights
    #[arg(long, default_value_t = 45)]
    pub(crate) nights: i64,
    /// Run the demo as a returning member
    #[arg(long)]
    pub(crate) returning: bool,
}

fn parse_guests(raw: &str) -> Result<GuestCount, String> {
    let count = raw
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("'{raw}' is not a guest count ({err})"))?;
    GuestCount::try_from(count)
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        nights,
        rate_sheet,
        chapter: name,
        returning,
        guests,
    } = args;

    let config = AppConfig::load()?;
    let rates = PricingAdjustments::from(&config.pricing);

    let known = demo_chapters().into_iter().find(|chapter| chapter.name == name);
    let chapter = match (rate_sheet, known) {
        (Some(path), known) => {
            let sheet = ChapterRateSheet::from_path(path)?;
            let mut chapter = known.unwrap_or_else(|| {
                Chapter::flat(ChapterId::generate(), name.clone(), Decimal::ZERO)
            });
            sheet.apply_to(&name, &mut chapter)?;
            chapter
        }
        (None, Some(chapter)) => chapter,
        (None, None) => {
            let names: Vec<String> = demo_chapters().into_iter().map(|c| c.name).collect();
            println!("Unknown chapter '{}'. Known chapters: {}", name, names.join(", "));
            return Ok(());
        }
    };

    let date_join = Local::now().date_naive();
    let terms = StayTerms {
        date_join,
        date_leave: date_join + Duration::days(nights),
        member_type: if returning {
            MemberType::Returning
        } else {
            MemberType::New
        },
        guests,
        manual_cost: None,
    };
    let pricing = price_stay(&chapter, &terms, &rates);

    println!(
        "Quote for {}: {} nights ({}, {} guest{})",
        chapter.name,
        pricing.total_nights,
        terms.member_type.label(),
        u8::from(guests),
        if guests == GuestCount::Two { "s" } else { "" }
    );
    render_pricing(&pricing, "  ");
    Ok(())
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let GenerateArgs { template, dry_run } = args;
    let config = AppConfig::load()?;
    let services = Services::seeded(&config)?;
    let today = Local::now().date_naive();

    let residents = onboard_demo_residents(&services, today)?;
    println!(
        "Onboarded {} demo residents; their automatic payments were requested on onboarding.",
        residents.len()
    );

    let template_id = template.as_deref().map(TemplateId::from);
    let report = services
        .residency
        .generate_for_active_colivers(template_id.as_ref(), dry_run)?;
    render_generation(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        lead_days,
        nights,
        returning,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let date_join = today + Duration::days(lead_days);
    let date_leave = date_join + Duration::days(nights);
    let member_type = if returning {
        MemberType::Returning
    } else {
        MemberType::New
    };

    let config = AppConfig::load()?;
    let services = Services::seeded(&config)?;

    println!("Coliving workflow demo");
    println!("Stay {} -> {} as a {}", date_join, date_leave, member_type.label());

    let request = StayRequest {
        date_join,
        date_leave,
        guests: GuestCount::One,
        member_type,
    };
    let availability = match services.applications.check_availability(&request, today) {
        Ok(report) => report,
        Err(err) => {
            println!("  Stay rejected: {}", err);
            return Ok(());
        }
    };
    println!("\nAvailability for {} nights", availability.nights);
    if let Some(notice) = availability.notice {
        println!("  Note: {}", notice.message());
    }
    for option in &availability.options {
        println!(
            "  - {}: {} | from {} per night | {} total",
            option.name,
            if option.is_available { "available" } else { "booked" },
            option.nightly_rate,
            option.pricing.final_total
        );
    }

    let Some(choice) = availability
        .options
        .iter()
        .filter(|option| option.is_available)
        .min_by_key(|option| option.pricing.final_total)
    else {
        println!("  No chapter is available for these dates");
        return Ok(());
    };
    println!("  Choosing {} (lowest total)", choice.name);

    let user = UserId::from("usr-demo");
    let details = ApplicantDetails {
        first_name: "Hana".to_string(),
        last_name: "Lee".to_string(),
        email: "hana.lee@example.com".to_string(),
        date_join,
        date_leave,
        guests: GuestCount::One,
        member_type,
    };

    println!("\nApplication wizard");
    let view = submit_application(&services, user.clone(), details, choice.chapter_id.clone(), today)?;
    println!(
        "- Application {} -> {} / {}",
        view.application_id, view.status, view.application_status
    );

    let pricing = services.applications.pricing(&view.application_id)?;
    println!("  Cost breakdown:");
    render_pricing(&pricing, "    ");

    println!("\nAdmin review");
    let change = services
        .applications
        .set_application_status(&view.application_id, ApplicationStatus::Onboarding)?;
    println!("- Status moved to {}", change.application.application_status);
    if let Some(report) = &change.onboarding {
        println!(
            "  Coliver {} ({}) | booking {} | {} payments requested",
            report.coliver_id,
            if report.coliver_created { "created" } else { "updated" },
            if report.booking_created { "recorded" } else { "already present" },
            report.payments_created.len()
        );
        for failure in &report.failures {
            println!("  Template {} skipped: {}", failure.template, failure.error);
        }
    }

    println!("\nPayments");
    let ledger = services.payments.ledger_for_user(&user, today)?;
    for payment in ledger.overdue.iter().chain(&ledger.upcoming) {
        render_payment(payment);
    }
    println!("  Outstanding: {}", ledger.outstanding_total());

    let Some(first) = ledger.overdue.first().or_else(|| ledger.upcoming.first()) else {
        println!("  Nothing to pay");
        return Ok(());
    };
    let proof = ProofSubmission {
        payment_method: "bank_transfer".to_string(),
        transaction_id: "DEMO-0001".to_string(),
        proof_path: Some("payment_proofs/demo-receipt.png".to_string()),
        user_notes: String::new(),
    };
    let submitted = services.payments.submit_proof(&first.id, &user, proof)?;
    println!("- Proof sent for {} -> {}", submitted.description, submitted.status.label());
    render_todos(&services.todos.pending()?);

    let approved = services
        .payments
        .approve(&first.id, Some("Received in full".to_string()))?;
    println!("- Admin approved {} -> {}", approved.description, approved.status.label());

    println!("\nMaintenance");
    let request = services.requests.create_maintenance(NewMaintenanceRequest {
        user_id: user,
        title: "Desk lamp flickers".to_string(),
        description: "The lamp in the shared office flickers after dark.".to_string(),
        user_confirmation: true,
    })?;
    println!("- Request {} raised: {}", request.id, request.title);
    render_todos(&services.todos.pending()?);

    Ok(())
}

/// Runs one applicant through chapter selection and every question screen.
pub(crate) fn submit_application(
    services: &Services,
    user: UserId,
    details: ApplicantDetails,
    chapter_id: ChapterId,
    today: NaiveDate,
) -> Result<ApplicationView, AppError> {
    let applications = &services.applications;
    let started = applications.start(user, details, today)?;
    let id = started.application_id;
    let mut view = applications.select_chapter(&id, chapter_id)?;

    loop {
        view = match view.step {
            WizardStep::Questions { index } => applications.answer(
                &id,
                AnswerInput {
                    answer: DEMO_ANSWERS.get(index).copied().unwrap_or_default().to_string(),
                    navigation: Navigation::Next,
                },
            )?,
            WizardStep::ReintroductionChoice => {
                applications.choose_reintroduction(&id, ReintroductionDecision::Yes)?
            }
            WizardStep::Reintroduction { .. } => applications.answer(
                &id,
                AnswerInput {
                    answer: REINTRODUCTION_ANSWER.to_string(),
                    navigation: Navigation::Next,
                },
            )?,
            WizardStep::ChapterSelection | WizardStep::Complete => return Ok(view),
        };
    }
}

/// Submits and onboards one applicant per demo chapter pair.
pub(crate) fn onboard_demo_residents(
    services: &Services,
    today: NaiveDate,
) -> Result<Vec<ApplicationView>, AppError> {
    let residents = [
        ("usr-hana", "Hana", "Lee", "chp-seoul"),
        ("usr-minjun", "Minjun", "Choi", "chp-busan"),
    ];
    let date_join = today + Duration::days(14);
    let date_leave = date_join + Duration::days(30);

    let mut onboarded = Vec::with_capacity(residents.len());
    for (user, first_name, last_name, chapter) in residents {
        let details = ApplicantDetails {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            date_join,
            date_leave,
            guests: GuestCount::One,
            member_type: MemberType::New,
        };
        let view = submit_application(
            services,
            UserId::from(user),
            details,
            ChapterId::from(chapter),
            today,
        )?;
        let change = services
            .applications
            .set_application_status(&view.application_id, ApplicationStatus::Onboarding)?;
        onboarded.push(change.application);
    }
    Ok(onboarded)
}

fn render_pricing(pricing: &StayPricing, indent: &str) {
    for line in &pricing.tiers {
        println!(
            "{indent}{}: {} nights x {} = {}",
            line.label, line.nights, line.rate, line.subtotal
        );
    }
    for adjustment in &pricing.adjustments {
        println!("{indent}{}: {}", adjustment.label, adjustment.amount);
    }
    if pricing.manual_override {
        println!("{indent}Manual cost override applied");
    }
    println!("{indent}Total: {}", pricing.final_total);
    if let Some(per_guest) = pricing.per_guest {
        println!("{indent}Per guest: {}", per_guest);
    }
}

fn render_payment(payment: &Payment) {
    let due = payment
        .due_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "no due date".to_string());
    println!(
        "  - {} | {} | due {} | {}",
        payment.description,
        payment.amount,
        due,
        payment.status.label()
    );
}

fn render_todos(todos: &[Todo]) {
    if todos.is_empty() {
        println!("  Admin todos: none pending");
        return;
    }
    println!("  Admin todos:");
    for todo in todos {
        println!("    - [{}] {}", todo.task_type.label(), todo.title);
    }
}

fn render_generation(report: &GenerationReport) {
    println!(
        "{} {} templates across {} active colivers",
        if report.dry_run { "Previewed" } else { "Applied" },
        report.templates,
        report.colivers
    );
    for planned in &report.created {
        println!(
            "  - {} for {}: {} due {}",
            planned.template, planned.coliver_name, planned.amount, planned.due_date
        );
    }
    println!("  Already requested: {}", report.already_existing);
    for failure in &report.failures {
        println!("  Template {} failed: {}", failure.template, failure.error);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{ApplicationId, ChapterId, UserId};
use crate::pricing::{GuestCount, MemberType, StayTerms};

/// Applicant-facing lifecycle of the form itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Withdrawn,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "Draft",
            SubmissionStatus::Submitted => "Submitted",
            SubmissionStatus::Withdrawn => "Withdrawn",
        }
    }
}

/// Coarse review status managed by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    ApprovedForInterview,
    ScheduledInterview,
    InterviewPassed,
    Rejected,
    Accepted,
    WaitingList,
    #[default]
    InProgress,
    Submitted,
    Withdrawn,
    Onboarding,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::ApprovedForInterview => "Approved for interview",
            ApplicationStatus::ScheduledInterview => "Scheduled interview",
            ApplicationStatus::InterviewPassed => "Interview passed",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::WaitingList => "Waiting list",
            ApplicationStatus::InProgress => "Application in progress",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Withdrawn => "Withdrawn",
            ApplicationStatus::Onboarding => "Onboarding",
        }
    }
}

/// Identity and stay fields collected on the first wizard screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_join: NaiveDate,
    pub date_leave: NaiveDate,
    #[serde(default)]
    pub guests: GuestCount,
    #[serde(default)]
    pub member_type: MemberType,
}

impl ApplicantDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A prospective resident's request to stay at a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub details: ApplicantDetails,
    pub status: SubmissionStatus,
    pub application_status: ApplicationStatus,
    pub chapter_id: Option<ChapterId>,
    pub manual_cost: Option<Decimal>,
    pub is_active: bool,
    pub wants_reintroduction: Option<bool>,
    pub reintroduction_completed: bool,
}

impl Application {
    pub fn new(user_id: UserId, details: ApplicantDetails) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::generate(),
            user_id,
            created_at: now,
            modified_at: now,
            details,
            status: SubmissionStatus::Draft,
            application_status: ApplicationStatus::InProgress,
            chapter_id: None,
            manual_cost: None,
            is_active: true,
            wants_reintroduction: None,
            reintroduction_completed: false,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.status == SubmissionStatus::Draft
    }

    pub fn is_returning_member(&self) -> bool {
        self.details.member_type == MemberType::Returning
    }

    pub fn stay_terms(&self) -> StayTerms {
        StayTerms {
            date_join: self.details.date_join,
            date_leave: self.details.date_leave,
            member_type: self.details.member_type,
            guests: self.details.guests,
            manual_cost: self.manual_cost,
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

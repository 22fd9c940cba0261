use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, SubmissionStatus};
use super::questions::{first_unanswered, Question};
use super::repository::ApplicationRecord;
use crate::ids::{ChapterId, QuestionId};

/// Screen the applicant is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardStep {
    ChapterSelection,
    Questions { index: usize },
    ReintroductionChoice,
    Reintroduction { index: usize },
    Complete,
}

impl WizardStep {
    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::ChapterSelection => "chapter_selection",
            WizardStep::Questions { .. } => "questions",
            WizardStep::ReintroductionChoice => "reintroduction_choice",
            WizardStep::Reintroduction { .. } => "reintroduction",
            WizardStep::Complete => "complete",
        }
    }
}

/// Wizard position persisted with the application, plus every step left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub history: Vec<WizardStep>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::ChapterSelection,
            history: Vec::new(),
        }
    }
}

impl WizardState {
    fn enter(&mut self, step: WizardStep) -> WizardStep {
        if self.step != step {
            self.history.push(self.step);
            self.step = step;
        }
        step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    #[default]
    Next,
    Previous,
    BackToChapter,
    BackToReintroductionChoice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub navigation: Navigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReintroductionDecision {
    Yes,
    No,
    BackToChapter,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("application is {} and can no longer be edited", .0.label())]
    NotEditable(SubmissionStatus),
    #[error("expected the {expected} step but the application is at {}", .actual.label())]
    WrongStep {
        expected: &'static str,
        actual: WizardStep,
    },
    #[error("question {0} requires an answer")]
    AnswerRequired(QuestionId),
    #[error("{0:?} is not available on this screen")]
    InvalidNavigation(Navigation),
    #[error("reintroduction is only offered to returning members")]
    NotReturningMember,
}

#[derive(Clone, Copy)]
enum QuestionFlow {
    Regular,
    Reintroduction,
}

/// Drives one application record through the wizard screens.
pub(crate) struct Wizard<'a> {
    record: &'a mut ApplicationRecord,
    questions: &'a [Question],
    reintroduction: &'a [Question],
}

impl<'a> Wizard<'a> {
    pub(crate) fn new(
        record: &'a mut ApplicationRecord,
        questions: &'a [Question],
        reintroduction: &'a [Question],
    ) -> Self {
        Self {
            record,
            questions,
            reintroduction,
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.record.application.is_editable() {
            Ok(())
        } else {
            Err(WizardError::NotEditable(self.record.application.status))
        }
    }

    pub(crate) fn select_chapter(&mut self, chapter: ChapterId) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        self.record.application.chapter_id = Some(chapter);

        if self.questions.is_empty() {
            return Ok(self.after_regular_questions());
        }
        let step = self.resume_step();
        Ok(self.record.wizard.enter(step))
    }

    pub(crate) fn answer(&mut self, input: AnswerInput) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        match self.record.wizard.step {
            WizardStep::Questions { index } => self.answer_in(QuestionFlow::Regular, index, input),
            WizardStep::Reintroduction { index } => {
                self.answer_in(QuestionFlow::Reintroduction, index, input)
            }
            actual => Err(WizardError::WrongStep {
                expected: "question",
                actual,
            }),
        }
    }

    pub(crate) fn choose_reintroduction(
        &mut self,
        decision: ReintroductionDecision,
    ) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        if !self.record.application.is_returning_member() {
            return Err(WizardError::NotReturningMember);
        }
        let actual = self.record.wizard.step;
        if actual != WizardStep::ReintroductionChoice {
            return Err(WizardError::WrongStep {
                expected: "reintroduction_choice",
                actual,
            });
        }

        match decision {
            ReintroductionDecision::Yes => {
                self.record.application.wants_reintroduction = Some(true);
                if self.reintroduction.is_empty() {
                    self.record.application.reintroduction_completed = true;
                    return Ok(self.finalize());
                }
                let index = first_unanswered(self.reintroduction, &self.record.reintroduction_answers)
                    .min(self.reintroduction.len() - 1);
                Ok(self.record.wizard.enter(WizardStep::Reintroduction { index }))
            }
            ReintroductionDecision::No => {
                self.record.application.wants_reintroduction = Some(false);
                Ok(self.finalize())
            }
            ReintroductionDecision::BackToChapter => {
                self.record.application.wants_reintroduction = None;
                Ok(self.record.wizard.enter(WizardStep::ChapterSelection))
            }
        }
    }

    /// Re-enter the sequence where the applicant left off.
    pub(crate) fn resume(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        let step = self.resume_step();
        Ok(self.record.wizard.enter(step))
    }

    fn resume_step(&self) -> WizardStep {
        let application = &self.record.application;

        if application.chapter_id.is_none() {
            WizardStep::ChapterSelection
        } else {
            let index = first_unanswered(self.questions, &self.record.answers);
            if index < self.questions.len() {
                WizardStep::Questions { index }
            } else if application.is_returning_member() {
                match application.wants_reintroduction {
                    Some(true) if !self.reintroduction.is_empty() => {
                        let index =
                            first_unanswered(self.reintroduction, &self.record.reintroduction_answers)
                                .min(self.reintroduction.len() - 1);
                        WizardStep::Reintroduction { index }
                    }
                    _ => WizardStep::ReintroductionChoice,
                }
            } else if self.questions.is_empty() {
                WizardStep::ChapterSelection
            } else {
                WizardStep::Questions {
                    index: self.questions.len() - 1,
                }
            }
        }
    }

    fn answer_in(
        &mut self,
        flow: QuestionFlow,
        index: usize,
        input: AnswerInput,
    ) -> Result<WizardStep, WizardError> {
        let questions = match flow {
            QuestionFlow::Regular => self.questions,
            QuestionFlow::Reintroduction => self.reintroduction,
        };
        let Some(question) = questions.get(index) else {
            // The question set shrank since this step was stored.
            return self.resume();
        };

        let answer = input.answer;
        let has_content = !answer.trim().is_empty();

        match input.navigation {
            Navigation::Next => {
                if question.requires_answer() && !has_content {
                    return Err(WizardError::AnswerRequired(question.id.clone()));
                }
                self.store(flow, &question.id, answer);
                if index + 1 < questions.len() {
                    return Ok(self.record.wizard.enter(step_for(flow, index + 1)));
                }
                match flow {
                    QuestionFlow::Regular => Ok(self.after_regular_questions()),
                    QuestionFlow::Reintroduction => {
                        self.record.application.reintroduction_completed = true;
                        Ok(self.finalize())
                    }
                }
            }
            Navigation::Previous => {
                if has_content {
                    self.store(flow, &question.id, answer);
                }
                Ok(self
                    .record
                    .wizard
                    .enter(step_for(flow, index.saturating_sub(1))))
            }
            Navigation::BackToChapter => {
                if has_content {
                    self.store(flow, &question.id, answer);
                }
                if matches!(flow, QuestionFlow::Reintroduction) {
                    self.record.application.wants_reintroduction = None;
                }
                Ok(self.record.wizard.enter(WizardStep::ChapterSelection))
            }
            Navigation::BackToReintroductionChoice => match flow {
                QuestionFlow::Regular => Err(WizardError::InvalidNavigation(input.navigation)),
                QuestionFlow::Reintroduction => {
                    if has_content {
                        self.store(flow, &question.id, answer);
                    }
                    Ok(self.record.wizard.enter(WizardStep::ReintroductionChoice))
                }
            },
        }
    }

    fn store(&mut self, flow: QuestionFlow, question: &QuestionId, answer: String) {
        let answers: &mut BTreeMap<QuestionId, String> = match flow {
            QuestionFlow::Regular => &mut self.record.answers,
            QuestionFlow::Reintroduction => &mut self.record.reintroduction_answers,
        };
        answers.insert(question.clone(), answer);
    }

    fn after_regular_questions(&mut self) -> WizardStep {
        if self.record.application.is_returning_member() {
            self.record.wizard.enter(WizardStep::ReintroductionChoice)
        } else {
            self.finalize()
        }
    }

    fn finalize(&mut self) -> WizardStep {
        let application = &mut self.record.application;
        application.status = SubmissionStatus::Submitted;
        application.application_status = ApplicationStatus::Submitted;
        self.record.wizard.enter(WizardStep::Complete)
    }
}

fn step_for(flow: QuestionFlow, index: usize) -> WizardStep {
    match flow {
        QuestionFlow::Regular => WizardStep::Questions { index },
        QuestionFlow::Reintroduction => WizardStep::Reintroduction { index },
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::QuestionId;

/// Which screen sequence a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSet {
    Application,
    Reintroduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Text,
    MultipleChoice,
    /// Display-only screen; never needs an answer.
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub set: QuestionSet,
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub choices: Vec<String>,
    pub order: u32,
    pub is_active: bool,
    pub required: bool,
}

impl Question {
    pub fn requires_answer(&self) -> bool {
        self.required && self.kind != QuestionKind::Information
    }

    pub fn is_answered_by(&self, answers: &BTreeMap<QuestionId, String>) -> bool {
        if !self.requires_answer() {
            return answers.contains_key(&self.id);
        }
        answers
            .get(&self.id)
            .is_some_and(|answer| !answer.trim().is_empty())
    }
}

/// Active questions of one set in display order.
pub fn active_in_order(questions: impl IntoIterator<Item = Question>, set: QuestionSet) -> Vec<Question> {
    let mut active: Vec<Question> = questions
        .into_iter()
        .filter(|question| question.is_active && question.set == set)
        .collect();
    active.sort_by_key(|question| question.order);
    active
}

/// Index of the first question still missing an answer, or `questions.len()`.
pub fn first_unanswered(questions: &[Question], answers: &BTreeMap<QuestionId, String>) -> usize {
    questions
        .iter()
        .position(|question| !question.is_answered_by(answers))
        .unwrap_or(questions.len())
}

//! Survey data model and schema enforcement.
//!
//! A survey is accepted only when it parses into exactly the
//! `{title, introduction, questions: [{question, options: [{option}]}]}` shape.
//! Question and option counts are conventions asked of the generator, not part
//! of the shape; [`Survey::follows_conventions`] reports on them without
//! rejecting anything.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SchemaError, SchemaResult};

/// Number of questions the generator is asked to produce.
pub const CONVENTIONAL_QUESTION_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Number of options per question the generator is asked to produce.
pub const CONVENTIONAL_OPTION_COUNT: usize = 3;

/// A generated questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Survey {
    /// Short survey title.
    pub title: String,
    /// One or two sentences introducing the topic.
    pub introduction: String,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
}

/// A single survey question with its answer choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// Question text.
    pub question: String,
    /// Answer choices in presentation order.
    pub options: Vec<SurveyOption>,
}

/// An answer-choice label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyOption {
    pub option: String,
}

/// Parse survey text, rejecting anything that is not valid JSON in the survey shape.
pub fn parse(raw: &str) -> SchemaResult<Survey> {
    serde_json::from_str(raw).map_err(|e| {
        let err = SchemaError::from(e);
        if let Some(field) = err.unknown_field() {
            warn!(field = %field, "Survey rejected: field is not part of the survey shape");
        }
        err
    })
}

impl Survey {
    /// Create a survey from its parts
    pub fn new(
        title: impl Into<String>,
        introduction: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            title: title.into(),
            introduction: introduction.into(),
            questions,
        }
    }

    /// Serialize as a single-line JSON document
    pub fn to_compact_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize as indented JSON for display
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Whether the survey has 3-5 questions with three options each.
    pub fn follows_conventions(&self) -> bool {
        CONVENTIONAL_QUESTION_RANGE.contains(&self.questions.len())
            && self
                .questions
                .iter()
                .all(|q| q.options.len() == CONVENTIONAL_OPTION_COUNT)
    }
}

impl Question {
    /// Create a question from its text and option labels
    pub fn new<I, S>(question: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.into(),
            options: options.into_iter().map(SurveyOption::new).collect(),
        }
    }
}

impl SurveyOption {
    /// Create an option label
    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: option.into(),
        }
    }
}

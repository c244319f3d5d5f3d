//! Survey orchestration.
//!
//! [`SurveyAgent`] owns the session: the current survey, the chat history and
//! the store. It drives the generate, update and analyze workflows against two
//! injected collaborators, a [`SurveyService`] (language model) and a
//! [`ResponseSource`] (spreadsheet). Each external call is made once; failures
//! are logged and handed back to the caller, never retried.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::aggregate::{aggregate, AggregationReport, ResponseTable};
use crate::error::{AppResult, ServiceError, ServiceResult};
use crate::history::{ChatHistory, Role};
use crate::storage::SurveyStore;
use crate::survey::{self, Survey};

/// Note recorded while a survey is being generated.
pub const GENERATING_NOTE: &str = "Generating survey...";

/// Note recorded while a survey is being updated.
pub const UPDATING_NOTE: &str = "Updating survey...";

/// Language-model operations the agent depends on.
///
/// Each method returns the raw completion text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveyService: Send + Sync {
    /// Draft a survey JSON document for a topic.
    async fn generate_survey(&self, topic: &str) -> ServiceResult<String>;

    /// Rewrite a survey according to free-text instructions.
    async fn edit_survey(&self, survey: &Survey, instructions: &str) -> ServiceResult<String>;

    /// Write an executive summary with "Overview" and "Analysis" sections.
    async fn summarize(
        &self,
        survey: &Survey,
        report: &AggregationReport,
    ) -> ServiceResult<String>;
}

/// Source of response rows for the survey.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Fetch the response table, header row first.
    async fn fetch_rows(&self) -> ServiceResult<ResponseTable>;
}

/// Where the session's survey is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Generated,
    Edited,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Empty => write!(f, "empty"),
            SessionState::Generated => write!(f, "generated"),
            SessionState::Edited => write!(f, "edited"),
        }
    }
}

/// Single-session survey agent
pub struct SurveyAgent<S, R> {
    service: S,
    source: R,
    store: SurveyStore,
    history: ChatHistory,
    survey: Option<Survey>,
    state: SessionState,
}

impl<S, R> SurveyAgent<S, R>
where
    S: SurveyService,
    R: ResponseSource,
{
    /// Create an agent with an empty session
    pub fn new(service: S, source: R, store: SurveyStore, history: ChatHistory) -> Self {
        Self {
            service,
            source,
            store,
            history,
            survey: None,
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The session's current survey, if one was generated
    pub fn current(&self) -> Option<&Survey> {
        self.survey.as_ref()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn store(&self) -> &SurveyStore {
        &self.store
    }

    /// Generate a survey for `topic`, record it and save it.
    ///
    /// On failure nothing is saved and the session keeps its previous state.
    pub async fn generate(&mut self, topic: &str) -> ServiceResult<Survey> {
        self.record(Role::User, topic);
        self.record(Role::Assistant, GENERATING_NOTE);

        let survey = match self.request_generation(topic).await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, topic = %topic, "Survey generation failed");
                return Err(e);
            }
        };

        self.accept(survey.clone(), SessionState::Generated);
        info!(
            title = %survey.title,
            questions = survey.questions.len(),
            "Survey generated"
        );
        Ok(survey)
    }

    /// Apply free-text `instructions` to `survey`.
    ///
    /// Returns the replacement survey, or `survey` unchanged when the edit
    /// service fails. An empty session has nothing to edit, so `survey` is
    /// returned without calling the service.
    pub async fn update(&mut self, survey: &Survey, instructions: &str) -> Survey {
        if self.state == SessionState::Empty {
            warn!("No survey has been generated yet, ignoring edit request");
            return survey.clone();
        }

        self.record(Role::User, instructions);
        self.record(Role::Assistant, UPDATING_NOTE);

        match self.request_edit(survey, instructions).await {
            Ok(updated) => {
                self.accept(updated.clone(), SessionState::Edited);
                info!(
                    title = %updated.title,
                    questions = updated.questions.len(),
                    "Survey updated"
                );
                updated
            }
            Err(e) => {
                error!(error = %e, "Survey update failed, keeping the current survey");
                survey.clone()
            }
        }
    }

    /// Summarize the responses collected for the saved survey.
    ///
    /// Loads the survey file, fetches the response rows, aggregates them and
    /// asks the summarization service for a report, which is recorded and
    /// saved to the analysis file.
    pub async fn analyze(&mut self) -> AppResult<String> {
        let survey = self.store.load_survey()?;

        let rows = self.source.fetch_rows().await.map_err(|e| {
            error!(error = %e, "Fetching survey responses failed");
            e
        })?;

        let report = aggregate(&rows, &survey.title, &survey.introduction);
        info!(
            rows = rows.len(),
            questions = report.questions.len(),
            max_votes = report.max_votes(),
            "Responses aggregated"
        );

        let text = self.service.summarize(&survey, &report).await.map_err(|e| {
            error!(error = %e, "Survey summarization failed");
            e
        })?;

        self.record(Role::Assistant, text.as_str());
        if let Err(e) = self.store.save_analysis(&text) {
            error!(error = %e, "Failed to save analysis");
        }

        Ok(text)
    }

    async fn request_generation(&self, topic: &str) -> ServiceResult<Survey> {
        let raw = self.service.generate_survey(topic).await?;
        Ok(survey::parse(&raw)?)
    }

    async fn request_edit(&self, survey: &Survey, instructions: &str) -> ServiceResult<Survey> {
        let raw = self.service.edit_survey(survey, instructions).await?;
        survey::parse(&raw).map_err(ServiceError::from)
    }

    /// Make `survey` the session's survey, record it and save it.
    fn accept(&mut self, survey: Survey, state: SessionState) {
        if !survey.follows_conventions() {
            warn!(
                questions = survey.questions.len(),
                "Survey departs from the 3-5 questions, 3 options convention"
            );
        }

        match serde_json::to_value(&survey) {
            Ok(value) => self.record(Role::Assistant, value),
            Err(e) => error!(error = %e, "Failed to record survey in chat history"),
        }

        if let Err(e) = self.store.save_survey(&survey) {
            error!(error = %e, "Failed to save survey");
        }

        self.survey = Some(survey);
        self.state = state;
    }

    fn record(&mut self, role: Role, content: impl Into<Value>) {
        if let Err(e) = self.history.append(role, content) {
            error!(error = %e, "Failed to save chat history");
        }
    }
}

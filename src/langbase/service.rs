use async_trait::async_trait;
use tracing::debug;

use super::client::LangbaseClient;
use super::types::{strip_code_fence, Message, PipeRequest};
use crate::agent::SurveyService;
use crate::aggregate::AggregationReport;
use crate::config::PipeConfig;
use crate::error::{SchemaError, ServiceResult};
use crate::prompts::{
    edit_message, generation_message, summary_message, SURVEY_EDIT_PROMPT,
    SURVEY_GENERATION_PROMPT, SURVEY_SUMMARY_PROMPT,
};
use crate::survey::Survey;

/// [`SurveyService`] backed by three Langbase pipes
#[derive(Clone)]
pub struct LangbaseSurveyService {
    client: LangbaseClient,
    pipes: PipeConfig,
}

impl LangbaseSurveyService {
    pub fn new(client: LangbaseClient, pipes: PipeConfig) -> Self {
        Self { client, pipes }
    }

    async fn complete(&self, pipe: &str, messages: Vec<Message>) -> ServiceResult<String> {
        let response = self.client.call_pipe(PipeRequest::new(pipe, messages)).await?;
        debug!(pipe = %pipe, chars = response.completion.len(), "Completion received");
        Ok(response.completion)
    }
}

#[async_trait]
impl SurveyService for LangbaseSurveyService {
    async fn generate_survey(&self, topic: &str) -> ServiceResult<String> {
        let messages = vec![
            Message::system(SURVEY_GENERATION_PROMPT),
            Message::user(generation_message(topic)),
        ];
        let completion = self.complete(&self.pipes.generate, messages).await?;
        Ok(strip_code_fence(&completion).to_string())
    }

    async fn edit_survey(&self, survey: &Survey, instructions: &str) -> ServiceResult<String> {
        let current = survey.to_pretty_json().map_err(SchemaError::from)?;
        let messages = vec![
            Message::system(SURVEY_EDIT_PROMPT),
            Message::user(edit_message(&current, instructions)),
        ];
        let completion = self.complete(&self.pipes.edit, messages).await?;
        Ok(strip_code_fence(&completion).to_string())
    }

    async fn summarize(
        &self,
        survey: &Survey,
        report: &AggregationReport,
    ) -> ServiceResult<String> {
        let messages = vec![
            Message::system(SURVEY_SUMMARY_PROMPT),
            Message::user(summary_message(survey, report)),
        ];
        let completion = self.complete(&self.pipes.summarize, messages).await?;
        Ok(completion.trim().to_string())
    }
}

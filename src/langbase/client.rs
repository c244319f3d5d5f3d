use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{CreatePipeRequest, CreatePipeResponse, Message, PipeRequest, PipeResponse, PipeStatus};
use crate::config::{LangbaseConfig, PipeConfig, RequestConfig};
use crate::error::{LangbaseError, LangbaseResult};
use crate::prompts::{SURVEY_EDIT_PROMPT, SURVEY_GENERATION_PROMPT, SURVEY_SUMMARY_PROMPT};

/// Client for interacting with Langbase Pipes API
#[derive(Clone)]
pub struct LangbaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl LangbaseClient {
    /// Create a new Langbase client
    pub fn new(config: &LangbaseConfig, request_config: RequestConfig) -> LangbaseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LangbaseError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Call a Langbase pipe with the given request.
    ///
    /// A single attempt is made; failures are returned to the caller as-is.
    pub async fn call_pipe(&self, request: PipeRequest) -> LangbaseResult<PipeResponse> {
        let url = format!("{}/v1/pipes/run", self.base_url);
        let start = Instant::now();

        debug!(
            pipe = %request.name,
            messages = request.messages.len(),
            "Calling Langbase pipe"
        );

        match self.execute_request(&url, &request).await {
            Ok(response) => {
                info!(
                    pipe = %request.name,
                    latency_ms = start.elapsed().as_millis(),
                    total_tokens = ?response.total_tokens(),
                    "Langbase pipe call succeeded"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    pipe = %request.name,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Langbase pipe call failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        request: &PipeRequest,
    ) -> LangbaseResult<PipeResponse> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LangbaseError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    LangbaseError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: PipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        if !pipe_response.success {
            return Err(LangbaseError::InvalidResponse {
                message: "Pipe reported an unsuccessful run".to_string(),
            });
        }

        Ok(pipe_response)
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new pipe
    pub async fn create_pipe(
        &self,
        request: CreatePipeRequest,
    ) -> LangbaseResult<CreatePipeResponse> {
        let url = format!("{}/v1/pipes", self.base_url);

        info!(pipe = %request.name, "Creating Langbase pipe");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LangbaseError::Http)?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let pipe_response: CreatePipeResponse =
            response
                .json()
                .await
                .map_err(|e| LangbaseError::InvalidResponse {
                    message: format!("Failed to parse create pipe response: {}", e),
                })?;

        info!(
            pipe = %pipe_response.name,
            url = %pipe_response.url,
            "Pipe created successfully"
        );

        Ok(pipe_response)
    }

    /// Ensure the generate, edit and summarize pipes exist, creating them if needed
    pub async fn ensure_survey_pipes(&self, pipes: &PipeConfig) -> LangbaseResult<()> {
        let definitions = [
            (
                pipes.generate.as_str(),
                "Survey generation from a topic",
                SURVEY_GENERATION_PROMPT,
                true,
            ),
            (
                pipes.edit.as_str(),
                "Survey editing from free-text instructions",
                SURVEY_EDIT_PROMPT,
                true,
            ),
            (
                pipes.summarize.as_str(),
                "Executive summary of aggregated survey responses",
                SURVEY_SUMMARY_PROMPT,
                false,
            ),
        ];

        for (name, description, prompt, json_output) in definitions {
            let request = CreatePipeRequest::new(name)
                .with_description(description)
                .with_status(PipeStatus::Private)
                .with_model(&pipes.model)
                .with_upsert(true)
                .with_json_output(json_output)
                .with_store(true)
                .with_temperature(0.7)
                .with_max_tokens(2000)
                .with_messages(vec![Message::system(prompt)]);

            match self.create_pipe(request).await {
                Ok(_) => info!(pipe = %name, "Survey pipe ready"),
                Err(LangbaseError::Api { status: 409, .. }) => {
                    // Pipe already exists, that's fine
                    info!(pipe = %name, "Pipe already exists");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

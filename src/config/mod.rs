use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub langbase: LangbaseConfig,
    pub sheets: SheetsConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Spreadsheet source configuration.
///
/// The access token is an already-issued OAuth bearer token; obtaining and
/// refreshing it happens outside this program.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub range: String,
}

/// Locations of the flat files the agent writes
#[derive(Debug, Clone)]
pub struct FilesConfig {
    pub survey_path: PathBuf,
    pub analysis_path: PathBuf,
    pub history_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Langbase pipe name configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    pub generate: String,
    pub edit: String,
    pub summarize: String,
    /// Model the pipes are created with
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = LangbaseConfig {
            api_key: env::var("LANGBASE_API_KEY").map_err(|_| AppError::Config {
                message: "LANGBASE_API_KEY is required".to_string(),
            })?,
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let sheets = SheetsConfig {
            base_url: env::var("SHEETS_BASE_URL")
                .unwrap_or_else(|_| "https://sheets.googleapis.com".to_string()),
            access_token: non_empty_var("SHEETS_ACCESS_TOKEN"),
            spreadsheet_id: non_empty_var("SHEETS_SPREADSHEET_ID"),
            range: env::var("SHEETS_RANGE").unwrap_or_else(|_| "Form Responses 1!A:Z".to_string()),
        };

        let files = FilesConfig {
            survey_path: PathBuf::from(
                env::var("SURVEY_PATH").unwrap_or_else(|_| "survey.json".to_string()),
            ),
            analysis_path: PathBuf::from(
                env::var("ANALYSIS_PATH").unwrap_or_else(|_| "analysis.json".to_string()),
            ),
            history_path: PathBuf::from(
                env::var("CHAT_HISTORY_PATH").unwrap_or_else(|_| "chat_history.json".to_string()),
            ),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
        };

        let pipes = PipeConfig {
            generate: env::var("PIPE_SURVEY_GENERATE")
                .unwrap_or_else(|_| "survey-generate-v1".to_string()),
            edit: env::var("PIPE_SURVEY_EDIT").unwrap_or_else(|_| "survey-edit-v1".to_string()),
            summarize: env::var("PIPE_SURVEY_SUMMARIZE")
                .unwrap_or_else(|_| "survey-summarize-v1".to_string()),
            model: env::var("LANGBASE_MODEL").unwrap_or_else(|_| "openai:gpt-4o-mini".to_string()),
        };

        Ok(Config {
            langbase,
            sheets,
            files,
            logging,
            request,
            pipes,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            survey_path: PathBuf::from("survey.json"),
            analysis_path: PathBuf::from("analysis.json"),
            history_path: PathBuf::from("chat_history.json"),
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            generate: "survey-generate-v1".to_string(),
            edit: "survey-edit-v1".to_string(),
            summarize: "survey-summarize-v1".to_string(),
            model: "openai:gpt-4o-mini".to_string(),
        }
    }
}

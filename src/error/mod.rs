use std::path::PathBuf;

use serde_json::error::Category;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Survey text that does not parse into the survey shape
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Survey is not valid JSON: {message}")]
    Syntax { message: String },

    #[error("Survey has the wrong shape: {message}")]
    Shape { message: String },
}

/// Flat-file persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Spreadsheet source errors
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Missing spreadsheet setting: {name}")]
    MissingSetting { name: String },

    #[error("Invalid Sheets URL: {message}")]
    InvalidUrl { message: String },

    #[error("Sheets API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid Sheets response: {message}")]
    InvalidResponse { message: String },

    #[error("Sheets request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures of an external collaborator as seen by the agent
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Language model call failed: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Spreadsheet fetch failed: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Service returned a malformed survey: {0}")]
    MalformedSurvey(#[from] SchemaError),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => SchemaError::Shape {
                message: err.to_string(),
            },
            Category::Syntax | Category::Eof | Category::Io => SchemaError::Syntax {
                message: err.to_string(),
            },
        }
    }
}

impl SchemaError {
    /// Name of the field that made the shape check fail because the survey
    /// shape has no such field.
    pub fn unknown_field(&self) -> Option<&str> {
        match self {
            SchemaError::Shape { message } => message
                .strip_prefix("unknown field `")
                .and_then(|rest| rest.split('`').next()),
            SchemaError::Syntax { .. } => None,
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for survey parsing
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for spreadsheet operations
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Result type alias for external service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

//! # Survey Agent
//!
//! A command-line survey assistant. It drafts a survey for a topic through a
//! Langbase pipe, edits it from free-text instructions, and summarizes the
//! responses collected in a spreadsheet.
//!
//! ## Architecture
//!
//! ```text
//! CLI → SurveyAgent ──→ Langbase Pipes (generate / edit / summarize)
//!           │  └──────→ Google Sheets (response rows) → aggregate
//!           ↓
//!   survey.json · analysis.json · chat_history.json
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use survey_agent::{Config, SurveyAgent};
//! use survey_agent::history::ChatHistory;
//! use survey_agent::langbase::{LangbaseClient, LangbaseSurveyService};
//! use survey_agent::sheets::SheetsClient;
//! use survey_agent::storage::SurveyStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = LangbaseClient::new(&config.langbase, config.request.clone())?;
//!     let service = LangbaseSurveyService::new(client, config.pipes.clone());
//!     let sheets = SheetsClient::new(&config.sheets, &config.request)?;
//!     let mut agent = SurveyAgent::new(
//!         service,
//!         sheets,
//!         SurveyStore::from_config(&config.files),
//!         ChatHistory::open(&config.files.history_path),
//!     );
//!     let survey = agent.generate("remote work").await?;
//!     println!("{}", survey.to_pretty_json()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Session orchestration over the language model and spreadsheet services.
pub mod agent;
/// Response table aggregation into per-question distributions.
pub mod aggregate;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Append-only chat transcript.
pub mod history;
/// Langbase API client and the survey service built on it.
pub mod langbase;
/// System prompts and message builders for the survey pipes.
pub mod prompts;
/// Spreadsheet response source.
pub mod sheets;
/// Flat-file persistence for surveys and analyses.
pub mod storage;
/// Survey data model and schema.
pub mod survey;

pub use agent::{SessionState, SurveyAgent};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use survey::Survey;

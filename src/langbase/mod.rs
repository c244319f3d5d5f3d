//! Langbase Pipes client and the survey service built on it.

mod client;
mod service;
mod types;


pub use client::LangbaseClient;
pub use service::LangbaseSurveyService;
pub use types::*;

//! Flat-file persistence for surveys and analysis summaries.
//!
//! Every save replaces the target file completely. Content is written to a
//! sibling temporary file first and renamed into place, so a failed save leaves
//! the previous file as it was.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FilesConfig;
use crate::error::{StoreError, StoreResult};
use crate::survey::{self, Survey};

/// Wrapper written to the analysis file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    /// Summary text as returned by the summarization service.
    pub analysis: String,
    pub generated_at: DateTime<Utc>,
}

/// Survey and analysis files for one working directory
#[derive(Debug, Clone)]
pub struct SurveyStore {
    survey_path: PathBuf,
    analysis_path: PathBuf,
}

impl SurveyStore {
    /// Create a store writing to the given files
    pub fn new(survey_path: impl Into<PathBuf>, analysis_path: impl Into<PathBuf>) -> Self {
        Self {
            survey_path: survey_path.into(),
            analysis_path: analysis_path.into(),
        }
    }

    /// Create a store from the files configuration
    pub fn from_config(files: &FilesConfig) -> Self {
        Self::new(&files.survey_path, &files.analysis_path)
    }

    pub fn survey_path(&self) -> &Path {
        &self.survey_path
    }

    pub fn analysis_path(&self) -> &Path {
        &self.analysis_path
    }

    pub fn save_survey(&self, survey: &Survey) -> StoreResult<()> {
        save_survey(survey, &self.survey_path)
    }

    pub fn save_survey_text(&self, raw: &str) -> StoreResult<Survey> {
        save_survey_text(raw, &self.survey_path)
    }

    pub fn load_survey(&self) -> StoreResult<Survey> {
        load_survey(&self.survey_path)
    }

    pub fn save_analysis(&self, text: &str) -> StoreResult<AnalysisDocument> {
        save_analysis(text, &self.analysis_path)
    }
}

/// Write a survey as a single-line JSON document, replacing `target`.
pub fn save_survey(survey: &Survey, target: &Path) -> StoreResult<()> {
    let json = survey.to_compact_json()?;
    write_replacing(target, json.as_bytes())?;
    info!(path = %target.display(), title = %survey.title, "Survey saved");
    Ok(())
}

/// Parse survey text and save it.
///
/// When the text does not parse, `target` is not touched.
pub fn save_survey_text(raw: &str, target: &Path) -> StoreResult<Survey> {
    let survey = survey::parse(raw)?;
    save_survey(&survey, target)?;
    Ok(survey)
}

/// Read and parse a survey file
pub fn load_survey(source: &Path) -> StoreResult<Survey> {
    let raw = fs::read_to_string(source).map_err(|source_err| StoreError::Io {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    let survey = survey::parse(&raw)?;
    debug!(path = %source.display(), questions = survey.questions.len(), "Survey loaded");
    Ok(survey)
}

/// Save summary text wrapped in an indented JSON document.
pub fn save_analysis(text: &str, target: &Path) -> StoreResult<AnalysisDocument> {
    let document = AnalysisDocument {
        analysis: text.to_string(),
        generated_at: Utc::now(),
    };
    let json = serde_json::to_string_pretty(&document)?;
    write_replacing(target, json.as_bytes())?;
    info!(path = %target.display(), "Analysis saved");
    Ok(document)
}

/// Replace the contents of `target` with `contents`.
pub(crate) fn write_replacing(target: &Path, contents: &[u8]) -> StoreResult<()> {
    let io_err = |source: io::Error| StoreError::Io {
        path: target.to_path_buf(),
        source,
    };

    let file_name = target.file_name().ok_or_else(|| {
        io_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "target has no file name",
        ))
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = target.with_file_name(tmp_name);

    fs::write(&tmp_path, contents).map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::survey::Question;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_survey() -> Survey {
        Survey::new(
            "Team Lunch",
            "Help us choose where to eat.",
            vec![
                Question::new("Which cuisine?", ["Thai", "Italian", "Mexican"]),
                Question::new("Which day?", ["Monday", "Wednesday", "Friday"]),
            ],
        )
    }

    #[test]
    fn test_save_survey_is_single_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.json");

        save_survey(&sample_survey(), &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains('\n'));
        assert!(!raw.contains("  "));
        assert_eq!(load_survey(&path).unwrap(), sample_survey());
    }

    #[test]
    fn test_save_survey_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.json");
        fs::write(&path, "x".repeat(4096)).unwrap();

        save_survey(&sample_survey(), &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\"title\":\"Team Lunch\""));
        assert!(!dir.path().join("survey.json.tmp").exists());
    }

    #[test]
    fn test_save_survey_text_rejects_malformed_and_leaves_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.json");
        fs::write(&path, "previous").unwrap();

        let err = save_survey_text("{\"title\": \"T\"}", &path).unwrap_err();
        assert!(matches!(err, StoreError::Schema(SchemaError::Shape { .. })));

        let err = save_survey_text("not json", &path).unwrap_err();
        assert!(matches!(err, StoreError::Schema(SchemaError::Syntax { .. })));

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn test_save_survey_text_reformats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.json");
        let pretty = sample_survey().to_pretty_json().unwrap();

        let saved = save_survey_text(&pretty, &path).unwrap();

        assert_eq!(saved, sample_survey());
        assert!(!fs::read_to_string(&path).unwrap().contains('\n'));
    }

    #[test]
    fn test_load_missing_survey() {
        let dir = tempdir().unwrap();
        let err = load_survey(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_save_analysis_is_indented() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis.json");

        let doc = save_analysis("Overview\n...\nAnalysis\n...", &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"analysis\""));
        let loaded: AnalysisDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.analysis, "Overview\n...\nAnalysis\n...");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("analysis.json");
        assert!(matches!(
            save_analysis("text", &path),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_store_uses_configured_paths() {
        let dir = tempdir().unwrap();
        let files = FilesConfig {
            survey_path: dir.path().join("s.json"),
            analysis_path: dir.path().join("a.json"),
            history_path: dir.path().join("h.json"),
        };
        let store = SurveyStore::from_config(&files);

        store.save_survey(&sample_survey()).unwrap();
        store.save_analysis("summary").unwrap();

        assert_eq!(store.load_survey().unwrap(), sample_survey());
        assert!(store.analysis_path().exists());
        assert_eq!(store.survey_path(), files.survey_path.as_path());
    }
}

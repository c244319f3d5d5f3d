//! End-to-end workflow tests
//!
//! Runs the agent against real HTTP clients pointed at wiremock servers and
//! checks the files it leaves behind.

use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use survey_agent::config::{FilesConfig, LangbaseConfig, PipeConfig, RequestConfig, SheetsConfig};
use survey_agent::error::{AppError, ServiceError, SheetsError};
use survey_agent::history::{ChatHistory, Role};
use survey_agent::langbase::{LangbaseClient, LangbaseSurveyService};
use survey_agent::sheets::SheetsClient;
use survey_agent::storage::SurveyStore;
use survey_agent::{SessionState, SurveyAgent};

const GENERATED: &str = r#"{"title":"Weekend Plans","introduction":"Tell us about your weekends.","questions":[{"question":"Where do you spend weekends?","options":[{"option":"Home"},{"option":"Outdoors"},{"option":"Travelling"}]},{"question":"Who with?","options":[{"option":"Alone"},{"option":"Family"},{"option":"Friends"}]},{"question":"How long do you plan ahead?","options":[{"option":"Days"},{"option":"Weeks"},{"option":"Never"}]}]}"#;

const EDITED: &str = r#"{"title":"Weekend Plans","introduction":"Tell us about your weekends.","questions":[{"question":"Where do you spend weekends?","options":[{"option":"Home"},{"option":"Outdoors"},{"option":"Travelling"}]},{"question":"Who with?","options":[{"option":"Alone"},{"option":"Family"},{"option":"Friends"}]}]}"#;

type TestAgent = SurveyAgent<LangbaseSurveyService, SheetsClient>;

fn files(dir: &TempDir) -> FilesConfig {
    FilesConfig {
        survey_path: dir.path().join("survey.json"),
        analysis_path: dir.path().join("analysis.json"),
        history_path: dir.path().join("chat_history.json"),
    }
}

fn build_agent(dir: &TempDir, langbase_url: &str, sheets_url: &str) -> TestAgent {
    let request = RequestConfig { timeout_ms: 5000 };
    let client = LangbaseClient::new(
        &LangbaseConfig {
            api_key: "test-api-key".to_string(),
            base_url: langbase_url.to_string(),
        },
        request.clone(),
    )
    .unwrap();
    let sheets = SheetsClient::new(
        &SheetsConfig {
            base_url: sheets_url.to_string(),
            access_token: Some("sheets-token".to_string()),
            spreadsheet_id: Some("sheet-123".to_string()),
            range: "Sheet1!A:C".to_string(),
        },
        &request,
    )
    .unwrap();

    let files = files(dir);
    SurveyAgent::new(
        LangbaseSurveyService::new(client, PipeConfig::default()),
        sheets,
        SurveyStore::from_config(&files),
        ChatHistory::open(&files.history_path),
    )
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "completion": text}))
}

fn read_json(dir: &TempDir, name: &str) -> Value {
    serde_json::from_str(&std::fs::read_to_string(dir.path().join(name)).unwrap()).unwrap()
}

#[tokio::test]
async fn test_generate_then_edit() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "survey-generate-v1"})))
        .respond_with(completion(GENERATED))
        .expect(1)
        .mount(&langbase)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "survey-edit-v1"})))
        .respond_with(completion(EDITED))
        .expect(1)
        .mount(&langbase)
        .await;

    let mut agent = build_agent(&dir, &langbase.uri(), "http://127.0.0.1:9");

    let survey = agent.generate("weekends").await.unwrap();
    assert_eq!(survey.questions.len(), 3);
    assert_eq!(agent.state(), SessionState::Generated);

    let raw = std::fs::read_to_string(dir.path().join("survey.json")).unwrap();
    assert_eq!(raw, GENERATED);

    let edited = agent.update(&survey, "drop the last question").await;
    assert_eq!(edited.questions.len(), 2);
    assert_eq!(agent.state(), SessionState::Edited);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("survey.json")).unwrap(),
        EDITED
    );

    let history = read_json(&dir, "chat_history.json");
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0], json!({"role": "user", "content": "weekends"}));
    assert_eq!(entries[2]["content"]["title"], "Weekend Plans");
    assert_eq!(entries[3], json!({"role": "user", "content": "drop the last question"}));
    assert_eq!(entries[5]["content"]["questions"].as_array().unwrap().len(), 2);
    assert_eq!(agent.history().entries()[5].role, Role::Assistant);
}

#[tokio::test]
async fn test_generate_failure_writes_no_survey() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(1)
        .mount(&langbase)
        .await;

    let mut agent = build_agent(&dir, &langbase.uri(), "http://127.0.0.1:9");

    assert!(agent.generate("weekends").await.is_err());
    assert!(!dir.path().join("survey.json").exists());
    assert_eq!(agent.state(), SessionState::Empty);
}

#[tokio::test]
async fn test_edit_failure_keeps_survey_file() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "survey-generate-v1"})))
        .respond_with(completion(GENERATED))
        .mount(&langbase)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "survey-edit-v1"})))
        .respond_with(completion("I could not do that."))
        .mount(&langbase)
        .await;

    let mut agent = build_agent(&dir, &langbase.uri(), "http://127.0.0.1:9");

    let survey = agent.generate("weekends").await.unwrap();
    let after = agent.update(&survey, "make it weird").await;

    assert_eq!(after, survey);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("survey.json")).unwrap(),
        GENERATED
    );
}

#[tokio::test]
async fn test_analyze_end_to_end() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;
    let sheets = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Sheet1!A:C"))
        .and(header("Authorization", "Bearer sheets-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:C4",
            "majorDimension": "ROWS",
            "values": [
                ["Timestamp", "Where do you spend weekends?", "Who with?"],
                ["2024-05-01 10:00", "Home", "Family"],
                ["2024-05-01 11:00", "Outdoors", "Family"],
                ["2024-05-02 09:30", "Home"]
            ]
        })))
        .expect(1)
        .mount(&sheets)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({"name": "survey-summarize-v1"})))
        .respond_with(completion("Overview\nThree people answered.\n\nAnalysis\nMost stay home."))
        .expect(1)
        .mount(&langbase)
        .await;

    std::fs::write(dir.path().join("survey.json"), GENERATED).unwrap();
    let mut agent = build_agent(&dir, &langbase.uri(), &sheets.uri());

    let text = agent.analyze().await.unwrap();
    assert!(text.contains("Most stay home."));

    let analysis = read_json(&dir, "analysis.json");
    assert_eq!(analysis["analysis"], text.as_str());
    assert!(analysis["generated_at"].is_string());

    let requests = langbase.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let rendered = body["messages"][1]["content"].as_str().unwrap();
    assert!(rendered.contains("Survey title: Weekend Plans"));
    assert!(rendered.contains("Question: Where do you spend weekends?"));
    assert!(rendered.contains("Most common answer: Home"));
    assert!(rendered.contains("- Home: 2 (66.67%)"));
    assert!(rendered.contains("- Family: 2 (100.00%)"));
}

#[tokio::test]
async fn test_analyze_sheets_error() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;
    let sheets = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Sheet1!A:C"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&sheets)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("unused"))
        .expect(0)
        .mount(&langbase)
        .await;

    std::fs::write(dir.path().join("survey.json"), GENERATED).unwrap();
    let mut agent = build_agent(&dir, &langbase.uri(), &sheets.uri());

    let result = agent.analyze().await;

    assert!(matches!(
        result,
        Err(AppError::Service(ServiceError::Sheets(SheetsError::Api { status: 403, .. })))
    ));
    assert!(!dir.path().join("analysis.json").exists());
}

#[tokio::test]
async fn test_analyze_empty_sheet() {
    let dir = tempdir().unwrap();
    let langbase = MockServer::start().await;
    let sheets = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Sheet1!A:C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:C1000",
            "majorDimension": "ROWS"
        })))
        .mount(&sheets)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .respond_with(completion("Overview\nNo answers yet.\n\nAnalysis\nNothing to report."))
        .expect(1)
        .mount(&langbase)
        .await;

    std::fs::write(dir.path().join("survey.json"), GENERATED).unwrap();
    let mut agent = build_agent(&dir, &langbase.uri(), &sheets.uri());

    assert!(agent.analyze().await.is_ok());

    let requests = langbase.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("No responses were collected."));
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use survey_agent::{
    agent::{ResponseSource, SurveyService, GENERATING_NOTE, UPDATING_NOTE},
    config::{Config, LogFormat},
    history::ChatHistory,
    langbase::{LangbaseClient, LangbaseSurveyService},
    sheets::SheetsClient,
    storage::SurveyStore,
    Survey, SurveyAgent,
};

const BANNER_WIDTH: usize = 100;

/// Draft, edit and analyze surveys with Langbase Pipes
#[derive(Parser, Debug)]
#[command(name = "survey-agent", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Create or update the Langbase pipes before running
    #[arg(long, global = true)]
    setup_pipes: bool,

    /// Survey file (overrides SURVEY_PATH)
    #[arg(long, global = true)]
    survey_path: Option<PathBuf>,

    /// Analysis file (overrides ANALYSIS_PATH)
    #[arg(long, global = true)]
    analysis_path: Option<PathBuf>,

    /// Chat history file (overrides CHAT_HISTORY_PATH)
    #[arg(long, global = true)]
    history_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a survey for a topic, then edit it interactively
    Generate {
        /// Survey topic (prompted for when omitted)
        #[arg(long)]
        topic: Option<String>,
    },
    /// Fetch responses, aggregate them and write an executive summary
    Analyze,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.survey_path.clone() {
        config.files.survey_path = path;
    }
    if let Some(path) = cli.analysis_path.clone() {
        config.files.analysis_path = path;
    }
    if let Some(path) = cli.history_path.clone() {
        config.files.history_path = path;
    }

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Survey agent starting...");

    let langbase = match LangbaseClient::new(&config.langbase, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.langbase.base_url, "Langbase client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Langbase client");
            return Err(e.into());
        }
    };

    if cli.setup_pipes {
        info!("Ensuring survey pipes exist...");
        if let Err(e) = langbase.ensure_survey_pipes(&config.pipes).await {
            error!(error = %e, "Failed to ensure survey pipes exist");
            return Err(e.into());
        }
    }

    let sheets = SheetsClient::new(&config.sheets, &config.request)?;
    let service = LangbaseSurveyService::new(langbase, config.pipes.clone());
    let mut agent = SurveyAgent::new(
        service,
        sheets,
        SurveyStore::from_config(&config.files),
        ChatHistory::open(&config.files.history_path),
    );

    match cli.command {
        Command::Generate { topic } => run_generator(&mut agent, topic).await?,
        Command::Analyze => run_analysis(&mut agent).await,
    }

    info!("Survey agent finished");
    Ok(())
}

/// Generate a survey, then apply edits until the user stops
async fn run_generator<S, R>(
    agent: &mut SurveyAgent<S, R>,
    topic: Option<String>,
) -> anyhow::Result<()>
where
    S: SurveyService,
    R: ResponseSource,
{
    let mut rl = DefaultEditor::new()?;

    println!("\n{}\n", banner(" SURVEY GENERATOR "));

    let mut pending_topic = topic;
    let mut survey = loop {
        let topic = match pending_topic.take() {
            Some(t) => t,
            None => match read_line(&mut rl, "Enter survey topic: ")? {
                Some(t) if !t.is_empty() => t,
                _ => return Ok(()),
            },
        };

        println!("{}", GENERATING_NOTE);
        match agent.generate(&topic).await {
            Ok(survey) => break survey,
            Err(e) => println!("An error occurred during survey generation: {}", e),
        }
    };
    print_survey(&survey);

    loop {
        let instructions = match read_line(&mut rl, "Edit survey (empty line to finish): ")? {
            Some(line) => line,
            None => break,
        };
        if instructions.is_empty() || matches!(instructions.as_str(), "done" | "quit" | "exit") {
            break;
        }

        println!("{}", UPDATING_NOTE);
        survey = agent.update(&survey, &instructions).await;
        print_survey(&survey);
    }

    println!(
        "Survey saved to {} ({} state)",
        agent.store().survey_path().display(),
        agent.state()
    );
    Ok(())
}

/// Fetch, aggregate, summarize, save and print
async fn run_analysis<S, R>(agent: &mut SurveyAgent<S, R>)
where
    S: SurveyService,
    R: ResponseSource,
{
    println!("\n{}\n", banner(" SURVEY ANALYSIS "));
    match agent.analyze().await {
        Ok(text) => {
            println!("{}", text);
            println!(
                "\nAnalysis saved to {}",
                agent.store().analysis_path().display()
            );
        }
        Err(e) => {
            println!("An error occurred during survey analysis: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read one trimmed line; `None` on Ctrl-C or Ctrl-D
fn read_line(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => {
            let trimmed = line.trim().to_string();
            if !trimmed.is_empty() {
                let _ = rl.add_history_entry(&trimmed);
            }
            Ok(Some(trimmed))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn print_survey(survey: &Survey) {
    println!("\n{}\n", banner(" Start of Generated Survey "));
    match survey.to_pretty_json() {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Could not render survey: {}", e),
    }
    println!("\n{}\n", banner(" End of Generated Survey "));
}

fn banner(title: &str) -> String {
    format!("{:=^width$}", title, width = BANNER_WIDTH)
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

//! Command-line entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sql_assistant::adapters::{
    FileResultSink, OpenAIAssistantsApi, OpenAIAssistantsConfig, PrestoClient, PrestoConnection,
    RetryingAssistantApi,
};
use sql_assistant::application::{
    AnswerQueryCommand, AnswerQueryHandler, OrchestrationError, PipelineReport, PipelineSettings,
    RunDriver, RunDriverConfig,
};
use sql_assistant::config::{AppConfig, ConfigError};
use sql_assistant::ports::{AssistantApiError, SqlEngineError};

#[derive(Debug, Parser)]
#[command(name = "sql-assistant", about = "Answer a database question with an LLM-generated SQL query")]
struct Args {
    /// The question to answer, in plain language
    #[arg(long)]
    prompt: Option<String>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("assistant client setup failed: {0}")]
    Assistant(#[from] AssistantApiError),

    #[error("presto client setup failed: {0}")]
    Presto(#[from] SqlEngineError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Flips the cancellation signal on Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, abandoning run");
            if tx.send(true).is_err() {
                tracing::debug!("No run is listening for cancellation");
            }
        }
    });
    rx
}

async fn run(config: AppConfig, prompt: String) -> Result<PipelineReport, AppError> {
    config.validate().map_err(ConfigError::from)?;

    let openai = OpenAIAssistantsApi::new(
        OpenAIAssistantsConfig::new(config.openai.api_key())
            .with_base_url(config.openai.base_url.clone())
            .with_timeout(config.openai.timeout()),
    )?;
    let api = RetryingAssistantApi::new(Arc::new(openai))
        .with_max_retries(config.agent.max_retries)
        .with_base_delay(config.agent.retry_base_delay());

    let presto = &config.presto;
    let mut connection = PrestoConnection::new(
        presto.host.clone(),
        presto.port,
        presto.user.clone(),
        presto.catalog.clone(),
        presto.schema.clone(),
    )
    .with_scheme(presto.http_scheme.clone())
    .with_source(presto.source.clone());
    if let Some(password) = presto.password.clone() {
        connection = connection.with_password(password);
    }
    let engine = PrestoClient::new(connection)?;

    let mut driver_config = RunDriverConfig::default().with_poll_interval(config.agent.poll_interval());
    driver_config.deadline = config.agent.run_deadline();
    let driver = RunDriver::new(driver_config).with_cancellation(cancel_on_ctrl_c());

    let handler = AnswerQueryHandler::new(
        Arc::new(api),
        Arc::new(engine),
        Arc::new(FileResultSink::new()),
        driver,
        PipelineSettings {
            assistant_name: config.agent.assistant_name.clone(),
            model: config.openai.model.clone(),
            results_dir: config.agent.results_dir.clone(),
        },
    );

    Ok(handler.handle(AnswerQueryCommand::new(prompt)).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = AppConfig::load();
    init_tracing(config.as_ref().map(|c| c.agent.log_json).unwrap_or(false));

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let Some(prompt) = args.prompt.filter(|p| !p.trim().is_empty()) else {
        println!("Please provide a prompt");
        return ExitCode::SUCCESS;
    };

    match run(config, prompt).await {
        Ok(report) => {
            println!("✅ Assistant finished.");
            println!("Session:        {}", report.session_id);
            println!("Query results:  {}", report.query_results_file.display());
            println!("Transcript:     {}", report.chat_file.display());
            println!(
                "Cost estimate:  ${:.4} ({} tokens)",
                report.cost.cost, report.cost.tokens
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Assistant run failed");
            ExitCode::FAILURE
        }
    }
}

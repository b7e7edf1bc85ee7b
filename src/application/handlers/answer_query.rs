//! AnswerQuery command handler.
//!
//! Turns a natural-language database question into SQL with the remote
//! assistant, has the assistant execute it through the `run_sql` tool and
//! persists the session's artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::prompt::{
    database_query_prompt, RUN_SQL_FOLLOW_UP, SQL_ANALYST_INSTRUCTIONS,
};
use crate::application::schema_introspection::SchemaIntrospector;
use crate::application::sql_tool::{RunSqlTool, RUN_SQL_TOOL};
use crate::application::{AssistantClient, OrchestrationError, RunDriver};
use crate::domain::cost::CostEstimate;
use crate::domain::foundation::SessionId;
use crate::domain::session::Session;
use crate::ports::{AssistantApi, ResultSink, SqlEngine};

/// Command to answer one database question.
#[derive(Debug, Clone)]
pub struct AnswerQueryCommand {
    pub query: String,
}

impl AnswerQueryCommand {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Static settings of the handler.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Name of the remote assistant to reuse or create.
    pub assistant_name: String,
    /// Model the assistant should use.
    pub model: String,
    /// Directory under which session directories are created.
    pub results_dir: PathBuf,
}

/// Summary of a finished invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub session_id: SessionId,
    pub session_dir: PathBuf,
    pub chat_file: PathBuf,
    pub cost_file: PathBuf,
    pub query_results_file: PathBuf,
    pub table_definitions_file: PathBuf,
    pub schema_description_file: PathBuf,
    /// False when table definitions were already present from an earlier run.
    pub table_definitions_written: bool,
    /// Messages in the final transcript.
    pub message_count: usize,
    pub cost: CostEstimate,
    /// Output of the last `run_sql` call.
    pub last_sql_output: Option<String>,
}

/// Handler for [`AnswerQueryCommand`].
pub struct AnswerQueryHandler {
    api: Arc<dyn AssistantApi>,
    engine: Arc<dyn SqlEngine>,
    sink: Arc<dyn ResultSink>,
    driver: RunDriver,
    settings: PipelineSettings,
}

impl AnswerQueryHandler {
    pub fn new(
        api: Arc<dyn AssistantApi>,
        engine: Arc<dyn SqlEngine>,
        sink: Arc<dyn ResultSink>,
        driver: RunDriver,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            api,
            engine,
            sink,
            driver,
            settings,
        }
    }

    pub async fn handle(&self, cmd: AnswerQueryCommand) -> Result<PipelineReport, OrchestrationError> {
        let query = cmd.query.trim();
        if query.is_empty() {
            return Err(OrchestrationError::precondition("query must not be empty"));
        }

        let name = self.settings.assistant_name.as_str();
        let session = Session::from_seed(&format!("{}{}", name, query), &self.settings.results_dir);
        tracing::info!(session_id = %session.id(), dir = %session.root().display(), "Session started");

        // Introspection
        let introspector = SchemaIntrospector::new(self.engine.clone());
        let table_definitions = introspector.table_definitions_for_prompt().await?;
        let schema_description = introspector.schema_description().await?;
        let prompt = database_query_prompt(query, &table_definitions);

        let run_sql = RunSqlTool::new(
            self.engine.clone(),
            self.sink.clone(),
            session.query_results_file(),
        )
        .into_descriptor();

        // First run: generate SQL
        let mut client = AssistantClient::new(self.api.clone());
        client
            .get_or_create_assistant(name, &self.settings.model)
            .await?;
        client.set_instructions(SQL_ANALYST_INSTRUCTIONS).await?;
        client.equip_tools(vec![run_sql], true).await?;
        let thread = client.create_thread().await?;
        client.post_message(&thread, &prompt).await?;
        let generated = self.driver.drive(&client, &thread, None).await?;

        let table_definitions_written = self
            .sink
            .write_table_definitions(&session.table_definitions_file(), &table_definitions)
            .await?;
        self.sink
            .write_schema_description(&session.schema_description_file(), &schema_description)
            .await?;

        // Second run: execute it
        client.post_message(&thread, RUN_SQL_FOLLOW_UP).await?;
        let subset = [RUN_SQL_TOOL.to_string()];
        let executed = self.driver.drive(&client, &thread, Some(&subset[..])).await?;

        // Results must come from a run_sql call of this invocation.
        let last_sql_output = generated
            .invocations
            .iter()
            .chain(executed.invocations.iter())
            .filter(|i| i.tool_name == RUN_SQL_TOOL)
            .last()
            .map(|i| i.output.clone());
        let results_file = session.query_results_file();
        if last_sql_output.is_none() {
            return Err(OrchestrationError::Validation(format!(
                "the assistant never called {}; {} was not produced by this run",
                RUN_SQL_TOOL,
                results_file.display()
            )));
        }
        if !self.sink.exists(&results_file).await? {
            return Err(OrchestrationError::Validation(format!(
                "{} was not produced",
                results_file.display()
            )));
        }

        let transcript = executed.transcript;
        let chat_file = session.chat_file(name);
        let cost_file = session.cost_file(name);
        let cost = CostEstimate::for_text(&transcript.joined_text(), &self.settings.model);
        self.sink.write_transcript(&chat_file, &transcript).await?;
        self.sink.write_cost_estimate(&cost_file, &cost).await?;

        tracing::info!(
            session_id = %session.id(),
            messages = transcript.len(),
            tokens = cost.tokens,
            cost = cost.cost,
            "Assistant finished"
        );

        Ok(PipelineReport {
            session_id: session.id().clone(),
            session_dir: session.root().to_path_buf(),
            query_results_file: session.query_results_file(),
            table_definitions_file: session.table_definitions_file(),
            schema_description_file: session.schema_description_file(),
            chat_file,
            cost_file,
            table_definitions_written,
            message_count: transcript.len(),
            cost,
            last_sql_output,
        })
    }
}

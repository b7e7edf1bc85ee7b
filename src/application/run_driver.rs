//! Run Driver - advances a remote run from creation to a terminal state.
//!
//! The driver owns the run's [`RunState`] and moves it only through the
//! transitions the state machine allows. Between polls it waits a fixed
//! interval; the wait also watches an optional cancellation signal and an
//! optional deadline.
//!
//! # Configuration
//!
//! | Field | Default | Description |
//! |-------|---------|-------------|
//! | `poll_interval` | 500ms | Delay between status checks |
//! | `deadline` | none | Upper bound on the whole run |
//!
//! # Tool calls
//!
//! When the run requires action every pending call is validated against the
//! active tool set first. If any call names a tool outside it, nothing is
//! executed and the run is abandoned. Otherwise each handler is awaited in
//! order and all outputs are submitted in one batch.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::domain::assistant::{RunHandle, RunState, Transcript};
use crate::domain::foundation::{StateMachine, ThreadId, ToolCallId};
use crate::domain::tools::{ToolCall, ToolInvocation, ToolOutput};

use super::{AssistantClient, OrchestrationError};

/// Configuration for the run driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDriverConfig {
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Maximum time a run may take. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for RunDriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            deadline: None,
        }
    }
}

impl RunDriverConfig {
    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Result of a run that reached `completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run: RunHandle,
    pub state: RunState,
    /// Thread history loaded after completion.
    pub transcript: Transcript,
    /// Tool calls executed during the run, in execution order.
    pub invocations: Vec<ToolInvocation>,
}

/// Drives runs to completion.
#[derive(Debug, Clone, Default)]
pub struct RunDriver {
    config: RunDriverConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl RunDriver {
    /// Creates a driver with the given configuration.
    pub fn new(config: RunDriverConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stops any run in progress once `cancel` turns `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RunDriverConfig {
        &self.config
    }

    /// Starts a run on `thread_id` and drives it to completion.
    ///
    /// With `tool_subset`, only those tools are offered to and accepted from
    /// the run; otherwise the whole registry is.
    pub async fn drive(
        &self,
        client: &AssistantClient,
        thread_id: &ThreadId,
        tool_subset: Option<&[String]>,
    ) -> Result<RunOutcome, OrchestrationError> {
        client.check_run_preconditions(thread_id, tool_subset)?;

        let transcript = client.load_transcript(thread_id).await?;
        tracing::debug!(thread_id = %thread_id, messages = transcript.len(), "Transcript refreshed before run");

        let run = client.start_run(thread_id, tool_subset).await?;
        let state = RunState::Created.transition_to(RunState::InProgress)?;

        let active_tools: Vec<String> = match tool_subset {
            Some(subset) => subset.to_vec(),
            None => client.registry().tool_names(),
        };

        let result = self.poll(client, &run, state, &active_tools).await;
        if let Err(err) = &result {
            if abandons_run(err) {
                cancel_quietly(client, &run).await;
            }
        }
        result
    }

    async fn poll(
        &self,
        client: &AssistantClient,
        run: &RunHandle,
        mut state: RunState,
        active_tools: &[String],
    ) -> Result<RunOutcome, OrchestrationError> {
        let deadline_at = self.config.deadline.map(|d| Instant::now() + d);
        let mut cancel = self.cancel.clone();
        let mut answered: HashSet<ToolCallId> = HashSet::new();
        let mut invocations = Vec::new();

        loop {
            self.wait(run, deadline_at, cancel.as_mut()).await?;

            let snapshot = client.retrieve_run(run).await?;
            let observed = match RunState::from_remote_status(&snapshot.status) {
                Some(observed) => observed,
                None => {
                    tracing::warn!(run_id = %run.run_id, status = %snapshot.status, "Unknown run status, treating as unchanged");
                    continue;
                }
            };

            match observed {
                RunState::Created | RunState::InProgress => {
                    tracing::trace!(run_id = %run.run_id, status = %snapshot.status, "Run still in progress");
                }
                RunState::RequiresAction => {
                    let pending: Vec<&ToolCall> = snapshot
                        .tool_calls
                        .iter()
                        .filter(|call| !answered.contains(call.id()))
                        .collect();
                    if pending.is_empty() {
                        tracing::debug!(run_id = %run.run_id, "Tool calls already answered, waiting");
                        continue;
                    }

                    ensure_within(&pending, active_tools)?;
                    state = state.transition_to(RunState::RequiresAction)?;

                    let outputs = execute_calls(client, &pending, &mut invocations).await?;
                    client.submit_tool_outputs(run, &outputs).await?;
                    tracing::info!(run_id = %run.run_id, outputs = outputs.len(), "Tool outputs submitted");

                    answered.extend(outputs.into_iter().map(|o| o.call_id().clone()));
                    state = state.transition_to(RunState::InProgress)?;
                }
                RunState::Completed => {
                    state = state.transition_to(RunState::Completed)?;
                    let transcript = client.load_transcript(&run.thread_id).await?;
                    tracing::info!(
                        run_id = %run.run_id,
                        messages = transcript.len(),
                        tool_calls = invocations.len(),
                        "Run completed"
                    );
                    return Ok(RunOutcome {
                        run: run.clone(),
                        state,
                        transcript,
                        invocations,
                    });
                }
                RunState::Failed => {
                    state.transition_to(RunState::Failed)?;
                    tracing::error!(
                        run_id = %run.run_id,
                        status = %snapshot.status,
                        last_error = snapshot.last_error.as_deref().unwrap_or(""),
                        "Run failed"
                    );
                    return Err(OrchestrationError::RunFailed {
                        run_id: run.run_id.to_string(),
                        status: snapshot.status,
                        last_error: snapshot.last_error,
                    });
                }
            }
        }
    }

    /// Sleeps one poll interval, honouring the deadline and cancellation.
    async fn wait(
        &self,
        run: &RunHandle,
        deadline_at: Option<Instant>,
        cancel: Option<&mut watch::Receiver<bool>>,
    ) -> Result<(), OrchestrationError> {
        let deadline_exceeded = || OrchestrationError::DeadlineExceeded {
            run_id: run.run_id.to_string(),
            seconds: self.config.deadline.map(|d| d.as_secs()).unwrap_or_default(),
        };
        let cancelled = || OrchestrationError::Cancelled {
            run_id: run.run_id.to_string(),
        };

        let mut wake_at = Instant::now() + self.config.poll_interval;
        if let Some(deadline_at) = deadline_at {
            if Instant::now() >= deadline_at {
                return Err(deadline_exceeded());
            }
            wake_at = wake_at.min(deadline_at);
        }

        match cancel {
            Some(cancel) => {
                if *cancel.borrow() {
                    return Err(cancelled());
                }
                loop {
                    tokio::select! {
                        _ = sleep_until(wake_at) => break,
                        changed = cancel.changed() => {
                            if changed.is_err() {
                                // Sender dropped; nobody can cancel any more.
                                sleep_until(wake_at).await;
                                break;
                            }
                            if *cancel.borrow() {
                                return Err(cancelled());
                            }
                        }
                    }
                }
            }
            None => sleep_until(wake_at).await,
        }

        match deadline_at {
            Some(deadline_at) if Instant::now() >= deadline_at => Err(deadline_exceeded()),
            _ => Ok(()),
        }
    }
}

/// Fails when any pending call names a tool outside `active_tools`.
fn ensure_within(pending: &[&ToolCall], active_tools: &[String]) -> Result<(), OrchestrationError> {
    let mut missing: Vec<String> = pending
        .iter()
        .map(|call| call.tool_name().to_string())
        .filter(|name| !active_tools.contains(name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    missing.dedup();
    Err(OrchestrationError::ToolSubsetMismatch {
        missing,
        equipped: active_tools.to_vec(),
    })
}

/// Runs each call's handler and returns one output per call.
async fn execute_calls(
    client: &AssistantClient,
    pending: &[&ToolCall],
    invocations: &mut Vec<ToolInvocation>,
) -> Result<Vec<ToolOutput>, OrchestrationError> {
    let mut outputs = Vec::with_capacity(pending.len());
    for call in pending {
        let tool = client.registry().resolve(call.tool_name())?;
        let tool_failed = |message: String| OrchestrationError::ToolExecution {
            tool: call.tool_name().to_string(),
            message,
        };

        let arguments = call.parse_arguments().map_err(|e| tool_failed(e.to_string()))?;
        tracing::debug!(call_id = %call.id(), tool = call.tool_name(), "Invoking tool");
        let output = tool
            .handler()
            .invoke(arguments.clone())
            .await
            .map_err(|e| tool_failed(e.to_string()))?;

        invocations.push(ToolInvocation {
            call_id: call.id().clone(),
            tool_name: call.tool_name().to_string(),
            arguments,
            output: output.clone(),
        });
        outputs.push(ToolOutput::new(call.id().clone(), output));
    }
    Ok(outputs)
}

/// Errors after which the remote run is left unattended and should be cancelled.
fn abandons_run(err: &OrchestrationError) -> bool {
    matches!(
        err,
        OrchestrationError::DeadlineExceeded { .. }
            | OrchestrationError::Cancelled { .. }
            | OrchestrationError::ToolExecution { .. }
            | OrchestrationError::ToolSubsetMismatch { .. }
            | OrchestrationError::UnknownTool(_)
    )
}

async fn cancel_quietly(client: &AssistantClient, run: &RunHandle) {
    match client.cancel_run(run).await {
        Ok(()) => tracing::info!(run_id = %run.run_id, "Abandoned run cancelled"),
        Err(err) => tracing::warn!(run_id = %run.run_id, error = %err, "Failed to cancel abandoned run"),
    }
}

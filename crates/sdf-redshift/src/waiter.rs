//! Submit statement batches and poll them to a terminal state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use sdf_config::WaiterConfig;
use sdf_core::{ErrorKind, ProvisionError, Result, Sleeper, redact_statement, redact_statements};

use crate::data_api::{QueryExecutionClient, QueryStatus, StatementDescription, StatementFailure};
use crate::target::QueryTarget;

/// Polling budget for a single statement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub check_interval: Duration,
    pub max_check_count: u32,
    /// When false, an exhausted budget returns [`WaitOutcome::Pending`] instead of failing.
    pub raise_timeout_error: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(1000),
            max_check_count: 900,
            raise_timeout_error: true,
        }
    }
}

impl From<&WaiterConfig> for WaitOptions {
    fn from(cfg: &WaiterConfig) -> Self {
        Self {
            check_interval: cfg.check_interval(),
            max_check_count: cfg.max_check_count,
            raise_timeout_error: cfg.raise_timeout_error,
        }
    }
}

/// How a poll ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Finished { query_id: String },
    /// Budget exhausted with timeout errors disabled; carries the last known status.
    Pending { query_id: String, status: QueryStatus },
}

impl WaitOutcome {
    pub fn query_id(&self) -> &str {
        match self {
            Self::Finished { query_id } | Self::Pending { query_id, .. } => query_id,
        }
    }
}

enum PollState {
    Polling { attempt: u32 },
    Finished,
    Failed(StatementDescription),
    Exhausted { attempt: u32, last: StatementDescription },
}

impl PollState {
    fn observe(attempt: u32, max_check_count: u32, description: StatementDescription) -> Self {
        match description.status {
            QueryStatus::Finished => Self::Finished,
            QueryStatus::Failed | QueryStatus::Aborted => Self::Failed(description),
            _ if attempt >= max_check_count => Self::Exhausted {
                attempt,
                last: description,
            },
            _ => Self::Polling { attempt },
        }
    }
}

pub struct StatementExecutionWaiter {
    client: Arc<dyn QueryExecutionClient>,
    sleeper: Arc<dyn Sleeper>,
    options: WaitOptions,
}

impl StatementExecutionWaiter {
    pub fn new(
        client: Arc<dyn QueryExecutionClient>,
        sleeper: Arc<dyn Sleeper>,
        options: WaitOptions,
    ) -> Self {
        Self {
            client,
            sleeper,
            options,
        }
    }

    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Same client and sleeper with a different budget.
    pub fn with_options(&self, options: WaitOptions) -> Self {
        Self {
            client: self.client.clone(),
            sleeper: self.sleeper.clone(),
            options,
        }
    }

    /// Submit statements as one unit. Returns `None` for an empty list.
    ///
    /// One statement goes through the single-execute path, more than one through
    /// the batch path; either way one query id covers the whole batch.
    pub async fn submit(
        &self,
        statements: &[String],
        target: &QueryTarget,
        log_sql: bool,
    ) -> Result<Option<String>> {
        info!(endpoint = %target, "Execute SQL statement");
        if log_sql {
            info!(statements = ?redact_statements(statements), "Executing statements");
        } else {
            info!(count = statements.len(), statements = "***", "Executing statements");
        }

        let query_id = match statements {
            [] => {
                warn!("No SQL statement to execute.");
                return Ok(None);
            }
            [single] => self.client.submit_single(single, target).await?,
            many => self.client.submit_batch(many, target).await?,
        };

        if log_sql {
            info!(query_id = %query_id, sql = %redact_statement(&statements.join(";")), "Got query id");
        } else {
            info!(query_id = %query_id, sql = "***", "Got query id");
        }
        Ok(Some(query_id))
    }

    /// Poll `query_id` until FINISHED, FAILED or the attempt ceiling.
    pub async fn poll(&self, query_id: &str) -> Result<WaitOutcome> {
        let WaitOptions {
            check_interval,
            max_check_count,
            raise_timeout_error,
        } = self.options;

        let first = self.client.describe(query_id).await?;
        info!(query_id, status = %first.status, "Got statement status after submitting it");
        let mut state = PollState::observe(0, max_check_count, first);

        loop {
            state = match state {
                PollState::Polling { attempt } => {
                    self.sleeper.sleep(check_interval).await;
                    let attempt = attempt + 1;
                    let description = self.client.describe(query_id).await?;
                    debug!(
                        query_id,
                        status = %description.status,
                        elapsed_ms = elapsed(attempt, check_interval).as_millis() as u64,
                        "Polled statement status"
                    );
                    PollState::observe(attempt, max_check_count, description)
                }
                PollState::Finished => {
                    info!(query_id, "Statement finished");
                    return Ok(WaitOutcome::Finished {
                        query_id: query_id.to_string(),
                    });
                }
                PollState::Failed(description) => {
                    let failure = description.failure.unwrap_or_else(|| StatementFailure {
                        kind: ErrorKind::RemoteFailure,
                        message: format!("statement ended with status {}", description.status),
                    });
                    error!(
                        query_id,
                        status = %description.status,
                        error = %failure.message,
                        kind = %failure.kind,
                        "Statement failed"
                    );
                    return Err(ProvisionError::StatementFailed {
                        query_id: query_id.to_string(),
                        message: failure.message,
                        query_string: redact_statement(&description.query_string).into_owned(),
                        kind: failure.kind,
                    });
                }
                PollState::Exhausted { attempt, last } => {
                    let waited = elapsed(attempt, check_interval);
                    error!(
                        query_id,
                        status = %last.status,
                        waited_ms = waited.as_millis() as u64,
                        "Timeout: wait status timeout"
                    );
                    if raise_timeout_error {
                        return Err(ProvisionError::timeout(
                            format!(
                                "statement query '{query_id}', queryString: {}",
                                redact_statement(&last.query_string)
                            ),
                            waited.as_secs(),
                        ));
                    }
                    return Ok(WaitOutcome::Pending {
                        query_id: query_id.to_string(),
                        status: last.status,
                    });
                }
            };
        }
    }

    /// Submit and wait. `None` when there was nothing to run.
    pub async fn execute(
        &self,
        statements: &[String],
        target: &QueryTarget,
        log_sql: bool,
    ) -> Result<Option<WaitOutcome>> {
        if let Some(first) = statements.first() {
            let preview: String = redact_statement(first).chars().take(64).collect();
            debug!(options = ?self.options, first_statement = %preview, "Executing statements with wait");
        }
        match self.submit(statements, target, log_sql).await? {
            Some(query_id) => self.poll(&query_id).await.map(Some),
            None => Ok(None),
        }
    }
}

fn elapsed(attempts: u32, interval: Duration) -> Duration {
    interval.saturating_mul(attempts)
}

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sdf_core::{ErrorKind, Result};

use crate::target::QueryTarget;

/// Remote status of a submitted statement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryStatus {
    Submitted,
    /// Picked up or started by the engine
    Running,
    Finished,
    Failed,
    Aborted,
}

impl QueryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Aborted)
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "SUBMITTED",
            Self::Running => "RUNNING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
        };
        f.write_str(s)
    }
}

/// A failure reported by the query service, already classified by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of describing a statement batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDescription {
    pub id: String,
    pub status: QueryStatus,
    pub failure: Option<StatementFailure>,
    pub query_string: String,
}

/// Query-execution service (Redshift Data API).
///
/// Both submit paths return a single id governing the whole batch.
#[async_trait]
pub trait QueryExecutionClient: Send + Sync {
    async fn submit_single(&self, sql: &str, target: &QueryTarget) -> Result<String>;

    async fn submit_batch(&self, sqls: &[String], target: &QueryTarget) -> Result<String>;

    async fn describe(&self, query_id: &str) -> Result<StatementDescription>;
}

/// Builds query clients whose credentials come from assuming `role_arn`.
#[async_trait]
pub trait QueryClientFactory: Send + Sync {
    async fn for_role(&self, role_arn: &str) -> Result<Arc<dyn QueryExecutionClient>>;
}

//! Check phase: poll every tracked execution once.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, info};

use sdf_core::Result;

use crate::clients::ExecutionClient;
use crate::model::{CheckOutcome, CheckPipelineTask, ExecutionStatus};

pub struct CheckPhase {
    executions: Arc<dyn ExecutionClient>,
}

impl CheckPhase {
    pub fn new(executions: Arc<dyn ExecutionClient>) -> Self {
        Self { executions }
    }

    /// Current status of every execution, in input order.
    pub async fn statuses(&self, task: &CheckPipelineTask) -> Result<Vec<ExecutionStatus>> {
        let lookups = task
            .executions
            .iter()
            .map(|e| self.executions.get_execution(&e.pipeline_id, &e.id));
        let executions = try_join_all(lookups).await?;
        Ok(executions.into_iter().map(|e| e.status).collect())
    }

    /// `done` holds only once every execution is terminal; failed counts as terminal.
    pub async fn process(&self, task: CheckPipelineTask) -> Result<CheckOutcome> {
        let statuses = self.statuses(&task).await?;
        debug!(?statuses, "Execution statuses");
        let done = statuses.iter().all(|s| s.is_terminal());
        info!(executions = statuses.len(), done, "Check phase");
        Ok(CheckOutcome { task, done })
    }
}

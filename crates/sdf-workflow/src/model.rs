//! Task, execution and event payloads exchanged with the state machine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input consumed by an external catalog-backed connector; no file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFabricTask {
    pub priority: i64,
    pub sif_resource_key: String,
    pub resource_asset_name: String,
}

/// One pipeline definition and one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCsvTask {
    pub priority: i64,
    pub sif_resource_key: String,
    pub resource_key: String,
}

/// Every definition under `sif_resources_prefix`, each paired with its input under `resources_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPipelineTask {
    pub priority: i64,
    pub resources_prefix: String,
    pub sif_resources_prefix: String,
}

/// Variants are told apart by their keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineTask {
    DataFabric(DataFabricTask),
    SingleCsv(SingleCsvTask),
    Multi(MultiPipelineTask),
}

impl PipelineTask {
    pub fn priority(&self) -> i64 {
        match self {
            Self::DataFabric(t) => t.priority,
            Self::SingleCsv(t) => t.priority,
            Self::Multi(t) => t.priority,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataFabric(_) => "data_fabric",
            Self::SingleCsv(_) => "single_csv",
            Self::Multi(_) => "multi",
        }
    }
}

/// A created execution, tracked until its status is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetail {
    pub pipeline_id: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPipelineTask {
    pub callback_url: String,
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPipelineTask {
    pub callback_url: String,
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,
    #[serde(default)]
    pub executions: Vec<ExecutionDetail>,
    #[serde(default)]
    pub executions_count: usize,
}

impl CheckPipelineTask {
    /// Input for the next trigger round.
    pub fn next_trigger(&self) -> TriggerPipelineTask {
        TriggerPipelineTask {
            callback_url: self.callback_url.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

/// Check phase output: the input echoed back plus `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    #[serde(flatten)]
    pub task: CheckPipelineTask,
    pub done: bool,
}

/// Remote execution status as reported by the pipeline processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Waiting,
    InProgress,
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Body sent when creating an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExecution {
    pub action_type: String,
    pub mode: String,
    pub expiration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_overrides: Option<Map<String, Value>>,
}

impl NewExecution {
    /// A one-off job execution.
    pub fn job(expiration: u64, connector_overrides: Option<Map<String, Value>>) -> Self {
        Self {
            action_type: "create".into(),
            mode: "job".into(),
            expiration,
            connector_overrides,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    #[serde(default)]
    pub pipeline_id: Option<String>,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub input_upload_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: String,
    pub name: String,
}

/// Stored pipeline definition; only the name is needed for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionDetails {
    pub execution_id: String,
    #[serde(default)]
    pub execution_start_time: Option<String>,
    #[serde(default)]
    pub state_machine_arn: Option<String>,
}

/// Delivered when the loop ends, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationEvent {
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "Cause", default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<TaskExecutionDetails>,
    /// Known directly when the loop runs in-process.
    #[serde(rename = "callbackUrl", default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl TerminationEvent {
    pub fn succeeded(callback_url: impl Into<String>) -> Self {
        Self {
            error: None,
            cause: None,
            execution: None,
            callback_url: Some(callback_url.into()),
        }
    }

    pub fn failed(callback_url: impl Into<String>, error: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            cause: Some(cause.into()),
            execution: None,
            callback_url: Some(callback_url.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackStatus {
    Success,
    Failure,
}

/// Wait-condition signal body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackBody {
    pub status: CallbackStatus,
    pub reason: String,
    pub unique_id: String,
}

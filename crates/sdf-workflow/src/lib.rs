//! Pipeline task orchestration for seeding the SDF demo.
//!
//! A run pops the lowest-priority-value task, creates its pipeline executions,
//! polls them until every one is terminal, and repeats until no task is left.
//! [`WorkflowDriver`] runs that loop in-process; [`TriggerPhase`] and
//! [`CheckPhase`] are the individual steps when an external scheduler drives it.

pub mod aws;
pub mod callback;
pub mod check;
pub mod clients;
pub mod driver;
pub mod http;
pub mod model;
pub mod trigger;

pub use aws::{DataZoneCatalog, S3ObjectStore, SfnExecutionInput};
pub use callback::{CallbackService, DEFAULT_REASON, callback_body};
pub use check::CheckPhase;
pub use clients::{
    AssetCatalog, CallbackNotifier, ExecutionClient, ExecutionInputSource, InputUploader,
    ObjectStore, PipelineClient,
};
pub use driver::{LOOP_FAILED, WorkflowDriver, WorkflowSummary};
pub use http::{HttpTransfer, PipelineApiClient};
pub use model::{
    CallbackBody, CallbackStatus, CheckOutcome, CheckPipelineTask, DataFabricTask, Execution,
    ExecutionDetail, ExecutionStatus, MultiPipelineTask, NewExecution, PipelineDefinition,
    PipelineSummary, PipelineTask, SingleCsvTask, TaskExecutionDetails, TerminationEvent,
    TriggerPipelineTask,
};
pub use trigger::{
    DATA_FABRIC_CONNECTOR, TriggerPhase, TriggerSettings, input_key_for, pop_next_task,
};

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sdf_config::WorkflowConfig;
use sdf_core::{ErrorKind, ProvisionError, RecordingSleeper, Result};
use sdf_workflow::{
    AssetCatalog, CallbackBody, CallbackNotifier, CallbackService, CheckPhase, Execution,
    ExecutionClient, ExecutionStatus, InputUploader, NewExecution, ObjectStore, PipelineClient,
    PipelineSummary, TriggerPhase, TriggerSettings, WorkflowDriver,
};

#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<BTreeMap<String, String>>,
    pub fail_on: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn with(objects: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (k, v) in objects {
            store.put(k, v);
        }
        store
    }

    pub fn put(&self, key: &str, value: &str) {
        self.objects.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    pub fn definition(&self, key: &str, pipeline: &str) {
        self.put(key, &format!(r#"{{"name":"{pipeline}","connectorConfig":{{}}}}"#));
    }

    /// Reads of `key` fail with a provider error.
    pub fn fail_reads_of(&self, key: &str) {
        *self.fail_on.lock().unwrap() = Some(key.to_string());
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_text(&self, key: &str) -> Result<String> {
        if self.fail_on.lock().unwrap().as_deref() == Some(key) {
            return Err(ProvisionError::remote("GetObject", ErrorKind::RemoteFailure, "Access Denied"));
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ProvisionError::not_found(key))
    }
}

/// Pipeline processor double: pipelines by name, executions whose statuses follow a script.
#[derive(Default)]
pub struct FakeProcessor {
    pub pipelines: Mutex<HashMap<String, String>>,
    pub created: Mutex<Vec<(String, NewExecution)>>,
    pub scripts: Mutex<HashMap<String, VecDeque<ExecutionStatus>>>,
    pub default_script: Mutex<Vec<ExecutionStatus>>,
    pub omit_upload_url: Mutex<bool>,
    pub lookups: Mutex<usize>,
}

impl FakeProcessor {
    pub fn with_pipelines(names: &[&str]) -> Self {
        let processor = Self::default();
        for name in names {
            processor
                .pipelines
                .lock()
                .unwrap()
                .insert(name.to_string(), format!("pipe-{name}"));
        }
        *processor.default_script.lock().unwrap() = vec![ExecutionStatus::Success];
        processor
    }

    /// Status sequence reported by every execution created from now on; the last entry repeats.
    pub fn script(&self, statuses: &[ExecutionStatus]) {
        *self.default_script.lock().unwrap() = statuses.to_vec();
    }

    pub fn created(&self) -> Vec<(String, NewExecution)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineClient for FakeProcessor {
    async fn find_by_alias(&self, name: &str) -> Result<Option<PipelineSummary>> {
        Ok(self.pipelines.lock().unwrap().get(name).map(|id| PipelineSummary {
            id: id.clone(),
            name: name.to_string(),
        }))
    }
}

#[async_trait]
impl ExecutionClient for FakeProcessor {
    async fn create_execution(&self, pipeline_id: &str, request: &NewExecution) -> Result<Execution> {
        let mut created = self.created.lock().unwrap();
        created.push((pipeline_id.to_string(), request.clone()));
        let id = format!("exec-{}", created.len());
        self.scripts
            .lock()
            .unwrap()
            .insert(id.clone(), self.default_script.lock().unwrap().iter().copied().collect());
        let upload = !*self.omit_upload_url.lock().unwrap();
        Ok(Execution {
            input_upload_url: upload.then(|| format!("https://upload.local/{id}")),
            id,
            pipeline_id: Some(pipeline_id.to_string()),
            status: ExecutionStatus::Waiting,
        })
    }

    async fn get_execution(&self, pipeline_id: &str, execution_id: &str) -> Result<Execution> {
        *self.lookups.lock().unwrap() += 1;
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts
            .get_mut(execution_id)
            .ok_or_else(|| ProvisionError::not_found(execution_id))?;
        let status = if script.len() > 1 {
            script.pop_front().unwrap_or(ExecutionStatus::Unknown)
        } else {
            script.front().copied().unwrap_or(ExecutionStatus::Unknown)
        };
        Ok(Execution {
            id: execution_id.to_string(),
            pipeline_id: Some(pipeline_id.to_string()),
            status,
            input_upload_url: None,
        })
    }
}

#[derive(Default)]
pub struct RecordingTransfer {
    pub uploads: Mutex<Vec<(String, String)>>,
    pub callbacks: Mutex<Vec<(String, CallbackBody)>>,
}

impl RecordingTransfer {
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn callbacks(&self) -> Vec<(String, CallbackBody)> {
        self.callbacks.lock().unwrap().clone()
    }
}

#[async_trait]
impl InputUploader for RecordingTransfer {
    async fn upload_csv(&self, url: &str, content: String) -> Result<()> {
        self.uploads.lock().unwrap().push((url.to_string(), content));
        Ok(())
    }
}

#[async_trait]
impl CallbackNotifier for RecordingTransfer {
    async fn notify(&self, url: &str, body: &CallbackBody) -> Result<()> {
        self.callbacks.lock().unwrap().push((url.to_string(), body.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub listings: HashMap<String, String>,
    pub searches: Mutex<Vec<(String, String)>>,
}

impl FakeCatalog {
    pub fn with(asset: &str, listing_id: &str) -> Self {
        Self {
            listings: HashMap::from([(asset.to_string(), listing_id.to_string())]),
            searches: Mutex::default(),
        }
    }
}

#[async_trait]
impl AssetCatalog for FakeCatalog {
    async fn find_listing_id(&self, domain_id: &str, asset_name: &str) -> Result<Option<String>> {
        self.searches
            .lock()
            .unwrap()
            .push((domain_id.to_string(), asset_name.to_string()));
        Ok(self.listings.get(asset_name).cloned())
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub processor: Arc<FakeProcessor>,
    pub transfer: Arc<RecordingTransfer>,
    pub catalog: Arc<FakeCatalog>,
    pub sleeper: Arc<RecordingSleeper>,
    pub config: WorkflowConfig,
}

impl Harness {
    pub fn new(store: MemoryStore, processor: FakeProcessor) -> Self {
        let config = WorkflowConfig {
            domain_id: Some("dzd_demo".into()),
            environment_id: Some("env_demo".into()),
            ..WorkflowConfig::default()
        };
        Self {
            store: Arc::new(store),
            processor: Arc::new(processor),
            transfer: Arc::new(RecordingTransfer::default()),
            catalog: Arc::new(FakeCatalog::with("golden_materials", "listing-42")),
            sleeper: Arc::new(RecordingSleeper::new()),
            config,
        }
    }

    pub fn trigger(&self) -> TriggerPhase {
        TriggerPhase::new(
            self.store.clone(),
            self.processor.clone(),
            self.processor.clone(),
            self.transfer.clone(),
            TriggerSettings::from(&self.config),
        )
        .with_catalog(self.catalog.clone())
    }

    pub fn check(&self) -> CheckPhase {
        CheckPhase::new(self.processor.clone())
    }

    pub fn driver(&self) -> WorkflowDriver {
        WorkflowDriver::new(
            self.trigger(),
            self.check(),
            CallbackService::new(self.transfer.clone()),
            self.sleeper.clone(),
            &self.config,
        )
    }
}

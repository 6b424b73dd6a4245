use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Statement polling budget
    #[serde(default)]
    pub waiter: WaiterConfig,
    /// Custom resource failure policy
    #[serde(default)]
    pub custom_resource: CustomResourceConfig,
    /// IAM role association convergence wait
    #[serde(default)]
    pub iam_role: IamRoleConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    /// Credential secret metadata
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Pipeline task orchestration
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.waiter.check_interval_ms == 0 {
            return Err("waiter.check_interval_ms must be > 0".into());
        }
        if self.waiter.max_check_count == 0 {
            return Err("waiter.max_check_count must be > 0".into());
        }
        if self.workflow.check_interval_secs == 0 {
            return Err("workflow.check_interval_secs must be > 0".into());
        }
        if self.workflow.max_check_rounds == Some(0) {
            return Err("workflow.max_check_rounds must be > 0 when set".into());
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("config serialize error: {e}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaiterConfig {
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    #[serde(default = "default_max_check_count")]
    pub max_check_count: u32,
    /// When false, an exhausted poll returns the last known status instead of failing.
    #[serde(default = "default_true")]
    pub raise_timeout_error: bool,
}

impl WaiterConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

fn default_check_interval_ms() -> u64 {
    1000
}
fn default_max_check_count() -> u32 {
    900
}
fn default_true() -> bool {
    true
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            max_check_count: default_max_check_count(),
            raise_timeout_error: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomResourceConfig {
    /// Report SUCCESS even when Create/Update fails. Reserved for non-critical seeding resources.
    #[serde(default)]
    pub suppress_all_errors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamRoleConfig {
    #[serde(default = "default_iam_timeout_seconds")]
    pub timeout_seconds: u64,
}
fn default_iam_timeout_seconds() -> u64 {
    50
}
impl Default for IamRoleConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_iam_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,
    /// Override endpoint, e.g. for localstack
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default = "default_secret_description")]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}
fn default_secret_description() -> String {
    "SDF Redshift credentials for demo data flow.".into()
}
impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            description: default_secret_description(),
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Bucket holding pipeline definitions and input files
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub pipeline_api_url: Option<String>,
    /// For security, prefer SDF__WORKFLOW__PIPELINE_API_TOKEN
    #[serde(default)]
    pub pipeline_api_token: Option<String>,
    #[serde(default = "default_workflow_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Upper bound on check rounds per trigger when driving the loop locally
    #[serde(default)]
    pub max_check_rounds: Option<u32>,
    #[serde(default = "default_execution_expiration_secs")]
    pub execution_expiration_secs: u64,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub environment_id: Option<String>,
    /// Role assumed for catalog searches in the data-fabric account
    #[serde(default)]
    pub catalog_role_arn: Option<String>,
}

impl WorkflowConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

fn default_workflow_check_interval_secs() -> u64 {
    30
}
fn default_execution_expiration_secs() -> u64 {
    600
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            pipeline_api_url: None,
            pipeline_api_token: None,
            check_interval_secs: default_workflow_check_interval_secs(),
            max_check_rounds: None,
            execution_expiration_secs: default_execution_expiration_secs(),
            domain_id: None,
            environment_id: None,
            catalog_role_arn: None,
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                // A file named explicitly must exist; only the default path is optional.
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from("sdf.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., SDF__WAITER__MAX_CHECK_COUNT=10
        builder = builder.add_source(
            Environment::with_prefix("SDF")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}

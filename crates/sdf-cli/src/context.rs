//! Provider clients built once from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_config::sts::AssumeRoleProvider;

use sdf_config::AppConfig;
use sdf_core::{Sleeper, TokioSleeper};
use sdf_custom_resource::{CustomResourceLifecycle, StatementContext, redshift_lifecycle};
use sdf_redshift::aws::{AssumeRoleQueryClientFactory, SecretsManagerClient, ServerlessNamespaceClient};
use sdf_redshift::{CredentialSecretStore, RoleSetReconciler, WaitOptions};
use sdf_workflow::{
    CallbackService, CheckPhase, DataZoneCatalog, HttpTransfer, PipelineApiClient, S3ObjectStore,
    SfnExecutionInput, TriggerPhase, TriggerSettings, WorkflowDriver,
};

/// Session name used when assuming the catalog search role.
pub const CATALOG_SESSION_NAME: &str = "sdf-spoke-search-listings";

const CATALOG_SESSION_LENGTH: Duration = Duration::from_secs(900);

pub struct AppContext {
    pub config: AppConfig,
    sdk_config: SdkConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl AppContext {
    pub async fn new(config: AppConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.aws.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.aws.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        Self {
            sdk_config: loader.load().await,
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn lifecycle(&self) -> CustomResourceLifecycle {
        let statements = StatementContext::new(
            Arc::new(AssumeRoleQueryClientFactory::new(self.sdk_config.clone())),
            self.sleeper.clone(),
            WaitOptions::from(&self.config.waiter),
        );
        let reconciler = RoleSetReconciler::new(
            Arc::new(ServerlessNamespaceClient::new(&self.sdk_config)),
            self.sleeper.clone(),
        );
        let secrets = CredentialSecretStore::new(
            Arc::new(SecretsManagerClient::new(&self.sdk_config)),
            &self.config.secrets,
        );
        redshift_lifecycle(
            statements,
            Arc::new(reconciler),
            Arc::new(secrets),
            self.config.iam_role.timeout_seconds,
            self.config.custom_resource.suppress_all_errors,
        )
    }

    fn pipeline_api(&self) -> Result<Arc<PipelineApiClient>> {
        let url = self
            .config
            .workflow
            .pipeline_api_url
            .as_deref()
            .context("workflow.pipeline_api_url is not configured")?;
        Ok(Arc::new(PipelineApiClient::new(
            url,
            self.config.workflow.pipeline_api_token.clone(),
        )))
    }

    async fn catalog(&self) -> DataZoneCatalog {
        let config = match &self.config.workflow.catalog_role_arn {
            Some(role_arn) => {
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(CATALOG_SESSION_NAME)
                    .session_length(CATALOG_SESSION_LENGTH)
                    .configure(&self.sdk_config)
                    .build()
                    .await;
                aws_sdk_datazone::config::Builder::from(&self.sdk_config)
                    .credentials_provider(provider)
                    .build()
            }
            None => aws_sdk_datazone::config::Builder::from(&self.sdk_config).build(),
        };
        DataZoneCatalog::new(aws_sdk_datazone::Client::from_conf(config))
    }

    pub async fn trigger_phase(&self) -> Result<TriggerPhase> {
        let bucket = self
            .config
            .workflow
            .bucket
            .as_deref()
            .context("workflow.bucket is not configured")?;
        let api = self.pipeline_api()?;
        Ok(TriggerPhase::new(
            Arc::new(S3ObjectStore::new(&self.sdk_config, bucket)),
            api.clone(),
            api,
            Arc::new(HttpTransfer::new()),
            TriggerSettings::from(&self.config.workflow),
        )
        .with_catalog(Arc::new(self.catalog().await)))
    }

    pub fn check_phase(&self) -> Result<CheckPhase> {
        Ok(CheckPhase::new(self.pipeline_api()?))
    }

    pub fn callback_service(&self) -> CallbackService {
        CallbackService::new(Arc::new(HttpTransfer::new()))
            .with_input_source(Arc::new(SfnExecutionInput::new(&self.sdk_config)))
    }

    pub async fn driver(&self) -> Result<WorkflowDriver> {
        Ok(WorkflowDriver::new(
            self.trigger_phase().await?,
            self.check_phase()?,
            self.callback_service(),
            self.sleeper.clone(),
            &self.config.workflow,
        ))
    }
}

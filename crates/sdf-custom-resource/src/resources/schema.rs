use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use sdf_core::Result;
use sdf_redshift::{CredentialSecretStore, QueryTarget, StatementExecutionWaiter};

use super::{RedshiftTargetProps, StatementContext};
use crate::event::{RequestType, ResourceEvent};
use crate::resource::{CustomResource, PhysicalIdPolicy};

pub const DEFAULT_USERNAME: &str = "sdfdemouser";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSchemaProps {
    #[serde(flatten)]
    pub target: RedshiftTargetProps,
    pub database_name: String,
    /// Secret holding the warehouse user's credential.
    #[serde(rename = "redshiftBIUserParameter")]
    pub credential_secret_name: String,
    #[serde(default = "default_username")]
    pub redshift_username: String,
    /// Statements run in the new database on every Create and Update.
    #[serde(default)]
    pub schema_sqls: Vec<String>,
}

fn default_username() -> String {
    DEFAULT_USERNAME.into()
}

/// Creates a database, a password user backed by a credential secret, and schemas.
///
/// Delete removes the secret only; the database and its data stay.
pub struct DatabaseSchemaResource {
    context: StatementContext,
    secrets: Arc<CredentialSecretStore>,
}

impl DatabaseSchemaResource {
    pub const RESOURCE_TYPE: &'static str = "Custom::RedshiftDatabaseSchema";
    pub const PHYSICAL_ID_PREFIX: &'static str = "create-redshift-db-schemas-custom-resource-";

    pub fn new(context: StatementContext, secrets: Arc<CredentialSecretStore>) -> Self {
        Self { context, secrets }
    }

    async fn create_or_update(&self, event: &ResourceEvent) -> Result<()> {
        let props: DatabaseSchemaProps = event.properties()?;
        let (target, waiter) = self.context.prepare(&props.target).await?;

        if event.request_type == RequestType::Create {
            let (credential, _) = self
                .secrets
                .upsert(&props.credential_secret_name, &props.redshift_username)
                .await?;

            tolerate_existing(
                &waiter,
                &format!("CREATE DATABASE {}", props.database_name),
                &target,
                true,
                "database",
            )
            .await?;
            let create_user = format!(
                "CREATE USER {} PASSWORD '{}'",
                credential.username, credential.password
            );
            match waiter.execute(&[create_user], &target, false).await {
                Ok(_) => {}
                Err(e) if e.is_already_exists() => {
                    // The secret now holds a fresh password; the existing user must take it too.
                    info!(username = %credential.username, "User exists in Redshift, resetting its password");
                    let alter_user = format!(
                        "ALTER USER {} PASSWORD '{}'",
                        credential.username, credential.password
                    );
                    waiter.execute(&[alter_user], &target, false).await?;
                }
                Err(e) => return Err(e),
            }
        }

        let schema_target = target.with_database(props.database_name.as_str());
        waiter
            .execute(&props.schema_sqls, &schema_target, true)
            .await?;
        Ok(())
    }
}

/// Run one statement; an AlreadyExists failure is logged and skipped.
async fn tolerate_existing(
    waiter: &StatementExecutionWaiter,
    sql: &str,
    target: &QueryTarget,
    log_sql: bool,
    what: &str,
) -> Result<()> {
    match waiter.execute(&[sql.to_string()], target, log_sql).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_already_exists() => {
            warn!(endpoint = %target, what, "Already exists in Redshift, skipping");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl CustomResource for DatabaseSchemaResource {
    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE
    }

    fn physical_id_policy(&self) -> PhysicalIdPolicy {
        PhysicalIdPolicy::Generated {
            prefix: Self::PHYSICAL_ID_PREFIX,
        }
    }

    fn response_data(&self, event: &ResourceEvent) -> Result<Map<String, Value>> {
        let props: DatabaseSchemaProps = event.properties()?;
        let mut data = Map::new();
        data.insert("DatabaseName".into(), Value::String(props.database_name));
        data.insert("RedshiftUsername".into(), Value::String(props.redshift_username));
        Ok(data)
    }

    async fn on_create(&self, event: &ResourceEvent) -> Result<()> {
        self.create_or_update(event).await
    }

    async fn on_update(&self, event: &ResourceEvent) -> Result<()> {
        self.create_or_update(event).await
    }

    async fn on_delete(&self, event: &ResourceEvent) -> Result<()> {
        let props: DatabaseSchemaProps = event.properties()?;
        info!(database = %props.database_name, "Keeping database and schemas");
        self.secrets.delete(&props.credential_secret_name).await
    }
}

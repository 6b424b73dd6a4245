use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use sdf_core::Result;

use super::{RedshiftTargetProps, StatementContext};
use crate::event::ResourceEvent;
use crate::resource::{CustomResource, PhysicalIdPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlProps {
    #[serde(flatten)]
    pub target: RedshiftTargetProps,
    pub sqls: Vec<String>,
    /// Run against this database instead of the target's.
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default = "default_log_sql")]
    pub log_sql: bool,
}

fn default_log_sql() -> bool {
    true
}

/// Runs caller-supplied statements on Create and Update. Delete keeps the data.
pub struct SqlResource {
    context: StatementContext,
}

impl SqlResource {
    pub const RESOURCE_TYPE: &'static str = "Custom::RedshiftSql";

    pub fn new(context: StatementContext) -> Self {
        Self { context }
    }

    async fn run(&self, event: &ResourceEvent) -> Result<()> {
        let props: SqlProps = event.properties()?;
        let (target, waiter) = self.context.prepare(&props.target).await?;
        let target = match &props.database_name {
            Some(db) => target.with_database(db.as_str()),
            None => target,
        };
        waiter.execute(&props.sqls, &target, props.log_sql).await?;
        Ok(())
    }
}

#[async_trait]
impl CustomResource for SqlResource {
    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE
    }

    fn physical_id_policy(&self) -> PhysicalIdPolicy {
        PhysicalIdPolicy::Generated {
            prefix: "redshift-sql-custom-resource-",
        }
    }

    async fn on_create(&self, event: &ResourceEvent) -> Result<()> {
        self.run(event).await
    }

    async fn on_update(&self, event: &ResourceEvent) -> Result<()> {
        self.run(event).await
    }

    async fn on_delete(&self, _event: &ResourceEvent) -> Result<()> {
        info!("Keeping data created by SQL statements");
        Ok(())
    }
}

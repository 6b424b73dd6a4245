use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sdf_core::Result;

use super::{RedshiftTargetProps, StatementContext};
use crate::event::ResourceEvent;
use crate::resource::{CustomResource, PhysicalIdPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyS3DataProps {
    #[serde(flatten)]
    pub target: RedshiftTargetProps,
    pub data_bucket: String,
    #[serde(rename = "redshiftRoleForCopyFromS3")]
    pub copy_role_arn: String,
    #[serde(default = "default_table")]
    pub table_name: String,
    #[serde(default = "default_object_key")]
    pub object_key: String,
}

fn default_table() -> String {
    "sustainability.golden_materials".into()
}

fn default_object_key() -> String {
    "materials.csv".into()
}

impl CopyS3DataProps {
    pub fn copy_statement(&self) -> String {
        format!(
            "COPY {} FROM 's3://{}/{}' CREDENTIALS 'aws_iam_role={}' csv",
            self.table_name, self.data_bucket, self.object_key, self.copy_role_arn
        )
    }
}

/// Loads a CSV object into a table on Create and Update.
pub struct CopyS3DataResource {
    context: StatementContext,
}

impl CopyS3DataResource {
    pub const RESOURCE_TYPE: &'static str = "Custom::RedshiftCopyS3Data";

    pub fn new(context: StatementContext) -> Self {
        Self { context }
    }

    async fn copy(&self, event: &ResourceEvent) -> Result<()> {
        let props: CopyS3DataProps = event.properties()?;
        let (target, waiter) = self.context.prepare(&props.target).await?;
        waiter.execute(&[props.copy_statement()], &target, true).await?;
        Ok(())
    }
}

#[async_trait]
impl CustomResource for CopyS3DataResource {
    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE
    }

    fn physical_id_policy(&self) -> PhysicalIdPolicy {
        PhysicalIdPolicy::Fixed("copy-s3-data-custom-resource")
    }

    async fn on_create(&self, event: &ResourceEvent) -> Result<()> {
        self.copy(event).await
    }

    async fn on_update(&self, event: &ResourceEvent) -> Result<()> {
        self.copy(event).await
    }

    async fn on_delete(&self, _event: &ResourceEvent) -> Result<()> {
        Ok(())
    }
}

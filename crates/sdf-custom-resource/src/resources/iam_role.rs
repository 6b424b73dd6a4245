use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use sdf_core::Result;
use sdf_redshift::{RoleChange, RoleSetReconciler};

use super::RedshiftTargetProps;
use crate::event::{ResourceEvent, de_opt_u64_lenient};
use crate::resource::{CustomResource, PhysicalIdPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateIamRoleProps {
    #[serde(flatten)]
    pub target: RedshiftTargetProps,
    pub role_arn: String,
    #[serde(
        default,
        rename = "timeoutInSeconds",
        deserialize_with = "de_opt_u64_lenient"
    )]
    pub timeout_seconds: Option<u64>,
}

/// Associates one IAM role with a serverless namespace.
///
/// Update swaps the old role for the new one; Delete disassociates it.
pub struct AssociateIamRoleResource {
    reconciler: Arc<RoleSetReconciler>,
    default_timeout_seconds: u64,
}

impl AssociateIamRoleResource {
    pub const RESOURCE_TYPE: &'static str = "Custom::RedshiftAssociateIamRole";

    pub fn new(reconciler: Arc<RoleSetReconciler>, default_timeout_seconds: u64) -> Self {
        Self {
            reconciler,
            default_timeout_seconds,
        }
    }

    async fn reconcile(&self, props: &AssociateIamRoleProps, change: RoleChange) -> Result<()> {
        let target = props.target.target()?;
        let timeout = props.timeout_seconds.unwrap_or(self.default_timeout_seconds);
        let outcome = self.reconciler.reconcile(&target, &change, timeout).await?;
        info!(
            namespace = %outcome.namespace,
            default_role = %outcome.plan.default_role,
            converged = outcome.converged,
            "Namespace IAM roles updated"
        );
        Ok(())
    }
}

#[async_trait]
impl CustomResource for AssociateIamRoleResource {
    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE
    }

    fn physical_id_policy(&self) -> PhysicalIdPolicy {
        PhysicalIdPolicy::Fixed("redshift-associate-iam-role")
    }

    async fn on_create(&self, event: &ResourceEvent) -> Result<()> {
        let props: AssociateIamRoleProps = event.properties()?;
        let change = RoleChange {
            to_add: Some(props.role_arn.clone()),
            to_remove: None,
        };
        self.reconcile(&props, change).await
    }

    async fn on_update(&self, event: &ResourceEvent) -> Result<()> {
        let props: AssociateIamRoleProps = event.properties()?;
        let old: Option<AssociateIamRoleProps> = event.old_properties()?;
        let change = RoleChange {
            to_add: Some(props.role_arn.clone()),
            to_remove: old.map(|o| o.role_arn),
        };
        self.reconcile(&props, change).await
    }

    async fn on_delete(&self, event: &ResourceEvent) -> Result<()> {
        let props: AssociateIamRoleProps = event.properties()?;
        let change = RoleChange {
            to_add: None,
            to_remove: Some(props.role_arn.clone()),
        };
        self.reconcile(&props, change).await
    }
}

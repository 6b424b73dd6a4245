//! Apply role-set plans to a serverless namespace and wait for convergence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use sdf_core::{ProvisionError, Result, Sleeper};

use crate::iam_roles::{
    ApplyStatus, IamRoleAssociation, ReconciliationPlan, RoleChange, active_role_arns, compute_plan,
};
use crate::target::QueryTarget;

/// Sleep between convergence checks.
pub const CONVERGENCE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Minimum number of convergence checks regardless of the timeout.
pub const MIN_CONVERGENCE_ROUNDS: u32 = 10;

/// Namespace roles as reported by the provider, already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceState {
    pub name: String,
    pub iam_roles: Vec<IamRoleAssociation>,
    pub default_iam_role_arn: Option<String>,
}

impl NamespaceState {
    pub fn is_in_sync(&self) -> bool {
        self.iam_roles
            .iter()
            .all(|r| r.apply_status == ApplyStatus::InSync)
    }
}

/// Serverless namespace control plane.
#[async_trait]
pub trait NamespaceClient: Send + Sync {
    /// Name of the namespace backing `workgroup_name`.
    async fn namespace_for_workgroup(&self, workgroup_name: &str) -> Result<String>;

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceState>;

    async fn update_namespace(
        &self,
        namespace_name: &str,
        iam_roles: &[String],
        default_iam_role_arn: &str,
    ) -> Result<()>;
}

/// Number of convergence checks for a timeout budget.
pub fn convergence_rounds(timeout_seconds: u64) -> u32 {
    let rounds = (timeout_seconds as f64 / CONVERGENCE_POLL_INTERVAL.as_secs_f64()).round() as u32;
    rounds.max(MIN_CONVERGENCE_ROUNDS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub namespace: String,
    pub plan: ReconciliationPlan,
    /// False when the wait budget elapsed before every role reported in-sync.
    pub converged: bool,
}

pub struct RoleSetReconciler {
    client: Arc<dyn NamespaceClient>,
    sleeper: Arc<dyn Sleeper>,
}

impl RoleSetReconciler {
    pub fn new(client: Arc<dyn NamespaceClient>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { client, sleeper }
    }

    /// Read the namespace behind `target`, apply one add/remove, and wait if a role was added.
    ///
    /// Only serverless targets carry namespaces; anything else fails before any remote call.
    pub async fn reconcile(
        &self,
        target: &QueryTarget,
        change: &RoleChange,
        timeout_seconds: u64,
    ) -> Result<ReconciliationOutcome> {
        let QueryTarget::Serverless { workgroup_name, .. } = target else {
            return Err(ProvisionError::configuration(
                "IAM role association requires a serverless Redshift target",
            ));
        };

        let namespace = self.client.namespace_for_workgroup(workgroup_name).await?;
        let state = self.client.get_namespace(&namespace).await?;
        info!(
            namespace = %namespace,
            roles = ?state.iam_roles,
            default_role = ?state.default_iam_role_arn,
            "Got IAM roles of namespace"
        );

        let plan = compute_plan(
            &active_role_arns(&state.iam_roles),
            change,
            state.default_iam_role_arn.as_deref(),
        );
        let converged = self
            .apply(&namespace, &plan, change.to_add.is_some(), timeout_seconds)
            .await?;

        Ok(ReconciliationOutcome {
            namespace,
            plan,
            converged,
        })
    }

    /// Issue the update; when `role_added`, wait for the associations to settle.
    pub async fn apply(
        &self,
        namespace: &str,
        plan: &ReconciliationPlan,
        role_added: bool,
        timeout_seconds: u64,
    ) -> Result<bool> {
        info!(
            namespace,
            roles = ?plan.roles,
            default_role = %plan.default_role,
            "Updating namespace IAM roles"
        );
        self.client
            .update_namespace(namespace, &plan.roles, &plan.default_role)
            .await?;

        if role_added {
            self.wait_for_convergence(namespace, timeout_seconds).await
        } else {
            Ok(true)
        }
    }

    /// Poll until every association is in-sync or the round budget is spent.
    ///
    /// Running out of rounds is not an error: the update was accepted and the
    /// provider finishes it on its own.
    pub async fn wait_for_convergence(&self, namespace: &str, timeout_seconds: u64) -> Result<bool> {
        let rounds = convergence_rounds(timeout_seconds);
        for round in 0..rounds {
            let state = self.client.get_namespace(namespace).await?;
            if state.is_in_sync() {
                info!(namespace, round, "IAM roles in sync");
                return Ok(true);
            }
            self.sleeper.sleep(CONVERGENCE_POLL_INTERVAL).await;
        }
        warn!(namespace, rounds, "IAM roles still applying after wait budget");
        Ok(false)
    }
}

//! Custom-resource lifecycle for warehouse provisioning.
//!
//! [`CustomResourceLifecycle`] routes framework events to [`CustomResource`]
//! handlers by `ResourceType` and applies the replay and suppression policy.

pub mod event;
pub mod lifecycle;
pub mod resource;
pub mod resources;

use std::sync::Arc;

pub use event::{CustomResourceResponse, RequestType, ResourceEvent, ResponseStatus};
pub use lifecycle::CustomResourceLifecycle;
pub use resource::{CustomResource, PhysicalIdPolicy};
pub use resources::{
    AssociateIamRoleResource, CopyS3DataResource, DatabaseSchemaResource, RedshiftTargetProps,
    SqlResource, StatementContext,
};

use sdf_redshift::{CredentialSecretStore, RoleSetReconciler};

/// Lifecycle with every warehouse resource registered.
pub fn redshift_lifecycle(
    statements: StatementContext,
    reconciler: Arc<RoleSetReconciler>,
    secrets: Arc<CredentialSecretStore>,
    iam_role_timeout_seconds: u64,
    suppress_all_errors: bool,
) -> CustomResourceLifecycle {
    CustomResourceLifecycle::new(suppress_all_errors)
        .register(Arc::new(SqlResource::new(statements.clone())))
        .register(Arc::new(CopyS3DataResource::new(statements.clone())))
        .register(Arc::new(DatabaseSchemaResource::new(statements, secrets)))
        .register(Arc::new(AssociateIamRoleResource::new(
            reconciler,
            iam_role_timeout_seconds,
        )))
}

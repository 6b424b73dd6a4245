//! Create/Update/Delete dispatch with replay-safe error policy.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Map;
use tracing::{error, info, warn};

use sdf_core::{ProvisionError, Result, generate_physical_id};

use crate::event::{CustomResourceResponse, RequestType, ResourceEvent};
use crate::resource::{CustomResource, PhysicalIdPolicy};

/// Physical id reported when a handler fails before it could name the resource.
const UNRESOLVED_PHYSICAL_ID: &str = "unresolved";

pub struct CustomResourceLifecycle {
    resources: HashMap<&'static str, Arc<dyn CustomResource>>,
    suppress_all_errors: bool,
}

impl CustomResourceLifecycle {
    pub fn new(suppress_all_errors: bool) -> Self {
        Self {
            resources: HashMap::new(),
            suppress_all_errors,
        }
    }

    pub fn register(mut self, resource: Arc<dyn CustomResource>) -> Self {
        self.resources.insert(resource.resource_type(), resource);
        self
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.resources.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Run one lifecycle event.
    ///
    /// Create/Update treat AlreadyExists as success; Delete treats NotFound as success.
    /// With `suppress_all_errors`, any other Create/Update failure is logged and
    /// reported as success. Everything else is returned to the caller.
    pub async fn handle(&self, event: &ResourceEvent) -> Result<CustomResourceResponse> {
        info!(
            request_type = %event.request_type,
            resource_type = %event.resource_type,
            logical_id = event.logical_resource_id.as_deref().unwrap_or_default(),
            "Handling custom resource event"
        );
        let resource = self.resources.get(event.resource_type.as_str()).ok_or_else(|| {
            ProvisionError::configuration(format!(
                "no handler registered for resource type {}",
                event.resource_type
            ))
        })?;

        let physical_id = resolve_physical_id(resource.physical_id_policy(), event);

        let outcome = match event.request_type {
            RequestType::Create => resource.on_create(event).await,
            RequestType::Update => resource.on_update(event).await,
            RequestType::Delete => resource.on_delete(event).await,
        };
        if let Err(e) = outcome {
            self.tolerate(event, &physical_id, e)?;
        }

        let data = match resource.response_data(event) {
            Ok(data) => data,
            Err(e) => {
                self.tolerate(event, &physical_id, e)?;
                Map::new()
            }
        };

        Ok(CustomResourceResponse::success(physical_id, data))
    }

    /// Apply the error policy to one failure: `Ok` when it is tolerated.
    fn tolerate(&self, event: &ResourceEvent, physical_id: &str, e: ProvisionError) -> Result<()> {
        match e {
            e if event.request_type == RequestType::Delete => {
                if e.is_not_found() {
                    warn!(physical_id, error = %e, "Delete target already absent");
                    Ok(())
                } else {
                    error!(physical_id, error = %e, "Delete failed");
                    Err(e)
                }
            }
            e if e.is_already_exists() => {
                info!(physical_id, error = %e, "Target already exists, treating as success");
                Ok(())
            }
            e if self.suppress_all_errors => {
                error!(
                    physical_id,
                    error = %e,
                    category = %e.category(),
                    "Error suppressed by suppress_all_errors"
                );
                Ok(())
            }
            e => {
                error!(physical_id, error = %e, category = %e.category(), "Custom resource failed");
                Err(e)
            }
        }
    }

    /// Like [`handle`](Self::handle) but never fails: errors become a FAILED response.
    pub async fn respond(&self, event: &ResourceEvent) -> CustomResourceResponse {
        match self.handle(event).await {
            Ok(response) => response,
            Err(e) => {
                let physical_id = event
                    .physical_resource_id
                    .clone()
                    .or_else(|| {
                        self.resources
                            .get(event.resource_type.as_str())
                            .map(|r| resolve_physical_id(r.physical_id_policy(), event))
                    })
                    .unwrap_or_else(|| UNRESOLVED_PHYSICAL_ID.to_string());
                CustomResourceResponse::failed(physical_id, e.to_string())
            }
        }
    }
}

/// Reuse the incoming id on Update/Delete; name a fresh one on Create.
fn resolve_physical_id(policy: PhysicalIdPolicy, event: &ResourceEvent) -> String {
    if event.request_type != RequestType::Create
        && let Some(id) = &event.physical_resource_id
    {
        return id.clone();
    }
    match policy {
        PhysicalIdPolicy::Fixed(id) => id.to_string(),
        PhysicalIdPolicy::Generated { prefix } => {
            generate_physical_id(prefix, event.request_id.as_deref())
        }
    }
}

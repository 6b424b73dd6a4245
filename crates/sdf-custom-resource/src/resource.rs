use async_trait::async_trait;
use serde_json::{Map, Value};

use sdf_core::Result;

use crate::event::ResourceEvent;

/// How a resource names itself on Create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalIdPolicy {
    /// `prefix` plus a random suffix, derived from the request id when present.
    Generated { prefix: &'static str },
    /// The same id for every instance.
    Fixed(&'static str),
}

/// A custom resource type handled by the lifecycle dispatcher.
///
/// Handlers may fail with AlreadyExists on Create/Update and NotFound on Delete;
/// the dispatcher treats both as success.
#[async_trait]
pub trait CustomResource: Send + Sync {
    /// `ResourceType` value routed to this handler.
    fn resource_type(&self) -> &'static str;

    fn physical_id_policy(&self) -> PhysicalIdPolicy;

    /// Attributes returned in the response `Data`, independent of the outcome.
    fn response_data(&self, _event: &ResourceEvent) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    async fn on_create(&self, event: &ResourceEvent) -> Result<()>;

    async fn on_update(&self, event: &ResourceEvent) -> Result<()>;

    async fn on_delete(&self, event: &ResourceEvent) -> Result<()>;
}

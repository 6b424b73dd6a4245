//! Framework event and response shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use sdf_core::{ProvisionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// One lifecycle invocation as delivered by the orchestration framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEvent {
    pub request_type: RequestType,
    /// Stable across retries of the same event.
    #[serde(default)]
    pub request_id: Option<String>,
    pub resource_type: String,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub service_token: Option<String>,
}

impl ResourceEvent {
    /// Decode `ResourceProperties` into a resource's typed properties.
    pub fn properties<T: DeserializeOwned>(&self) -> Result<T> {
        decode(&self.resource_properties)
    }

    /// Decode `OldResourceProperties`; `None` outside Update events.
    pub fn old_properties<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.old_resource_properties.as_ref().map(decode::<T>).transpose()
    }
}

fn decode<T: DeserializeOwned>(props: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(props.clone()))
        .map_err(|e| ProvisionError::invalid_properties(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub physical_resource_id: String,
    pub data: Map<String, Value>,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CustomResourceResponse {
    pub fn success(physical_resource_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data,
            status: ResponseStatus::Success,
            reason: None,
        }
    }

    pub fn failed(physical_resource_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data: Map::new(),
            status: ResponseStatus::Failed,
            reason: Some(reason.into()),
        }
    }
}

/// Accepts `50` as well as `"50"`: the framework stringifies scalar properties.
pub fn de_opt_u64_lenient<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(u64),
        Text(String),
    }

    match Option::<Lenient>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Number(n)) => Ok(Some(n)),
        Some(Lenient::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Lenient::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

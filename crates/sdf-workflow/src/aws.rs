//! AWS SDK implementations of the storage, catalog and execution-input seams.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_datazone::types::SearchResultItem;
use tracing::debug;

use sdf_core::{ErrorKind, ProvisionError, Result, sdk_error};

use crate::clients::{AssetCatalog, ExecutionInputSource, ObjectStore};

/// Pipeline definitions and input files in one bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListObjectsV2", e))?;
            keys.extend(output.contents().iter().filter_map(|o| o.key().map(str::to_owned)));
            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }
        debug!(bucket = %self.bucket, prefix, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    async fn get_text(&self, key: &str) -> Result<String> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("GetObject", e))?;
        let bytes = output.body.collect().await.map_err(|e| {
            ProvisionError::remote("GetObject", ErrorKind::RemoteFailure, e.to_string())
        })?;
        String::from_utf8(bytes.into_bytes().to_vec()).map_err(|e| {
            ProvisionError::remote("GetObject", ErrorKind::Internal, format!("{key} is not UTF-8: {e}"))
        })
    }
}

/// Asset listings in a DataZone domain.
#[derive(Debug, Clone)]
pub struct DataZoneCatalog {
    client: aws_sdk_datazone::Client,
}

impl DataZoneCatalog {
    pub fn new(client: aws_sdk_datazone::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetCatalog for DataZoneCatalog {
    async fn find_listing_id(&self, domain_id: &str, asset_name: &str) -> Result<Option<String>> {
        let output = self
            .client
            .search_listings()
            .domain_identifier(domain_id)
            .search_text(asset_name)
            .send()
            .await
            .map_err(|e| sdk_error("SearchListings", e))?;
        Ok(output.items().iter().find_map(|item| match item {
            SearchResultItem::AssetListing(listing) => listing.listing_id().map(str::to_owned),
            _ => None,
        }))
    }
}

/// Reads the input a state-machine execution was started with.
#[derive(Debug, Clone)]
pub struct SfnExecutionInput {
    client: aws_sdk_sfn::Client,
}

impl SfnExecutionInput {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sfn::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ExecutionInputSource for SfnExecutionInput {
    async fn execution_input(&self, execution_arn: &str) -> Result<String> {
        let output = self
            .client
            .describe_execution()
            .execution_arn(execution_arn)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeExecution", e))?;
        output
            .input
            .ok_or_else(|| ProvisionError::not_found(format!("input of execution {execution_arn}")))
    }
}

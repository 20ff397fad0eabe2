//! Amazon S3 object store.
//!
//! Reads Athena result objects with aws-sdk-s3.

use super::ObjectStore;
use crate::error::{AthenaError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tracing::debug;

/// S3-backed object store.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Creates a store from a loaded SDK configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Creates a store from an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AthenaError::result_not_found(format!(
                    "s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                AthenaError::result_not_found(format!(
                    "Failed to read body of s3://{bucket}/{key}: {e}"
                ))
            })?
            .into_bytes()
            .to_vec();

        debug!(bucket, key, bytes = data.len(), "Fetched result object");
        Ok(data)
    }
}

//! Remote service abstraction layer.
//!
//! The connector talks to two services: a query service that runs SQL and an
//! object store that holds the results. Both sit behind traits so the AWS
//! clients can be swapped for in-memory mocks.

mod athena;
mod mock;
mod s3;

pub use athena::AthenaQueryService;
pub use mock::{MockObjectStore, MockQueryService, Submission};
pub use s3::S3ObjectStore;

use crate::config::ConnectorConfig;
use crate::error::{AthenaError, Result};
use async_trait::async_trait;
use aws_config::profile::profile_file::ProfileFiles;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use std::fmt;
use tracing::debug;

/// Opaque identifier Athena assigns to a submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Wraps an identifier returned by the query service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a query execution as reported by the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A state this crate does not know about yet. Treated as still running.
    Unknown(String),
}

impl QueryState {
    /// Parses a state name as Athena reports it (`QUEUED`, `RUNNING`, ...).
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns the state name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(s) => s,
        }
    }

    /// Returns true if no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: QueryState,

    /// Why the execution changed state, when the service says.
    pub reason: Option<String>,
}

impl QueryStatus {
    /// Creates a status with no reason attached.
    pub fn new(state: QueryState) -> Self {
        Self {
            state,
            reason: None,
        }
    }

    /// Attaches a state change reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A service that runs SQL and writes results to an output location.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submits a query. Execution continues remotely after this returns.
    async fn start_query(&self, sql: &str, output_location: &str) -> Result<ExecutionId>;

    /// Returns the current status of a submitted query.
    async fn query_status(&self, execution_id: &ExecutionId) -> Result<QueryStatus>;
}

/// A store that serves result objects by bucket and key.
///
/// Implementations return [`AthenaError::ResultNotFound`] when the object is
/// missing or cannot be read.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the full contents of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Loads the shared AWS configuration for a profile and checks that it
/// resolves to credentials.
///
/// Credentials come from the named profile only. Environment keys and
/// instance metadata are not consulted, so an unknown profile fails here.
pub async fn load_sdk_config(config: &ConnectorConfig) -> Result<SdkConfig> {
    load_sdk_config_with(config, None).await
}

/// Like [`load_sdk_config`], reading profiles from `profile_files` instead of
/// the default `~/.aws/config` and `~/.aws/credentials`.
pub async fn load_sdk_config_with(
    config: &ConnectorConfig,
    profile_files: Option<ProfileFiles>,
) -> Result<SdkConfig> {
    let mut credentials =
        ProfileFileCredentialsProvider::builder().profile_name(config.profile.as_str());
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).profile_name(config.profile.as_str());
    if let Some(files) = profile_files {
        credentials = credentials.profile_files(files.clone());
        loader = loader.profile_files(files);
    }
    loader = loader.credentials_provider(credentials.build());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        AthenaError::connection(format!(
            "No credentials provider configured for profile '{}'",
            config.profile
        ))
    })?;

    provider.provide_credentials().await.map_err(|e| {
        AthenaError::connection(format!(
            "Could not resolve credentials for profile '{}'. Check that the profile exists \
             in your AWS config and has access to Athena and S3: {e}",
            config.profile
        ))
    })?;

    debug!(
        profile = %config.profile,
        region = ?sdk_config.region(),
        "Resolved AWS credentials"
    );

    Ok(sdk_config)
}

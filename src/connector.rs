//! The Athena connector.
//!
//! A query runs in three steps: submit the SQL, poll until the execution
//! reaches a terminal state, then read `<prefix>/<execution-id>.csv` from the
//! output location and parse it into a [`ResultTable`].

use crate::config::ConnectorConfig;
use crate::error::{AthenaError, Result};
use crate::location::OutputLocation;
use crate::services::{
    self, AthenaQueryService, ExecutionId, ObjectStore, QueryService, QueryState, QueryStatus,
    S3ObjectStore,
};
use crate::table::ResultTable;
use aws_config::profile::profile_file::ProfileFiles;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How the connector waits for an execution to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between status checks.
    pub interval: Duration,

    /// Give up after this long. `None` waits forever.
    pub max_wait: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }
}

/// Runs SQL on Athena and loads the results from S3.
///
/// The connector is immutable once built and can be shared between tasks;
/// concurrent queries are independent of each other.
#[derive(Clone)]
pub struct Connector {
    profile: String,
    queries: Arc<dyn QueryService>,
    objects: Arc<dyn ObjectStore>,
    poll: PollOptions,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("profile", &self.profile)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// Connects with the named AWS profile and default settings.
    pub async fn new(profile: &str) -> Result<Self> {
        Self::connect(&ConnectorConfig::for_profile(profile)).await
    }

    /// Connects using a full connector configuration.
    ///
    /// Fails with [`AthenaError::Config`] when the profile is empty and with
    /// [`AthenaError::Connection`] when credentials cannot be resolved.
    pub async fn connect(config: &ConnectorConfig) -> Result<Self> {
        Self::connect_with_profile_files(config, None).await
    }

    /// Connects reading AWS profiles from the given files instead of the
    /// default locations under `~/.aws`.
    pub async fn connect_with_profile_files(
        config: &ConnectorConfig,
        profile_files: Option<ProfileFiles>,
    ) -> Result<Self> {
        config.validate()?;

        let sdk_config = services::load_sdk_config_with(config, profile_files).await?;
        let queries = AthenaQueryService::new(&sdk_config, config.work_group.clone());
        let objects = S3ObjectStore::new(&sdk_config);

        info!("Connected with profile '{}'", config.profile);

        Ok(Self::with_services(&config.profile, Arc::new(queries), Arc::new(objects))?
            .with_poll_options(config.poll_options()))
    }

    /// Builds a connector around existing services.
    pub fn with_services(
        profile: &str,
        queries: Arc<dyn QueryService>,
        objects: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        if profile.trim().is_empty() {
            return Err(AthenaError::config("AWS profile name must not be empty"));
        }

        Ok(Self {
            profile: profile.to_string(),
            queries,
            objects,
            poll: PollOptions::default(),
        })
    }

    /// Replaces the polling behaviour.
    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the profile this connector was built with.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Returns the polling behaviour.
    pub fn poll_options(&self) -> PollOptions {
        self.poll
    }

    /// Runs a query and returns its result table.
    ///
    /// Every call submits a new execution; nothing is cached.
    pub async fn query(&self, sql: &str, output_location: &str) -> Result<ResultTable> {
        self.query_with_cancel(sql, output_location, &CancellationToken::new())
            .await
    }

    /// Runs a query, giving up early if `cancel` fires while waiting.
    ///
    /// Cancelling stops the local wait only. The remote execution keeps running.
    pub async fn query_with_cancel(
        &self,
        sql: &str,
        output_location: &str,
        cancel: &CancellationToken,
    ) -> Result<ResultTable> {
        let start = Instant::now();

        let execution_id = self.start_query(sql, output_location).await?;
        self.await_completion(&execution_id, cancel).await?;
        let table = self.fetch_result(&execution_id, output_location).await?;

        let execution_time = start.elapsed();
        info!(
            %execution_id,
            rows = table.row_count,
            elapsed_ms = execution_time.as_millis() as u64,
            "Query finished"
        );

        Ok(table.with_execution_time(execution_time))
    }

    /// Submits the query and returns its execution id.
    pub async fn start_query(&self, sql: &str, output_location: &str) -> Result<ExecutionId> {
        let execution_id = self.queries.start_query(sql, output_location).await?;
        info!(%execution_id, "Submitted query");
        Ok(execution_id)
    }

    /// Polls until the execution succeeds.
    ///
    /// Returns the final status on success. FAILED and CANCELLED executions
    /// become [`AthenaError::QueryExecution`].
    pub async fn await_completion(
        &self,
        execution_id: &ExecutionId,
        cancel: &CancellationToken,
    ) -> Result<QueryStatus> {
        let start = Instant::now();
        let mut checks: u32 = 0;

        loop {
            let status = self.queries.query_status(execution_id).await?;
            checks += 1;

            match &status.state {
                QueryState::Succeeded => {
                    debug!(%execution_id, checks, "Query succeeded");
                    return Ok(status);
                }
                QueryState::Failed | QueryState::Cancelled => {
                    return Err(execution_failure(execution_id, &status));
                }
                QueryState::Unknown(state) => {
                    warn!(%execution_id, state = %state, "Unrecognised query state, still waiting");
                }
                QueryState::Queued | QueryState::Running => {
                    debug!(%execution_id, state = %status.state, checks, "Query not finished");
                }
            }

            let mut delay = self.poll.interval;
            if let Some(max_wait) = self.poll.max_wait {
                let elapsed = start.elapsed();
                if elapsed >= max_wait {
                    return Err(AthenaError::timeout(format!(
                        "Query {execution_id} still {} after {:?}. It keeps running remotely",
                        status.state, max_wait
                    )));
                }
                // Never sleep past the deadline.
                delay = delay.min(max_wait - elapsed);
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(AthenaError::cancelled(format!(
                        "Stopped waiting for query {execution_id}. It keeps running remotely"
                    )));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Reads the CSV result of a finished execution and parses it.
    pub async fn fetch_result(
        &self,
        execution_id: &ExecutionId,
        output_location: &str,
    ) -> Result<ResultTable> {
        let location = OutputLocation::parse(output_location)?;
        let key = location.result_key(execution_id.as_str());

        debug!(bucket = location.bucket(), key = %key, "Fetching result");
        let data = self.objects.get_object(location.bucket(), &key).await?;

        ResultTable::from_csv(&data)
    }
}

fn execution_failure(execution_id: &ExecutionId, status: &QueryStatus) -> AthenaError {
    let mut message = format!("Query {execution_id} finished as {}", status.state);
    if let Some(reason) = &status.reason {
        message.push_str(": ");
        message.push_str(reason);
    }
    message.push_str(". Please check your query syntax");
    AthenaError::query_execution(message)
}

//! Amazon Athena query service.
//!
//! Provides the `AthenaQueryService` struct that implements the
//! `QueryService` trait using aws-sdk-athena.

use super::{ExecutionId, QueryService, QueryState, QueryStatus};
use crate::error::{AthenaError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionState, ResultConfiguration};
use aws_sdk_athena::Client;
use tracing::debug;

/// Athena query service.
#[derive(Debug, Clone)]
pub struct AthenaQueryService {
    client: Client,
    work_group: Option<String>,
}

impl AthenaQueryService {
    /// Creates a service from a loaded SDK configuration.
    pub fn new(sdk_config: &SdkConfig, work_group: Option<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            work_group,
        }
    }

    /// Creates a service from an existing client.
    pub fn from_client(client: Client, work_group: Option<String>) -> Self {
        Self { client, work_group }
    }
}

#[async_trait]
impl QueryService for AthenaQueryService {
    async fn start_query(&self, sql: &str, output_location: &str) -> Result<ExecutionId> {
        let output = self
            .client
            .start_query_execution()
            .query_string(sql)
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .build(),
            )
            .set_work_group(self.work_group.clone())
            .send()
            .await
            .map_err(|e| {
                AthenaError::service(format!(
                    "Failed to start query: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let id = output
            .query_execution_id()
            .ok_or_else(|| AthenaError::service("Athena returned no query execution id"))?;

        debug!(execution_id = id, "Started query execution");
        Ok(ExecutionId::new(id))
    }

    async fn query_status(&self, execution_id: &ExecutionId) -> Result<QueryStatus> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id.as_str())
            .send()
            .await
            .map_err(|e| {
                AthenaError::service(format!(
                    "Failed to get status of query {execution_id}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let status = output
            .query_execution()
            .and_then(|execution| execution.status())
            .ok_or_else(|| {
                AthenaError::service(format!("Athena returned no status for query {execution_id}"))
            })?;

        let state = status.state().map(map_state).unwrap_or(QueryState::Queued);

        Ok(QueryStatus {
            state,
            reason: status.state_change_reason().map(str::to_string),
        })
    }
}

fn map_state(state: &QueryExecutionState) -> QueryState {
    match state {
        QueryExecutionState::Queued => QueryState::Queued,
        QueryExecutionState::Running => QueryState::Running,
        QueryExecutionState::Succeeded => QueryState::Succeeded,
        QueryExecutionState::Failed => QueryState::Failed,
        QueryExecutionState::Cancelled => QueryState::Cancelled,
        other => QueryState::parse(other.as_str()),
    }
}

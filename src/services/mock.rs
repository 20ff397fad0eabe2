//! Mock services for testing.
//!
//! Provides scripted in-memory implementations of the query service and
//! object store so the connector can be exercised without AWS.

use super::{ExecutionId, ObjectStore, QueryService, QueryState, QueryStatus};
use crate::error::{AthenaError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One query submission recorded by [`MockQueryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub execution_id: ExecutionId,
    pub sql: String,
    pub output_location: String,
}

#[derive(Debug, Default)]
struct QueryLog {
    submissions: Vec<Submission>,
    status_calls: HashMap<ExecutionId, usize>,
}

/// A query service that replays a fixed sequence of statuses.
///
/// Every submission gets the id `exec-<n>` and walks the same script: the
/// first status check returns the first entry, the second check the second
/// entry, and so on. Once the script runs out the last entry repeats.
#[derive(Debug)]
pub struct MockQueryService {
    script: Vec<QueryStatus>,
    submit_error: Option<String>,
    log: Mutex<QueryLog>,
}

impl MockQueryService {
    /// Creates a service whose queries pass through `states` in order.
    pub fn new(states: Vec<QueryState>) -> Self {
        Self::with_statuses(states.into_iter().map(QueryStatus::new).collect())
    }

    /// Creates a service whose queries succeed on the first status check.
    pub fn succeeding() -> Self {
        Self::new(vec![QueryState::Succeeded])
    }

    /// Creates a service that replays full statuses, reasons included.
    pub fn with_statuses(script: Vec<QueryStatus>) -> Self {
        Self {
            script,
            submit_error: None,
            log: Mutex::new(QueryLog::default()),
        }
    }

    /// Creates a service that rejects every submission.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            submit_error: Some(message.into()),
            log: Mutex::new(QueryLog::default()),
        }
    }

    /// Returns every submission received so far.
    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Returns how many status checks were made for an execution.
    pub fn status_calls(&self, execution_id: &ExecutionId) -> usize {
        self.lock()
            .status_calls
            .get(execution_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total number of status checks across all executions.
    pub fn total_status_calls(&self) -> usize {
        self.lock().status_calls.values().sum()
    }

    fn lock(&self) -> MutexGuard<'_, QueryLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockQueryService {
    fn default() -> Self {
        Self::succeeding()
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    async fn start_query(&self, sql: &str, output_location: &str) -> Result<ExecutionId> {
        if let Some(message) = &self.submit_error {
            return Err(AthenaError::service(message.clone()));
        }
        if sql.is_empty() {
            return Err(AthenaError::service(
                "InvalidRequestException: QueryString must not be empty",
            ));
        }

        let mut log = self.lock();
        let execution_id = ExecutionId::new(format!("exec-{}", log.submissions.len() + 1));
        log.submissions.push(Submission {
            execution_id: execution_id.clone(),
            sql: sql.to_string(),
            output_location: output_location.to_string(),
        });
        Ok(execution_id)
    }

    async fn query_status(&self, execution_id: &ExecutionId) -> Result<QueryStatus> {
        let mut log = self.lock();
        if !log.submissions.iter().any(|s| &s.execution_id == execution_id) {
            return Err(AthenaError::service(format!(
                "InvalidRequestException: QueryExecution {execution_id} was not found"
            )));
        }

        let calls = log.status_calls.entry(execution_id.clone()).or_insert(0);
        let status = match self.script.len() {
            0 => QueryStatus::new(QueryState::Succeeded),
            len => self.script[(*calls).min(len - 1)].clone(),
        };
        *calls += 1;
        Ok(status)
    }
}

/// An in-memory object store keyed by bucket and key.
#[derive(Debug, Default)]
pub struct MockObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object, builder style.
    pub fn with_object(self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.put_object(bucket, key, data);
        self
    }

    /// Adds or replaces an object.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Returns every `(bucket, key)` requested so far, hits and misses alike.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((bucket.to_string(), key.to_string()));

        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                AthenaError::result_not_found(format!(
                    "s3://{bucket}/{key}: NoSuchKey: The specified key does not exist."
                ))
            })
    }
}

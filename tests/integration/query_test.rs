//! Query workflow integration tests.
//!
//! Exercises submit, poll and fetch against scripted mock services.

use athena_frame::services::{
    ExecutionId, MockObjectStore, MockQueryService, QueryState, QueryStatus,
};
use athena_frame::{AthenaError, Connector, OutputLocation, PollOptions, ResultTable, Value};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

const LOCATION: &str = "s3://query-results/athena/adhoc";
const BUCKET: &str = "query-results";

const INTERVAL: Duration = Duration::from_millis(20);

fn build(queries: &Arc<MockQueryService>, objects: &Arc<MockObjectStore>) -> Connector {
    Connector::with_services("integration", queries.clone(), objects.clone())
        .unwrap()
        .with_poll_options(PollOptions {
            interval: INTERVAL,
            max_wait: None,
        })
}

#[test]
fn test_empty_profile_is_configuration_error() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(MockObjectStore::new());

    let err = Connector::with_services("", queries.clone(), objects.clone()).unwrap_err();

    assert!(matches!(err, AthenaError::Config(_)));
    assert!(queries.submissions().is_empty());
}

#[tokio::test]
async fn test_new_with_empty_profile_is_configuration_error() {
    let err = Connector::new("").await.unwrap_err();
    assert!(matches!(err, AthenaError::Config(_)));
}

#[test]
fn test_output_location_decomposition() {
    let loc = OutputLocation::parse("s3://bucket/prefix").unwrap();
    assert_eq!((loc.bucket(), loc.prefix()), ("bucket", "prefix"));

    let loc = OutputLocation::parse("s3://bucket/a/b/c").unwrap();
    assert_eq!((loc.bucket(), loc.prefix()), ("bucket", "a/b/c"));
}

#[tokio::test]
async fn test_polls_until_succeeded_then_fetches() {
    let queries = Arc::new(MockQueryService::new(vec![
        QueryState::Queued,
        QueryState::Running,
        QueryState::Running,
        QueryState::Succeeded,
    ]));
    let objects = Arc::new(
        MockObjectStore::new().with_object(BUCKET, "athena/adhoc/exec-1.csv", "a,b\n1,2\n3,4"),
    );
    let connector = build(&queries, &objects);

    let start = Instant::now();
    let table = connector.query("SELECT a, b FROM t", LOCATION).await.unwrap();
    let elapsed = start.elapsed();

    // Three non-terminal checks, one terminal check, three sleeps.
    assert_eq!(queries.status_calls(&ExecutionId::new("exec-1")), 4);
    assert!(elapsed >= INTERVAL * 3, "elapsed {elapsed:?}");
    assert_eq!(
        objects.requests(),
        vec![(BUCKET.to_string(), "athena/adhoc/exec-1.csv".to_string())]
    );
    assert_eq!(table.row_count, 2);
    assert!(table.execution_time >= INTERVAL * 3);
}

#[tokio::test]
async fn test_immediate_success_does_not_sleep() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects =
        Arc::new(MockObjectStore::new().with_object(BUCKET, "athena/adhoc/exec-1.csv", "x\n1\n"));
    let connector = Connector::with_services("integration", queries.clone(), objects)
        .unwrap()
        .with_poll_options(PollOptions {
            interval: Duration::from_secs(30),
            max_wait: None,
        });

    let table = tokio::time::timeout(
        Duration::from_secs(5),
        connector.query("SELECT 1 AS x", LOCATION),
    )
    .await
    .expect("a query that succeeds on the first check must not sleep")
    .unwrap();

    assert_eq!(queries.total_status_calls(), 1);
    assert_eq!(table.rows, vec![vec![Value::Int(1)]]);
}

#[tokio::test]
async fn test_failed_query_never_fetches() {
    let queries = Arc::new(MockQueryService::with_statuses(vec![
        QueryStatus::new(QueryState::Running),
        QueryStatus::new(QueryState::Failed).with_reason("SYNTAX_ERROR: mismatched input 'FORM'"),
    ]));
    let objects = Arc::new(MockObjectStore::new());
    let connector = build(&queries, &objects);

    let err = connector
        .query("SELECT * FORM t", LOCATION)
        .await
        .unwrap_err();

    assert!(matches!(err, AthenaError::QueryExecution(_)));
    assert!(err.to_string().contains("SYNTAX_ERROR"));
    assert!(objects.requests().is_empty());
}

#[tokio::test]
async fn test_cancelled_query_never_fetches() {
    let queries = Arc::new(MockQueryService::new(vec![QueryState::Cancelled]));
    let objects = Arc::new(MockObjectStore::new());
    let connector = build(&queries, &objects);

    let err = connector.query("SELECT 1", LOCATION).await.unwrap_err();

    assert!(matches!(err, AthenaError::QueryExecution(_)));
    assert!(err.to_string().contains("CANCELLED"));
    assert!(objects.requests().is_empty());
}

#[tokio::test]
async fn test_missing_result_object() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(MockObjectStore::new());
    let connector = build(&queries, &objects);

    let err = connector.query("SELECT 1", LOCATION).await.unwrap_err();

    assert!(matches!(err, AthenaError::ResultNotFound(_)));
    assert!(err.to_string().contains("athena/adhoc/exec-1.csv"));
}

#[tokio::test]
async fn test_malformed_result_is_parse_error() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(
        MockObjectStore::new().with_object(BUCKET, "athena/adhoc/exec-1.csv", "a,b\n1,2,3\n"),
    );
    let connector = build(&queries, &objects);

    let err = connector.query("SELECT 1", LOCATION).await.unwrap_err();
    assert!(matches!(err, AthenaError::Parse(_)));
}

#[tokio::test]
async fn test_rejected_submission_is_service_error() {
    let queries = Arc::new(MockQueryService::rejecting(
        "AccessDeniedException: not authorized to perform athena:StartQueryExecution",
    ));
    let objects = Arc::new(MockObjectStore::new());
    let connector = build(&queries, &objects);

    let err = connector.query("SELECT 1", LOCATION).await.unwrap_err();

    assert!(matches!(err, AthenaError::Service(_)));
    assert_eq!(queries.total_status_calls(), 0);
}

#[tokio::test]
async fn test_result_table_shape() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(
        MockObjectStore::new().with_object(BUCKET, "athena/adhoc/exec-1.csv", "a,b\n1,2\n3,4"),
    );
    let connector = build(&queries, &objects);

    let table = connector.query("SELECT a, b FROM t", LOCATION).await.unwrap();

    let expected = ResultTable::from_csv(b"a,b\n1,2\n3,4").unwrap();
    assert_eq!(table.columns, expected.columns);
    assert_eq!(table.column_names(), vec!["a", "b"]);
    assert_eq!(
        table.rows,
        vec![
            vec![Value::Int(1), Value::Int(2)],
            vec![Value::Int(3), Value::Int(4)],
        ]
    );
}

#[tokio::test]
async fn test_repeated_query_submits_twice() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(
        MockObjectStore::new()
            .with_object(BUCKET, "athena/adhoc/exec-1.csv", "n\n7\n")
            .with_object(BUCKET, "athena/adhoc/exec-2.csv", "n\n7\n"),
    );
    let connector = build(&queries, &objects);

    let first = connector.query("SELECT 7 AS n", LOCATION).await.unwrap();
    let second = connector.query("SELECT 7 AS n", LOCATION).await.unwrap();

    let submissions = queries.submissions();
    assert_eq!(submissions.len(), 2);
    assert_ne!(submissions[0].execution_id, submissions[1].execution_id);
    assert_eq!(submissions[0].output_location, LOCATION);
    assert_eq!(objects.requests().len(), 2);
    assert_eq!(first.rows, second.rows);
}

#[tokio::test]
async fn test_concurrent_queries_are_independent() {
    let queries = Arc::new(MockQueryService::new(vec![
        QueryState::Running,
        QueryState::Succeeded,
    ]));
    let objects = Arc::new(
        MockObjectStore::new()
            .with_object(BUCKET, "athena/adhoc/exec-1.csv", "n\n1\n")
            .with_object(BUCKET, "athena/adhoc/exec-2.csv", "n\n1\n"),
    );
    let connector = build(&queries, &objects);

    let (a, b) = tokio::join!(
        connector.query("SELECT 1 AS n", LOCATION),
        connector.query("SELECT 1 AS n", LOCATION)
    );

    assert_eq!(a.unwrap().row_count, 1);
    assert_eq!(b.unwrap().row_count, 1);
    assert_eq!(queries.status_calls(&ExecutionId::new("exec-1")), 2);
    assert_eq!(queries.status_calls(&ExecutionId::new("exec-2")), 2);
}

#[tokio::test]
async fn test_trailing_slash_location() {
    let queries = Arc::new(MockQueryService::succeeding());
    let objects = Arc::new(
        MockObjectStore::new().with_object(BUCKET, "athena/adhoc/exec-1.csv", "n\n1\n"),
    );
    let connector = build(&queries, &objects);

    let table = connector
        .query("SELECT 1 AS n", "s3://query-results/athena/adhoc/")
        .await
        .unwrap();
    assert_eq!(table.row_count, 1);
}

//! Live Athena tests.
//!
//! These need a real AWS profile with Athena and S3 access. Set
//! ATHENA_TEST_PROFILE and ATHENA_TEST_OUTPUT_LOCATION to run them.

use athena_frame::{AthenaError, Connector, Value};

/// Helper to get the test profile and output location from the environment.
fn get_test_settings() -> Option<(String, String)> {
    let profile = std::env::var("ATHENA_TEST_PROFILE").ok()?;
    let location = std::env::var("ATHENA_TEST_OUTPUT_LOCATION").ok()?;
    Some((profile, location))
}

/// Helper to create a test connector.
async fn get_test_connector() -> Option<(Connector, String)> {
    let (profile, location) = get_test_settings()?;
    let connector = Connector::new(&profile).await.ok()?;
    Some((connector, location))
}

#[tokio::test]
async fn test_live_select_literal() {
    let Some((connector, location)) = get_test_connector().await else {
        eprintln!("Skipping test: ATHENA_TEST_PROFILE not set");
        return;
    };

    let table = connector
        .query("SELECT 1 AS num, 'hello' AS greeting", &location)
        .await
        .unwrap();

    assert_eq!(table.column_names(), vec!["num", "greeting"]);
    assert_eq!(table.rows, vec![vec![Value::Int(1), Value::from("hello")]]);
}

#[tokio::test]
async fn test_live_syntax_error() {
    let Some((connector, location)) = get_test_connector().await else {
        eprintln!("Skipping test: ATHENA_TEST_PROFILE not set");
        return;
    };

    let err = connector
        .query("SELEC 1", &location)
        .await
        .unwrap_err();

    // Athena may reject the text at submission or fail the execution.
    assert!(
        matches!(err, AthenaError::QueryExecution(_) | AthenaError::Service(_)),
        "unexpected error: {err}"
    );
}

//! Connection tests that run without AWS access.
//!
//! Profiles are read from temporary files, so these never touch `~/.aws`.

use athena_frame::{AthenaError, Connector, ConnectorConfig};
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to write a profile file with the given contents.
fn profile_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn profile_files(config: &NamedTempFile, credentials: &NamedTempFile) -> ProfileFiles {
    ProfileFiles::builder()
        .with_file(ProfileFileKind::Config, config.path())
        .with_file(ProfileFileKind::Credentials, credentials.path())
        .build()
}

fn set_env_credentials() {
    std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDFROMENVIRONMENT");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret-from-environment");
    std::env::set_var("AWS_REGION", "us-east-1");
}

#[tokio::test]
async fn test_unknown_profile_ignores_environment_keys() {
    set_env_credentials();
    let config_file = profile_file("");
    let credentials_file = profile_file("");

    let config = ConnectorConfig {
        region: Some("us-east-1".to_string()),
        ..ConnectorConfig::for_profile("missing")
    };
    let result = Connector::connect_with_profile_files(
        &config,
        Some(profile_files(&config_file, &credentials_file)),
    )
    .await;

    match result {
        Err(AthenaError::Connection(msg)) => assert!(msg.contains("missing")),
        other => panic!("Expected connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_new_with_unknown_profile_is_connection_error() {
    // Redirecting the profile files would break the live tests running alongside.
    if std::env::var("ATHENA_TEST_PROFILE").is_ok() {
        eprintln!("Skipping test: ATHENA_TEST_PROFILE is set");
        return;
    }
    set_env_credentials();
    let config_file = profile_file("");
    let credentials_file = profile_file("");
    std::env::set_var("AWS_CONFIG_FILE", config_file.path());
    std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", credentials_file.path());

    let result = Connector::new("missing").await;

    assert!(
        matches!(result, Err(AthenaError::Connection(_))),
        "Expected connection error, got {result:?}"
    );
}

#[tokio::test]
async fn test_known_profile_connects() {
    let config_file = profile_file("[profile dev]\nregion = eu-west-1\n");
    let credentials_file = profile_file(
        "[dev]\naws_access_key_id = AKIDEXAMPLE\naws_secret_access_key = example-secret\n",
    );

    let connector = Connector::connect_with_profile_files(
        &ConnectorConfig::for_profile("dev"),
        Some(profile_files(&config_file, &credentials_file)),
    )
    .await
    .unwrap();

    assert_eq!(connector.profile(), "dev");
}

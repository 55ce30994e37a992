//! Argument, config and connection resolution end to end.

use std::fs;

use clap::Parser;
use healthreport::cli::Cli;
use healthreport::config::{Config, ConnectionConfig};
use healthreport::db::{self, DatabaseBackend, DatabaseClient};
use healthreport::report::{OutputFormat, TextReport};
use healthreport::script::{health_report_plan, run_plan, Completion, TransactionMode};
use tempfile::tempdir;

use super::FIXTURE;

#[test]
fn test_config_file_supplies_run_settings_and_connection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[run]
transaction = "autocommit"
format = "json"

[connections.local]
backend = "sqlite"
path = "health.db"
"#,
    )
    .unwrap();

    let cli = Cli::parse_from([
        "healthreport",
        "--config",
        path.to_str().unwrap(),
        "-c",
        "local",
        "--transaction",
        "dry-run",
    ]);
    let config = Config::load_from_file(&cli.config_path()).unwrap();

    assert_eq!(cli.transaction_mode(&config.run).unwrap(), TransactionMode::DryRun);
    assert_eq!(cli.output_format(&config.run).unwrap(), OutputFormat::Json);

    let conn = config.get_connection(cli.connection_name()).unwrap();
    assert_eq!(conn.backend, DatabaseBackend::Sqlite);
    assert_eq!(conn.path.as_deref(), Some("health.db"));
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from_file(&dir.path().join("absent.toml")).unwrap();
    assert!(config.connections.is_empty());
    assert_eq!(config.run.transaction, TransactionMode::Single);
}

#[tokio::test]
async fn test_committed_run_persists_in_database_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("health.db");
    let conn = ConnectionConfig::from_connection_string(&format!("sqlite:{}", file.display()))
        .unwrap();

    let mut client = db::connect(&conn).await.unwrap();
    client.execute_batch(FIXTURE).await.unwrap();
    let mut report = TextReport::new(Vec::new());
    let summary = run_plan(
        client.as_mut(),
        &health_report_plan(),
        TransactionMode::Single,
        &mut report,
    )
    .await
    .unwrap();
    assert_eq!(summary.completion, Completion::Committed);
    client.close().await.unwrap();

    let mut reopened = db::connect(&conn).await.unwrap();
    let users = reopened.execute_query("SELECT * FROM Users").await.unwrap();
    assert_eq!(users.row_count, 8);
    let view = reopened
        .execute_query("SELECT * FROM PatientDiseasesView")
        .await
        .unwrap();
    assert_eq!(view.row_count, 3);
    reopened.close().await.unwrap();
}

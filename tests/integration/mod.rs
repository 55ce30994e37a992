//! Integration tests for healthreport.

pub mod cli_test;
pub mod script_test;
pub mod statements_test;

use healthreport::db::{DatabaseClient, SqliteClient};

pub const FIXTURE: &str = include_str!("../fixtures/health_report.sql");

/// Opens an in-memory database loaded with the fixture dataset.
pub async fn fixture_client() -> SqliteClient {
    let mut client = SqliteClient::in_memory().await.unwrap();
    client.execute_batch(FIXTURE).await.unwrap();
    client
}

/// Returns the text column `column` of every row, in result order.
pub async fn strings(client: &mut SqliteClient, sql: &str, column: &str) -> Vec<String> {
    let result = client.execute_query(sql).await.unwrap();
    result
        .column_values(column)
        .into_iter()
        .map(|v| v.to_display_string())
        .collect()
}

//! Full report runs against the SQLite fixture.

use healthreport::db::{DatabaseClient, SqliteClient};
use healthreport::report::{sink_for, JsonReport, OutputFormat, TextReport};
use healthreport::script::{
    health_report_plan, run_plan, run_statements, Completion, TransactionMode,
};
use serde_json::Value as Json;

use super::{fixture_client, strings};

async fn user_count(client: &mut SqliteClient) -> usize {
    strings(client, "SELECT email FROM Users", "email").await.len()
}

async fn salary_of(client: &mut SqliteClient, email: &str) -> String {
    let sql = format!("SELECT salary FROM Users WHERE email = '{email}'");
    strings(client, &sql, "salary").await.remove(0)
}

#[tokio::test]
async fn test_full_plan_text_output() {
    let mut client = fixture_client().await;
    let mut report = TextReport::new(Vec::new());

    let summary = run_plan(
        &mut client,
        &health_report_plan(),
        TransactionMode::Single,
        &mut report,
    )
    .await
    .unwrap();

    assert_eq!(summary.completion, Completion::Committed);
    assert_eq!(summary.stats.statements, 21);

    let out = String::from_utf8(report.into_inner()).unwrap();
    assert!(out.starts_with(
        "--- 1. Basic retrieval queries ---\nAll diseases caused by bacteria discovered before 2020:\n("
    ));
    assert!(out.contains("\n\n--- 7 & 8. View Operation & Querying the View just created ---\n"));

    // Rows between "Before:" and "After:" are indented.
    assert!(out.contains("\tBefore:\n\t("));
    assert!(out.contains("\n\t(bekzat@gov.kz, Bekzat, Omarov, 1200, "));
    assert!(out.contains("\n\t(bekzat@gov.kz, Bekzat, Omarov, 2400, "));
    assert!(out.contains("\t(aybek@mail.kz, Aybek, Tursynov, 800, +77010000008, Kazakhstan)\n"));
    assert!(out.contains(
        "\t(pidx_email_users, Users, CREATE UNIQUE INDEX pidx_email_users ON Users(email))\n"
    ));

    assert!(out.contains("Top 2 countries with the highest number of total patients:\n(Turkey, 11)\n(Kazakhstan, 10)\n"));
    assert!(out.contains("Total number of patients with COVID-19:\n(12)\n"));
    assert!(out.contains("View is created.\n"));
    assert!(out.contains("(Gulnara Ermekova, FLU, influenza)\n"));
    // The view is queried after the delete.
    assert!(!out.contains("(Aybek Tursynov, "));

    // Committed changes stay visible after the run.
    assert_eq!(user_count(&mut client).await, 8);
    assert_eq!(salary_of(&mut client, "saule@gov.kz").await, "3000");
}

#[tokio::test]
async fn test_dry_run_leaves_database_unchanged() {
    let mut client = fixture_client().await;
    let mut report = TextReport::new(Vec::new());

    let summary = run_plan(
        &mut client,
        &health_report_plan(),
        TransactionMode::DryRun,
        &mut report,
    )
    .await
    .unwrap();

    assert_eq!(summary.completion, Completion::RolledBack);
    assert_eq!(user_count(&mut client).await, 10);
    assert_eq!(salary_of(&mut client, "saule@gov.kz").await, "1500");

    let views = strings(
        &mut client,
        "SELECT name FROM sqlite_master WHERE type = 'view'",
        "name",
    )
    .await;
    assert!(views.is_empty());
}

#[tokio::test]
async fn test_failure_rolls_back_whole_run() {
    let mut client = fixture_client().await;
    client
        .execute_statement(
            "INSERT INTO Users VALUES ('marat@gov.kz', 'Marat', 'Copy', 1, NULL, 'Kazakhstan')",
        )
        .await
        .unwrap();
    let mut report = TextReport::new(Vec::new());

    let err = run_plan(
        &mut client,
        &health_report_plan(),
        TransactionMode::Single,
        &mut report,
    )
    .await
    .unwrap_err();

    assert_eq!(err.category(), "Query Error");
    assert!(!client.in_transaction());

    // Output stops at the failing index creation.
    let out = String::from_utf8(report.into_inner()).unwrap();
    assert!(out.contains("\tCreating an index...\n"));
    assert!(!out.contains("--- 5. Additional Analysis ---"));

    // Update and delete ran before the failure and were rolled back.
    assert_eq!(user_count(&mut client).await, 11);
    assert_eq!(salary_of(&mut client, "saule@gov.kz").await, "1500");
}

#[tokio::test]
async fn test_failure_in_autocommit_keeps_earlier_writes() {
    let mut client = fixture_client().await;
    client
        .execute_statement(
            "INSERT INTO Users VALUES ('marat@gov.kz', 'Marat', 'Copy', 1, NULL, 'Kazakhstan')",
        )
        .await
        .unwrap();
    let mut report = TextReport::new(Vec::new());

    let result = run_plan(
        &mut client,
        &health_report_plan(),
        TransactionMode::Autocommit,
        &mut report,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(user_count(&mut client).await, 9);
    assert_eq!(salary_of(&mut client, "saule@gov.kz").await, "3000");
}

#[tokio::test]
async fn test_full_plan_json_output() {
    let mut client = fixture_client().await;
    let mut report = JsonReport::new(Vec::new());

    run_plan(
        &mut client,
        &health_report_plan(),
        TransactionMode::DryRun,
        &mut report,
    )
    .await
    .unwrap();

    let events: Vec<Json> = String::from_utf8(report.into_inner())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let count = |kind: &str| events.iter().filter(|e| e["type"] == kind).count();

    assert_eq!(count("section"), 7);
    assert_eq!(count("rows"), 16);
    assert_eq!(count("applied"), 5);
    assert_eq!(count("finished"), 1);

    let last = events.last().unwrap();
    assert_eq!(last["type"], "finished");
    assert_eq!(last["completion"], "rolled-back");
    assert_eq!(last["statements"], 21);

    let totals = events
        .iter()
        .find(|e| e["type"] == "rows" && e["columns"][0] == "total_covid19_patients")
        .unwrap();
    assert_eq!(totals["rows"], serde_json::json!([[12]]));
}

#[tokio::test]
async fn test_exec_statements_with_prefix() {
    let mut client = fixture_client().await;
    let mut buf = Vec::new();
    {
        let mut sink = sink_for(OutputFormat::Text, &mut buf);
        let statements = vec![
            "SELECT cname FROM Country WHERE cname LIKE 'K%'".to_string(),
            "DELETE FROM Record WHERE disease_code = 'TB'".to_string(),
            "SELECT COUNT(*) FROM Record".to_string(),
        ];
        let summary = run_statements(
            &mut client,
            &statements,
            "> ",
            TransactionMode::Autocommit,
            sink.as_mut(),
        )
        .await
        .unwrap();
        assert_eq!(summary.completion, Completion::Autocommitted);
        assert_eq!(summary.stats.rows_affected, 1);
    }

    assert_eq!(String::from_utf8(buf).unwrap(), "> (Kazakhstan)\n> (5)\n");
}

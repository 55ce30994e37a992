//! Behaviour of the individual report statements on the fixture dataset.

use healthreport::db::{DatabaseBackend, DatabaseClient, QueryResult, Value};
use healthreport::query::{QueryRunner, StatementOutcome};
use healthreport::script::statements as sql;
use pretty_assertions::assert_eq;

use super::{fixture_client, strings};

const SQLITE: DatabaseBackend = DatabaseBackend::Sqlite;

fn sorted_texts(result: &QueryResult, column: &str) -> Vec<String> {
    let mut values: Vec<String> = result
        .column_values(column)
        .into_iter()
        .map(|v| v.to_display_string())
        .collect();
    values.sort();
    values
}

#[tokio::test]
async fn test_bacteria_before_2020_matches_both_predicates() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let result = runner
        .fetch(sql::BACTERIA_DISEASES_BEFORE_2020.text(SQLITE))
        .await
        .unwrap();

    // PLAGUE is discovered on the cutoff date, LEPROSY after it, COVID-19 is a virus.
    assert_eq!(sorted_texts(&result, "disease_code"), vec!["CHOLERA", "TB"]);
    assert_eq!(sorted_texts(&result, "pathogen"), vec!["bacteria", "bacteria"]);
}

#[tokio::test]
async fn test_doctors_not_infectious() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let result = runner
        .fetch(sql::DOCTORS_NOT_INFECTIOUS.text(SQLITE))
        .await
        .unwrap();

    assert_eq!(sorted_texts(&result, "name"), vec!["Ali", "Dana", "Omar"]);
}

#[tokio::test]
async fn test_more_than_two_specializations_excludes_exactly_two() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let result = runner
        .fetch(sql::DOCTORS_MULTI_SPECIALIZED.text(SQLITE))
        .await
        .unwrap();

    assert_eq!(result.row_count, 1);
    assert_eq!(
        result.rows[0],
        vec![Value::from("Ali"), Value::from("Valiyev"), Value::from("PhD")]
    );
}

#[tokio::test]
async fn test_virology_average_salary() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let result = runner
        .fetch(sql::VIROLOGY_SALARY_BY_COUNTRY.text(SQLITE))
        .await
        .unwrap();

    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0][0], Value::from("Kazakhstan"));
    assert_eq!(result.rows[0][1], Value::Float(2500.0));
}

#[tokio::test]
async fn test_covid_departments_across_countries() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let result = runner
        .fetch(sql::COVID_DEPARTMENTS_ACROSS_COUNTRIES.text(SQLITE))
        .await
        .unwrap();

    // Statistics only reported COVID-19 in one country.
    assert_eq!(
        result.rows,
        vec![vec![Value::from("Epidemiology"), Value::Int(2)]]
    );
}

#[tokio::test]
async fn test_salary_doubling_is_strict_and_repeats() {
    let mut client = fixture_client().await;
    let salaries = "SELECT email, salary FROM Users WHERE email IN \
                    ('marat@gov.kz', 'saule@gov.kz', 'bekzat@gov.kz') ORDER BY email";

    {
        let mut runner = QueryRunner::new(&mut client);
        let reporters = runner.fetch(sql::COVID_REPORTERS.text(SQLITE)).await.unwrap();
        // Marat's total is exactly 3 and does not qualify.
        assert_eq!(
            sorted_texts(&reporters, "email"),
            vec!["bekzat@gov.kz", "saule@gov.kz"]
        );

        let outcome = runner
            .execute(sql::DOUBLE_COVID_REPORTER_SALARY.text(SQLITE))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            StatementOutcome::Applied {
                rows_affected: 2,
                ..
            }
        ));
    }
    assert_eq!(
        strings(&mut client, salaries, "salary").await,
        vec!["2400", "1000", "3000"]
    );

    client
        .execute_statement(sql::DOUBLE_COVID_REPORTER_SALARY.text(SQLITE))
        .await
        .unwrap();
    assert_eq!(
        strings(&mut client, salaries, "salary").await,
        vec!["4800", "1000", "6000"]
    );
}

#[tokio::test]
async fn test_delete_bek_gul_is_case_sensitive() {
    let mut client = fixture_client().await;

    let deleted = client
        .execute_statement(sql::DELETE_BEK_GUL_USERS.text(SQLITE))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let names = strings(&mut client, "SELECT name FROM Users ORDER BY name", "name").await;
    assert!(names.contains(&"Bekzat".to_string()));
    assert!(names.contains(&"Gulnara".to_string()));
    assert!(!names.contains(&"Aybek".to_string()));
    assert!(!names.contains(&"Aigul".to_string()));
    assert_eq!(names.len(), 8);
}

#[tokio::test]
async fn test_unique_email_index_created_and_listed() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let before = runner.fetch(sql::USERS_INDEXES.text(SQLITE)).await.unwrap();
    assert!(before.is_empty());

    runner
        .execute(sql::CREATE_EMAIL_INDEX.text(SQLITE))
        .await
        .unwrap();

    let after = runner.fetch(sql::USERS_INDEXES.text(SQLITE)).await.unwrap();
    assert_eq!(sorted_texts(&after, "name"), vec!["pidx_email_users"]);
}

#[tokio::test]
async fn test_unique_email_index_fails_on_duplicate_email() {
    let mut client = fixture_client().await;
    client
        .execute_statement(
            "INSERT INTO Users VALUES ('aybek@mail.kz', 'Aybek', 'Twin', 100, NULL, 'Kazakhstan')",
        )
        .await
        .unwrap();

    let err = client
        .execute_statement(sql::CREATE_EMAIL_INDEX.text(SQLITE))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Query Error");
    assert!(err.to_string().contains("UNIQUE"));
}

#[tokio::test]
async fn test_disease_code_index() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let before = runner.fetch(sql::DISEASE_INDEXES.text(SQLITE)).await.unwrap();
    runner
        .execute(sql::CREATE_DISEASE_CODE_INDEX.text(SQLITE))
        .await
        .unwrap();
    let after = runner.fetch(sql::DISEASE_INDEXES.text(SQLITE)).await.unwrap();

    assert_eq!(after.row_count, before.row_count + 1);
    assert!(sorted_texts(&after, "name").contains(&"idx_disease_code".to_string()));
}

#[tokio::test]
async fn test_top_countries_and_total_covid_patients() {
    let mut client = fixture_client().await;
    let mut runner = QueryRunner::new(&mut client);

    let top = runner
        .fetch(sql::TOP_COUNTRIES_BY_PATIENTS.text(SQLITE))
        .await
        .unwrap();
    assert_eq!(
        top.rows,
        vec![
            vec![Value::from("Turkey"), Value::Int(11)],
            vec![Value::from("Kazakhstan"), Value::Int(10)],
        ]
    );

    let total = runner
        .fetch(sql::TOTAL_COVID_PATIENTS.text(SQLITE))
        .await
        .unwrap();
    assert_eq!(total.rows, vec![vec![Value::Int(12)]]);
}

#[tokio::test]
async fn test_view_has_one_row_per_pairing() {
    let mut client = fixture_client().await;

    let expected = {
        let result = client
            .execute_query(
                "SELECT u.name || ' ' || u.surname AS full_name, pd.disease_code
                 FROM Users u JOIN PatientDisease pd ON u.email = pd.email
                 ORDER BY full_name, pd.disease_code",
            )
            .await
            .unwrap();
        result.rows
    };

    let mut runner = QueryRunner::new(&mut client);
    runner
        .execute(sql::CREATE_PATIENT_DISEASES_VIEW.text(SQLITE))
        .await
        .unwrap();
    let result = runner.fetch(sql::PATIENT_FULL_NAMES.text(SQLITE)).await.unwrap();

    let mut pairs: Vec<Vec<Value>> = result
        .rows
        .iter()
        .map(|row| vec![row[0].clone(), row[1].clone()])
        .collect();
    pairs.sort_by_key(|row| (row[0].to_display_string(), row[1].to_display_string()));

    assert_eq!(result.row_count, 5);
    assert_eq!(pairs, expected);
    assert_eq!(result.columns[0].name, "full_name");
}

#[test]
fn test_postgres_delete_uses_like() {
    let text = sql::DELETE_BEK_GUL_USERS.text(DatabaseBackend::Postgres);
    assert!(text.contains("LIKE '%bek%'"));
    assert!(text.contains("LIKE '%gul%'"));
}

//! The ordered statement plan.
//!
//! A plan is a list of sections; each section is a list of notes and
//! statements executed strictly in order. Later statements rely on earlier
//! ones (the view is queried after it is created, indexes are listed around
//! their creation).

use super::statements::{self as sql, Sql};

/// A titled group of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub steps: Vec<Step>,
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A line of text printed as-is.
    Note(&'static str),
    /// A statement; rows it returns are printed after `prefix`.
    Statement { sql: Sql, prefix: &'static str },
}

impl Step {
    /// A statement whose rows are printed without a prefix.
    pub const fn run(sql: Sql) -> Self {
        Self::Statement { sql, prefix: "" }
    }

    /// A statement whose rows are printed indented by a tab.
    pub const fn run_indented(sql: Sql) -> Self {
        Self::Statement { sql, prefix: "\t" }
    }
}

impl Section {
    fn new(title: &'static str, steps: Vec<Step>) -> Self {
        Self { title, steps }
    }

    /// Returns the number of statements in the section.
    pub fn statement_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Statement { .. }))
            .count()
    }
}

/// Builds the health-report plan.
pub fn health_report_plan() -> Vec<Section> {
    use Step::Note;

    vec![
        Section::new(
            "1. Basic retrieval queries",
            vec![
                Note("All diseases caused by bacteria discovered before 2020:"),
                Step::run(sql::BACTERIA_DISEASES_BEFORE_2020),
                Note("Names and degrees of doctors not specialized in 'infectious diseases':"),
                Step::run(sql::DOCTORS_NOT_INFECTIOUS),
                Note("Name, surname, and degree of doctors specialized in more than 2 disease types:"),
                Step::run(sql::DOCTORS_MULTI_SPECIALIZED),
            ],
        ),
        Section::new(
            "2. Complex queries with Aggregation",
            vec![
                Note("Countries and avg salaries of doctors specialized in 'virology':"),
                Step::run(sql::VIROLOGY_SALARY_BY_COUNTRY),
                Note("Departments with public servants who reported 'COVID-19' across multiple countries:"),
                Step::run(sql::COVID_DEPARTMENTS_ACROSS_COUNTRIES),
            ],
        ),
        Section::new(
            "3. Update and Maintenance Queries",
            vec![
                Note("Doubling salaries of public servants who recorded more than 3 COVID-19 patients:"),
                Note("\tBefore:"),
                Step::run_indented(sql::COVID_REPORTERS),
                Note("\tUpdating..."),
                Step::run(sql::DOUBLE_COVID_REPORTER_SALARY),
                Note("\tAfter:"),
                Step::run_indented(sql::COVID_REPORTERS),
                Note("Deleting users with names LIKE %bek% or %gul%:"),
                Note("\tBefore:"),
                Step::run_indented(sql::ALL_USERS),
                Note("\tDeleting..."),
                Step::run(sql::DELETE_BEK_GUL_USERS),
                Note("\tAfter:"),
                Step::run_indented(sql::ALL_USERS),
            ],
        ),
        Section::new(
            "4. Indexing",
            vec![
                Note("Creating a primary indexing on email field of Users table:"),
                Note("\tBefore:"),
                Step::run_indented(sql::USERS_INDEXES),
                Note("\tCreating an index..."),
                Step::run(sql::CREATE_EMAIL_INDEX),
                Note("\tAfter:"),
                Step::run_indented(sql::USERS_INDEXES),
                Note("Creating a secondary indexing on the “disease_code” field of Disease table:"),
                Note("\tBefore:"),
                Step::run_indented(sql::DISEASE_INDEXES),
                Note("\tCreating an index..."),
                Step::run(sql::CREATE_DISEASE_CODE_INDEX),
                Note("\tAfter:"),
                Step::run_indented(sql::DISEASE_INDEXES),
            ],
        ),
        Section::new(
            "5. Additional Analysis",
            vec![
                Note("Top 2 countries with the highest number of total patients:"),
                Step::run(sql::TOP_COUNTRIES_BY_PATIENTS),
            ],
        ),
        Section::new(
            "6. Query with a Derived Attribute",
            vec![
                Note("Total number of patients with COVID-19:"),
                Step::run(sql::TOTAL_COVID_PATIENTS),
            ],
        ),
        Section::new(
            "7 & 8. View Operation & Querying the View just created",
            vec![
                Note("Creating a view with all patients’ names and surnames along with their respective diseases:"),
                Step::run(sql::CREATE_PATIENT_DISEASES_VIEW),
                Note("View is created."),
                Note("All patients’ full names along with the diseases they have been diagnosed with:"),
                Step::run(sql::PATIENT_FULL_NAMES),
            ],
        ),
    ]
}

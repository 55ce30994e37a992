//! SQL text of the health-report battery.
//!
//! Statements are static literal text. Most run unchanged on every backend;
//! the few that touch vendor catalogs or vendor LIKE semantics carry one text
//! per backend.

use crate::db::DatabaseBackend;

/// One SQL statement, possibly spelled differently per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sql {
    postgres: &'static str,
    sqlite: &'static str,
}

impl Sql {
    /// A statement that is valid as-is on every backend.
    pub const fn portable(text: &'static str) -> Self {
        Self {
            postgres: text,
            sqlite: text,
        }
    }

    /// A statement with backend-specific spellings.
    pub const fn per_backend(postgres: &'static str, sqlite: &'static str) -> Self {
        Self { postgres, sqlite }
    }

    /// Returns the text to send to `backend`.
    pub fn text(&self, backend: DatabaseBackend) -> &'static str {
        match backend {
            DatabaseBackend::Postgres => self.postgres,
            DatabaseBackend::Sqlite => self.sqlite,
        }
    }

    /// Returns true if the text differs between backends.
    pub fn is_dialect_specific(&self) -> bool {
        self.postgres != self.sqlite
    }
}

// --- 1. Basic retrieval ---

pub const BACTERIA_DISEASES_BEFORE_2020: Sql = Sql::portable(
    "SELECT * FROM Disease d, Discover di
WHERE d.disease_code = di.disease_code AND
    d.pathogen = 'bacteria' AND di.first_enc_date < '2020-01-01'",
);

pub const DOCTORS_NOT_INFECTIOUS: Sql = Sql::portable(
    "SELECT u.name, u.surname, doc.degree
FROM Users u, Doctor doc, Specialize s, DiseaseType dt
WHERE u.email = doc.email AND doc.email = s.email AND s.id = dt.id AND
    dt.description <> 'infectious diseases'
GROUP BY u.name, u.surname, doc.degree",
);

pub const DOCTORS_MULTI_SPECIALIZED: Sql = Sql::portable(
    "SELECT u.name, u.surname, doc.degree
FROM Users u
JOIN Doctor doc ON u.email = doc.email
JOIN Specialize s ON doc.email = s.email
GROUP BY u.name, u.surname, doc.degree
HAVING COUNT(s.id) > 2",
);

// --- 2. Aggregation ---

pub const VIROLOGY_SALARY_BY_COUNTRY: Sql = Sql::portable(
    "SELECT c.cname, AVG(u.salary) AS avg_salary
FROM Users u, Doctor doc, Specialize s, DiseaseType dt, Country c
WHERE u.email = doc.email AND doc.email = s.email AND
    s.id = dt.id AND u.cname = c.cname AND
    dt.description = 'virology'
GROUP BY c.cname",
);

pub const COVID_DEPARTMENTS_ACROSS_COUNTRIES: Sql = Sql::portable(
    "SELECT ps.department, COUNT(DISTINCT ps.email) AS num_employees
FROM PublicServant ps, Record r
WHERE ps.email = r.email AND r.disease_code = 'COVID-19'
GROUP BY ps.department
HAVING COUNT(DISTINCT r.cname) > 1",
);

// --- 3. Update and maintenance ---

pub const COVID_REPORTERS: Sql = Sql::portable(
    "SELECT * FROM Users
WHERE email IN (
    SELECT ps.email
    FROM PublicServant ps, Record r
    WHERE ps.email = r.email AND r.disease_code = 'COVID-19'
    GROUP BY ps.email
    HAVING SUM(r.total_patients) > 3
)",
);

pub const DOUBLE_COVID_REPORTER_SALARY: Sql = Sql::portable(
    "UPDATE Users
SET salary = salary * 2
WHERE email IN (
    SELECT ps.email
    FROM PublicServant ps, Record r
    WHERE ps.email = r.email AND r.disease_code = 'COVID-19'
    GROUP BY ps.email
    HAVING SUM(r.total_patients) > 3
)",
);

pub const ALL_USERS: Sql = Sql::portable("SELECT * FROM Users");

/// SQLite's LIKE ignores ASCII case, GLOB does not.
pub const DELETE_BEK_GUL_USERS: Sql = Sql::per_backend(
    "DELETE FROM Users
WHERE name LIKE '%bek%' OR name LIKE '%gul%'",
    "DELETE FROM Users
WHERE name GLOB '*bek*' OR name GLOB '*gul*'",
);

// --- 4. Indexing ---

pub const USERS_INDEXES: Sql = Sql::per_backend(
    "SELECT *
FROM pg_indexes
WHERE tablename = 'users'",
    "SELECT name, tbl_name, sql
FROM sqlite_master
WHERE type = 'index' AND lower(tbl_name) = 'users'",
);

pub const CREATE_EMAIL_INDEX: Sql =
    Sql::portable("CREATE UNIQUE INDEX pidx_email_users ON Users(email)");

pub const DISEASE_INDEXES: Sql = Sql::per_backend(
    "SELECT *
FROM pg_indexes
WHERE tablename = 'disease'",
    "SELECT name, tbl_name, sql
FROM sqlite_master
WHERE type = 'index' AND lower(tbl_name) = 'disease'",
);

pub const CREATE_DISEASE_CODE_INDEX: Sql =
    Sql::portable("CREATE INDEX idx_disease_code ON Disease(disease_code)");

// --- 5. Additional analysis ---

pub const TOP_COUNTRIES_BY_PATIENTS: Sql = Sql::portable(
    "SELECT r.cname, SUM(r.total_patients) AS total_patients
FROM Record r
GROUP BY r.cname
ORDER BY total_patients DESC
LIMIT 2",
);

// --- 6. Derived attribute ---

pub const TOTAL_COVID_PATIENTS: Sql = Sql::portable(
    "SELECT SUM(total_patients) AS total_covid19_patients
FROM Record
WHERE disease_code = 'COVID-19'",
);

// --- 7 & 8. View ---

pub const CREATE_PATIENT_DISEASES_VIEW: Sql = Sql::portable(
    "CREATE VIEW PatientDiseasesView AS
SELECT u.name, u.surname, d.disease_code, d.description
FROM Users u, PatientDisease pd, Disease d
WHERE u.email = pd.email AND pd.disease_code = d.disease_code",
);

pub const PATIENT_FULL_NAMES: Sql = Sql::portable(
    "SELECT CONCAT(name, ' ', surname) AS full_name, disease_code, description
FROM PatientDiseasesView",
);

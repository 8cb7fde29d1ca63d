use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{
    Admin, CalendarRow, DbAdmin, EntityKind, Faculty, Proficiency, Session, Skill, SkillMatrixRow,
    Student,
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS admins (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    year INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS faculty (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    department TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS student_skills (
    student_id INTEGER NOT NULL,
    skill_id INTEGER NOT NULL,
    proficiency TEXT NOT NULL,
    PRIMARY KEY (student_id, skill_id),
    FOREIGN KEY (student_id) REFERENCES students(id),
    FOREIGN KEY (skill_id) REFERENCES skills(id)
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tutor_id INTEGER NOT NULL,
    learner_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    topic TEXT NOT NULL,
    FOREIGN KEY (tutor_id) REFERENCES students(id),
    FOREIGN KEY (learner_id) REFERENCES students(id)
);
";

/// Creates the schema if missing and seeds the default administrator.
/// Safe to call on every process start.
#[instrument(skip(pool))]
pub async fn initialize_db(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Initializing database schema");

    sqlx::raw_sql(SCHEMA).execute(pool).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE username = ?")
        .bind(DEFAULT_ADMIN_USERNAME)
        .fetch_one(pool)
        .await?;

    if existing == 0 {
        info!("Seeding default administrator account");
        let hashed = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
        sqlx::query("INSERT INTO admins (username, password) VALUES (?, ?)")
            .bind(DEFAULT_ADMIN_USERNAME)
            .bind(hashed)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[instrument(skip_all, fields(username))]
pub async fn authenticate_admin(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<Admin>, AppError> {
    info!("Authenticating administrator");

    let row = sqlx::query_as::<_, DbAdmin>(
        "SELECT username, password FROM admins WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(admin) => {
            // An unreadable stored hash counts as a failed match.
            match bcrypt::verify(password, &admin.password) {
                Ok(true) => Ok(Some(Admin {
                    username: admin.username,
                })),
                _ => Ok(None),
            }
        }
        None => Ok(None),
    }
}

/// Rotates an administrator's credential out-of-band. Not exposed on the API.
#[instrument(skip_all, fields(username))]
pub async fn set_admin_password(
    pool: &Pool<Sqlite>,
    username: &str,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating administrator password");

    let hashed = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    let result = sqlx::query("UPDATE admins SET password = ? WHERE username = ?")
        .bind(hashed)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Administrator '{}' not found",
            username
        )));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn add_student(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    year: i64,
) -> Result<i64, AppError> {
    info!("Adding student");

    if !(1..=4).contains(&year) {
        return Err(AppError::Validation(format!(
            "Year must be between 1 and 4, got {}",
            year
        )));
    }

    let res = sqlx::query("INSERT INTO students (name, email, year) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(year)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from_insert(e, &format!("A student with email '{}' already exists", email))
        })?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool))]
pub async fn add_faculty(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    department: &str,
) -> Result<i64, AppError> {
    info!("Adding faculty member");

    let res = sqlx::query("INSERT INTO faculty (name, email, department) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(department)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from_insert(
                e,
                &format!("A faculty member with email '{}' already exists", email),
            )
        })?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool))]
pub async fn add_skill(pool: &Pool<Sqlite>, name: &str) -> Result<i64, AppError> {
    info!("Adding skill");

    let res = sqlx::query("INSERT INTO skills (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from_insert(e, &format!("A skill named '{}' already exists", name))
        })?;

    Ok(res.last_insert_rowid())
}

/// Upserts a (student, skill) assignment: assigning the same pair again
/// replaces the proficiency rather than erroring.
#[instrument(skip(pool))]
pub async fn assign_skill(
    pool: &Pool<Sqlite>,
    student_id: i64,
    skill_id: i64,
    proficiency: Proficiency,
) -> Result<(), AppError> {
    info!("Assigning skill to student");

    require_row(pool, EntityKind::Student, student_id).await?;
    require_row(pool, EntityKind::Skill, skill_id).await?;

    sqlx::query(
        "INSERT INTO student_skills (student_id, skill_id, proficiency)
         VALUES (?, ?, ?)
         ON CONFLICT (student_id, skill_id) DO UPDATE SET proficiency = excluded.proficiency",
    )
    .bind(student_id)
    .bind(skill_id)
    .bind(proficiency.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn schedule_session(
    pool: &Pool<Sqlite>,
    tutor_id: i64,
    learner_id: i64,
    date: NaiveDate,
    topic: &str,
) -> Result<i64, AppError> {
    info!("Scheduling session");

    // Checked before any write reaches the store.
    if tutor_id == learner_id {
        return Err(AppError::Validation(
            "Tutor and learner must be different students".to_string(),
        ));
    }

    require_row(pool, EntityKind::Student, tutor_id).await?;
    require_row(pool, EntityKind::Student, learner_id).await?;

    let res = sqlx::query(
        "INSERT INTO sessions (tutor_id, learner_id, date, topic) VALUES (?, ?, ?, ?)",
    )
    .bind(tutor_id)
    .bind(learner_id)
    .bind(date)
    .bind(topic)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Removes exactly one row of the given kind. Deleting a student or skill
/// that is still referenced by assignments or sessions is rejected so the
/// store never accumulates orphaned rows.
#[instrument(skip(pool))]
pub async fn delete_record(
    pool: &Pool<Sqlite>,
    kind: EntityKind,
    id: i64,
) -> Result<(), AppError> {
    info!("Deleting record");

    let references = count_references(pool, kind, id).await?;
    if references > 0 {
        return Err(AppError::Conflict(format!(
            "{} {} is still referenced by {} dependent row(s); remove those first",
            kind.label(),
            id,
            references
        )));
    }

    let sql = format!("DELETE FROM {} WHERE {} = ?", kind.table(), kind.key_column());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "{} with id {} not found",
            kind.label(),
            id
        )));
    }

    Ok(())
}

async fn count_references(
    pool: &Pool<Sqlite>,
    kind: EntityKind,
    id: i64,
) -> Result<i64, AppError> {
    let count: i64 = match kind {
        EntityKind::Student => {
            sqlx::query_scalar(
                "SELECT (SELECT COUNT(*) FROM student_skills WHERE student_id = ?1)
                      + (SELECT COUNT(*) FROM sessions WHERE tutor_id = ?1 OR learner_id = ?1)",
            )
            .bind(id)
            .fetch_one(pool)
            .await?
        }
        EntityKind::Skill => {
            sqlx::query_scalar("SELECT COUNT(*) FROM student_skills WHERE skill_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        EntityKind::Faculty | EntityKind::Session => 0,
    };

    Ok(count)
}

async fn require_row(pool: &Pool<Sqlite>, kind: EntityKind, id: i64) -> Result<(), AppError> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?",
        kind.table(),
        kind.key_column()
    );
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;

    if count == 0 {
        return Err(AppError::NotFound(format!(
            "{} with id {} not found",
            kind.label(),
            id
        )));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_students(pool: &Pool<Sqlite>) -> Result<Vec<Student>, AppError> {
    info!("Getting all students");
    let rows = sqlx::query_as::<_, Student>("SELECT id, name, email, year FROM students")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn get_faculty(pool: &Pool<Sqlite>) -> Result<Vec<Faculty>, AppError> {
    info!("Getting all faculty");
    let rows =
        sqlx::query_as::<_, Faculty>("SELECT id, name, email, department FROM faculty")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn get_skills(pool: &Pool<Sqlite>) -> Result<Vec<Skill>, AppError> {
    info!("Getting all skills");
    let rows = sqlx::query_as::<_, Skill>("SELECT id, name FROM skills")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn get_sessions(pool: &Pool<Sqlite>) -> Result<Vec<Session>, AppError> {
    info!("Getting all sessions");
    let rows = sqlx::query_as::<_, Session>(
        "SELECT id, tutor_id, learner_id, date, topic FROM sessions",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn get_skill_matrix(pool: &Pool<Sqlite>) -> Result<Vec<SkillMatrixRow>, AppError> {
    info!("Getting skill matrix");
    let rows = sqlx::query_as::<_, SkillMatrixRow>(
        "SELECT s.name AS student, sk.name AS skill, ss.proficiency AS proficiency
         FROM student_skills ss
         JOIN students s ON ss.student_id = s.id
         JOIN skills sk ON ss.skill_id = sk.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn get_session_calendar(pool: &Pool<Sqlite>) -> Result<Vec<CalendarRow>, AppError> {
    info!("Getting session calendar");
    let rows = sqlx::query_as::<_, CalendarRow>(
        "SELECT tutor.name AS tutor, learner.name AS learner,
                sessions.date AS date, sessions.topic AS topic
         FROM sessions
         JOIN students tutor ON tutor.id = sessions.tutor_id
         JOIN students learner ON learner.id = sessions.learner_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Calendar restricted to sessions where the given student appears as
/// either tutor or learner.
#[instrument(skip(pool))]
pub async fn get_session_calendar_for_student(
    pool: &Pool<Sqlite>,
    student_id: i64,
) -> Result<Vec<CalendarRow>, AppError> {
    info!("Getting session calendar for student");
    let rows = sqlx::query_as::<_, CalendarRow>(
        "SELECT tutor.name AS tutor, learner.name AS learner,
                sessions.date AS date, sessions.topic AS topic
         FROM sessions
         JOIN students tutor ON tutor.id = sessions.tutor_id
         JOIN students learner ON learner.id = sessions.learner_id
         WHERE sessions.tutor_id = ?1 OR sessions.learner_id = ?1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The single privileged account. Only the username leaves the db layer;
/// the stored bcrypt hash never does.
#[derive(Serialize, Debug, Clone)]
pub struct Admin {
    pub username: String,
}

#[derive(sqlx::FromRow)]
pub struct DbAdmin {
    pub username: String,
    pub password: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub year: i64,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct StudentSkill {
    pub student_id: i64,
    pub skill_id: i64,
    pub proficiency: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub tutor_id: i64,
    pub learner_id: i64,
    pub date: NaiveDate,
    pub topic: String,
}

/// One row of the skill matrix report: student and skill resolved to names.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct SkillMatrixRow {
    pub student: String,
    pub skill: String,
    pub proficiency: String,
}

/// One row of the session calendar report, with the sessions table joined
/// against students twice (tutor and learner).
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct CalendarRow {
    pub tutor: String,
    pub learner: String,
    pub date: NaiveDate,
    pub topic: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
}

impl Proficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Proficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Proficiency::Beginner),
            "Intermediate" => Ok(Proficiency::Intermediate),
            "Advanced" => Ok(Proficiency::Advanced),
            other => Err(format!("Unknown proficiency level '{}'", other)),
        }
    }
}

/// Deletable entity kinds, mapped explicitly to their table and key column
/// rather than deriving the column name from the table name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Faculty,
    Skill,
    Session,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Faculty => "faculty",
            EntityKind::Skill => "skills",
            EntityKind::Session => "sessions",
        }
    }

    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::Student => "id",
            EntityKind::Faculty => "id",
            EntityKind::Skill => "id",
            EntityKind::Session => "id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Student => "Student",
            EntityKind::Faculty => "Faculty",
            EntityKind::Skill => "Skill",
            EntityKind::Session => "Session",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(EntityKind::Student),
            "faculty" => Ok(EntityKind::Faculty),
            "skill" => Ok(EntityKind::Skill),
            "session" => Ok(EntityKind::Session),
            other => Err(format!("Unknown entity kind '{}'", other)),
        }
    }
}

impl<'a> rocket::request::FromParam<'a> for EntityKind {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map_err(|_| param)
    }
}

use std::str::FromStr;

use crate::error::AppError;
use crate::models::{CalendarRow, Faculty, SkillMatrixRow, Student};

/// The exportable reports: the three entity listings the dashboard shows
/// plus the two joined views, one CSV document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Students,
    Faculty,
    SkillMatrix,
    Sessions,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "students" => Ok(ExportKind::Students),
            "faculty" => Ok(ExportKind::Faculty),
            "skill-matrix" => Ok(ExportKind::SkillMatrix),
            "sessions" => Ok(ExportKind::Sessions),
            other => Err(format!("Unknown export kind '{}'", other)),
        }
    }
}

impl<'a> rocket::request::FromParam<'a> for ExportKind {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map_err(|_| param)
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))
}

pub fn students_csv(students: &[Student]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["StudentID", "Name", "Email", "Year"])?;
    for student in students {
        writer.write_record([
            student.id.to_string(),
            student.name.clone(),
            student.email.clone(),
            student.year.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn faculty_csv(faculty: &[Faculty]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["FacultyID", "Name", "Email", "Department"])?;
    for member in faculty {
        writer.write_record([
            member.id.to_string(),
            member.name.clone(),
            member.email.clone(),
            member.department.clone(),
        ])?;
    }
    finish(writer)
}

pub fn skill_matrix_csv(rows: &[SkillMatrixRow]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["Student", "Skill", "Proficiency"])?;
    for row in rows {
        writer.write_record([
            row.student.clone(),
            row.skill.clone(),
            row.proficiency.clone(),
        ])?;
    }
    finish(writer)
}

pub fn session_calendar_csv(rows: &[CalendarRow]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["Tutor", "Learner", "Date", "Topic"])?;
    for row in rows {
        writer.write_record([
            row.tutor.clone(),
            row.learner.clone(),
            row.date.to_string(),
            row.topic.clone(),
        ])?;
    }
    finish(writer)
}

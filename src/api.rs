use chrono::NaiveDate;
use rocket::State;
use rocket::http::{ContentType, Status};
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::db::{
    add_faculty, add_skill, add_student, assign_skill, authenticate_admin, delete_record,
    get_faculty, get_session_calendar, get_session_calendar_for_student, get_sessions, get_skills,
    get_skill_matrix, get_students, schedule_session,
};
use crate::error::AppError;
use crate::export::{
    ExportKind, faculty_csv, session_calendar_csv, skill_matrix_csv, students_csv,
};
use crate::models::{
    Admin, CalendarRow, EntityKind, Faculty, Proficiency, Session, Skill, SkillMatrixRow, Student,
};
use crate::validation::{AppErrorExt, JsonValidateExt, ValidationResponse};

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub admin: Option<AdminData>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AdminData {
    pub username: String,
}

impl From<Admin> for AdminData {
    fn from(admin: Admin) -> Self {
        Self {
            username: admin.username,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<LoginResponse>, Custom<Json<ValidationResponse>>> {
    let validated = login.validate_custom()?;

    match authenticate_admin(db, &validated.username, &validated.password)
        .await
        .validate_custom()?
    {
        Some(admin) => Ok(Json(LoginResponse {
            success: true,
            admin: Some(AdminData::from(admin)),
            error: None,
        })),
        None => Ok(Json(LoginResponse {
            success: false,
            admin: None,
            error: Some("Invalid username or password".to_string()),
        })),
    }
}

#[derive(Deserialize, Validate)]
pub struct NewStudentRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(range(min = 1, max = 4, message = "Year must be between 1 and 4"))]
    year: i64,
}

#[post("/students", data = "<student>")]
pub async fn api_add_student(
    student: Json<NewStudentRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<IdResponse>, Custom<Json<ValidationResponse>>> {
    let validated = student.validate_custom()?;

    let id = add_student(db, &validated.name, &validated.email, validated.year)
        .await
        .validate_custom()?;

    Ok(Json(IdResponse { id }))
}

#[get("/students")]
pub async fn api_get_students(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(get_students(db).await?))
}

#[derive(Deserialize, Validate)]
pub struct NewFacultyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "A valid email address is required"))]
    email: String,
    #[validate(length(min = 1, message = "Department is required"))]
    department: String,
}

#[post("/faculty", data = "<faculty>")]
pub async fn api_add_faculty(
    faculty: Json<NewFacultyRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<IdResponse>, Custom<Json<ValidationResponse>>> {
    let validated = faculty.validate_custom()?;

    let id = add_faculty(db, &validated.name, &validated.email, &validated.department)
        .await
        .validate_custom()?;

    Ok(Json(IdResponse { id }))
}

#[get("/faculty")]
pub async fn api_get_faculty(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Faculty>>, AppError> {
    Ok(Json(get_faculty(db).await?))
}

#[derive(Deserialize, Validate)]
pub struct NewSkillRequest {
    #[validate(length(min = 1, message = "Skill name is required"))]
    name: String,
}

#[post("/skills", data = "<skill>")]
pub async fn api_add_skill(
    skill: Json<NewSkillRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<IdResponse>, Custom<Json<ValidationResponse>>> {
    let validated = skill.validate_custom()?;

    let id = add_skill(db, &validated.name).await.validate_custom()?;

    Ok(Json(IdResponse { id }))
}

#[get("/skills")]
pub async fn api_get_skills(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Skill>>, AppError> {
    Ok(Json(get_skills(db).await?))
}

#[derive(Deserialize)]
pub struct AssignSkillRequest {
    student_id: i64,
    skill_id: i64,
    proficiency: Proficiency,
}

#[post("/skills/assign", data = "<request>")]
pub async fn api_assign_skill(
    request: Json<AssignSkillRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    assign_skill(db, request.student_id, request.skill_id, request.proficiency).await?;

    Ok(Status::Ok)
}

#[derive(Deserialize, Validate)]
pub struct ScheduleSessionRequest {
    tutor_id: i64,
    learner_id: i64,
    date: NaiveDate,
    #[validate(length(min = 1, message = "Topic is required"))]
    topic: String,
}

#[post("/sessions", data = "<session>")]
pub async fn api_schedule_session(
    session: Json<ScheduleSessionRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<IdResponse>, Custom<Json<ValidationResponse>>> {
    let validated = session.validate_custom()?;

    let id = schedule_session(
        db,
        validated.tutor_id,
        validated.learner_id,
        validated.date,
        &validated.topic,
    )
    .await
    .validate_custom()?;

    Ok(Json(IdResponse { id }))
}

#[get("/sessions")]
pub async fn api_get_sessions(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Session>>, AppError> {
    Ok(Json(get_sessions(db).await?))
}

#[delete("/records/<kind>/<id>")]
pub async fn api_delete_record(
    kind: EntityKind,
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    delete_record(db, kind, id).await?;

    Ok(Status::Ok)
}

#[get("/reports/skill-matrix")]
pub async fn api_skill_matrix(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<SkillMatrixRow>>, AppError> {
    Ok(Json(get_skill_matrix(db).await?))
}

#[get("/reports/calendar?<student>")]
pub async fn api_session_calendar(
    student: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<CalendarRow>>, AppError> {
    let rows = match student {
        Some(id) => get_session_calendar_for_student(db, id).await?,
        None => get_session_calendar(db).await?,
    };

    Ok(Json(rows))
}

#[get("/export/<kind>")]
pub async fn api_export(
    kind: ExportKind,
    db: &State<Pool<Sqlite>>,
) -> Result<(ContentType, String), AppError> {
    let csv = match kind {
        ExportKind::Students => students_csv(&get_students(db).await?)?,
        ExportKind::Faculty => faculty_csv(&get_faculty(db).await?)?,
        ExportKind::SkillMatrix => skill_matrix_csv(&get_skill_matrix(db).await?)?,
        ExportKind::Sessions => session_calendar_csv(&get_session_calendar(db).await?)?,
    };

    Ok((ContentType::CSV, csv))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use crate::api::{IdResponse, LoginResponse};
    use crate::models::{CalendarRow, SkillMatrixRow, Student};
    use crate::test::utils::test_db::{create_standard_test_db, setup_test_client};
    use rocket::http::{ContentType, Status};
    use serde_json::json;

    #[rocket::async_test]
    async fn test_login_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": "admin",
                    "password": "admin123"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let login_response: LoginResponse = serde_json::from_str(&body).unwrap();

        assert!(login_response.success);
        assert_eq!(login_response.admin.unwrap().username, "admin");

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": "admin",
                    "password": "wrong_password"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let login_response: LoginResponse = serde_json::from_str(&body).unwrap();

        assert!(!login_response.success);
        assert!(login_response.error.is_some());
    }

    #[rocket::async_test]
    async fn test_add_and_list_students_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Cat",
                    "email": "cat@example.edu",
                    "year": 1
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let created: IdResponse = serde_json::from_str(&body).unwrap();
        assert!(created.id > 0);

        let response = client.get("/api/students").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let students: Vec<Student> = serde_json::from_str(&body).unwrap();
        assert_eq!(students.len(), 3);
        assert!(students.iter().any(|s| s.email == "cat@example.edu"));
    }

    #[rocket::async_test]
    async fn test_duplicate_student_email_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Shadow Ann",
                    "email": "ann@example.edu",
                    "year": 4
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Conflict);
    }

    #[rocket::async_test]
    async fn test_student_field_validation_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Cat",
                    "email": "not-an-email",
                    "year": 9
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::UnprocessableEntity);

        let body = response.into_string().await.unwrap();
        assert!(body.contains("email"));
        assert!(body.contains("year"));
    }

    #[rocket::async_test]
    async fn test_assign_skill_and_matrix_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let ben = test_db.student_id("Ben").unwrap();
        let rust = test_db.skill_id("Rust").unwrap();

        let response = client
            .post("/api/skills/assign")
            .header(ContentType::JSON)
            .body(
                json!({
                    "student_id": ben,
                    "skill_id": rust,
                    "proficiency": "Beginner"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/reports/skill-matrix").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let matrix: Vec<SkillMatrixRow> = serde_json::from_str(&body).unwrap();
        assert_eq!(matrix.len(), 2);
        assert!(
            matrix
                .iter()
                .any(|row| row.student == "Ben" && row.skill == "Rust"
                    && row.proficiency == "Beginner")
        );
    }

    #[rocket::async_test]
    async fn test_schedule_session_validation_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let ann = test_db.student_id("Ann").unwrap();

        let response = client
            .post("/api/sessions")
            .header(ContentType::JSON)
            .body(
                json!({
                    "tutor_id": ann,
                    "learner_id": ann,
                    "date": "2025-04-01",
                    "topic": "Self-study"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(test_db.count("sessions").await, 1, "No new row written");
    }

    #[rocket::async_test]
    async fn test_session_calendar_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client.get("/api/reports/calendar").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let calendar: Vec<CalendarRow> = serde_json::from_str(&body).unwrap();
        assert_eq!(calendar.len(), 1);
        assert_eq!(calendar[0].tutor, "Ann");
        assert_eq!(calendar[0].learner, "Ben");

        let ben = test_db.student_id("Ben").unwrap();
        let response = client
            .get(format!("/api/reports/calendar?student={}", ben))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let calendar: Vec<CalendarRow> = serde_json::from_str(&body).unwrap();
        assert_eq!(calendar.len(), 1);

        let response = client.get("/api/reports/calendar?student=999").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let calendar: Vec<CalendarRow> = serde_json::from_str(&body).unwrap();
        assert!(calendar.is_empty());
    }

    #[rocket::async_test]
    async fn test_delete_record_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client.delete("/api/records/student/999").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let ann = test_db.student_id("Ann").unwrap();
        let response = client
            .delete(format!("/api/records/student/{}", ann))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict, "Ann is still referenced");

        let response = client.delete("/api/records/classroom/1").dispatch().await;
        assert_eq!(response.status(), Status::NotFound, "Unknown entity kind");
    }

    #[rocket::async_test]
    async fn test_export_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client.get("/api/export/students").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::CSV));

        let body = response.into_string().await.unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("StudentID,Name,Email,Year"));
        assert_eq!(lines.clone().count(), 2);

        let response = client.get("/api/export/skill-matrix").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = response.into_string().await.unwrap();
        assert!(body.starts_with("Student,Skill,Proficiency"));
        assert!(body.contains("Ann,SQL,Intermediate"));

        let response = client.get("/api/export/sessions").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = response.into_string().await.unwrap();
        assert!(body.starts_with("Tutor,Learner,Date,Topic"));

        let response = client.get("/api/export/grades").dispatch().await;
        assert_eq!(response.status(), Status::NotFound, "Unknown export kind");
    }

    #[rocket::async_test]
    async fn test_health_api() {
        let test_db = create_standard_test_db().await;
        let client = setup_test_client(test_db.pool.clone()).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }
}

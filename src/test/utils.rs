#[cfg(test)]
pub mod test_db {
    use crate::db::{
        add_faculty, add_skill, add_student, assign_skill, initialize_db, schedule_session,
    };
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::models::Proficiency;
    use chrono::NaiveDate;
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// A fresh in-memory store with the schema applied and the default
    /// administrator seeded. Single connection so every operation sees the
    /// same in-memory database.
    pub async fn setup_test_pool() -> Pool<Sqlite> {
        INIT.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        initialize_db(&pool)
            .await
            .expect("Failed to initialize test database");

        pool
    }

    pub async fn setup_test_client(pool: Pool<Sqlite>) -> Client {
        Client::tracked(init_rocket(pool).await)
            .await
            .expect("Failed to build test client")
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        students: Vec<TestStudent>,
        faculty: Vec<TestFaculty>,
        skills: Vec<String>,
        assignments: Vec<TestAssignment>,
        sessions: Vec<TestSession>,
    }

    pub struct TestStudent {
        pub name: String,
        pub email: String,
        pub year: i64,
    }

    pub struct TestFaculty {
        pub name: String,
        pub email: String,
        pub department: String,
    }

    pub struct TestAssignment {
        pub student_name: String,
        pub skill_name: String,
        pub proficiency: Proficiency,
    }

    pub struct TestSession {
        pub tutor_name: String,
        pub learner_name: String,
        pub date: NaiveDate,
        pub topic: String,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn student(mut self, name: &str, email: &str, year: i64) -> Self {
            self.students.push(TestStudent {
                name: name.to_string(),
                email: email.to_string(),
                year,
            });
            self
        }

        pub fn faculty(mut self, name: &str, email: &str, department: &str) -> Self {
            self.faculty.push(TestFaculty {
                name: name.to_string(),
                email: email.to_string(),
                department: department.to_string(),
            });
            self
        }

        pub fn skill(mut self, name: &str) -> Self {
            self.skills.push(name.to_string());
            self
        }

        pub fn assignment(
            mut self,
            student_name: &str,
            skill_name: &str,
            proficiency: Proficiency,
        ) -> Self {
            self.assignments.push(TestAssignment {
                student_name: student_name.to_string(),
                skill_name: skill_name.to_string(),
                proficiency,
            });
            self
        }

        pub fn session(
            mut self,
            tutor_name: &str,
            learner_name: &str,
            date: &str,
            topic: &str,
        ) -> Self {
            self.sessions.push(TestSession {
                tutor_name: tutor_name.to_string(),
                learner_name: learner_name.to_string(),
                date: date.parse().expect("Invalid test session date"),
                topic: topic.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            let pool = setup_test_pool().await;

            let mut student_id_map: HashMap<String, i64> = HashMap::new();
            let mut skill_id_map: HashMap<String, i64> = HashMap::new();

            for student in &self.students {
                let id = add_student(&pool, &student.name, &student.email, student.year).await?;
                student_id_map.insert(student.name.clone(), id);
            }

            for member in &self.faculty {
                add_faculty(&pool, &member.name, &member.email, &member.department).await?;
            }

            for skill in &self.skills {
                let id = add_skill(&pool, skill).await?;
                skill_id_map.insert(skill.clone(), id);
            }

            for assignment in &self.assignments {
                let student_id = student_id_map[&assignment.student_name];
                let skill_id = skill_id_map[&assignment.skill_name];
                assign_skill(&pool, student_id, skill_id, assignment.proficiency).await?;
            }

            for session in &self.sessions {
                let tutor_id = student_id_map[&session.tutor_name];
                let learner_id = student_id_map[&session.learner_name];
                schedule_session(&pool, tutor_id, learner_id, session.date, &session.topic)
                    .await?;
            }

            Ok(TestDb {
                pool,
                student_id_map,
                skill_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub student_id_map: HashMap<String, i64>,
        pub skill_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn student_id(&self, name: &str) -> Option<i64> {
            self.student_id_map.get(name).copied()
        }

        pub fn skill_id(&self, name: &str) -> Option<i64> {
            self.skill_id_map.get(name).copied()
        }

        pub async fn count(&self, table: &str) -> i64 {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            sqlx::query_scalar(&sql)
                .fetch_one(&self.pool)
                .await
                .expect("Failed to count rows")
        }
    }

    /// A small populated fixture shared by the API tests: two students, one
    /// faculty member, two skills, one assignment, one session.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .student("Ann", "ann@example.edu", 2)
            .student("Ben", "ben@example.edu", 3)
            .faculty("Dr. Carol", "carol@example.edu", "Computer Science")
            .skill("SQL")
            .skill("Rust")
            .assignment("Ann", "SQL", Proficiency::Intermediate)
            .session("Ann", "Ben", "2025-03-14", "Joins and subqueries")
            .build()
            .await
            .expect("Failed to build standard test database")
    }
}

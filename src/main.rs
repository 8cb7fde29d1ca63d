#[macro_use]
extern crate rocket;

mod api;
mod db;
mod env;
mod error;
mod export;
mod models;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use api::{
    api_add_faculty, api_add_skill, api_add_student, api_assign_skill, api_delete_record,
    api_export, api_get_faculty, api_get_sessions, api_get_skills, api_get_students, api_login,
    api_schedule_session, api_session_calendar, api_skill_matrix, health,
};
use db::initialize_db;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use telemetry::{RequestTimerFairing, init_tracing};
use tracing::{info, warn};

#[launch]
async fn rocket() -> _ {
    init_tracing();

    if let Err(e) = env::load_environment() {
        warn!("Failed to load environment files: {}", e);
    }

    let database_url = env::database_url();

    let pool = SqlitePool::connect(&database_url)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Initializing database schema...");
    match initialize_db(&pool).await {
        Ok(_) => info!("Database initialized"),
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            panic!("Database initialization failed: {}", e);
        }
    }

    init_rocket(pool).await
}

pub async fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting peer learning tracker");

    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                api_login,
                api_add_student,
                api_get_students,
                api_add_faculty,
                api_get_faculty,
                api_add_skill,
                api_get_skills,
                api_assign_skill,
                api_schedule_session,
                api_get_sessions,
                api_delete_record,
                api_skill_matrix,
                api_session_calendar,
                api_export,
                health,
            ],
        )
        .attach(RequestTimerFairing)
}

//! Rotates an administrator password directly against the store.
//!
//! Usage: set_admin_password <username> <new-password>

use anyhow::{Context, Result, bail};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (username, new_password) = match (args.next(), args.next()) {
        (Some(u), Some(p)) => (u, p),
        _ => bail!("Usage: set_admin_password <username> <new-password>"),
    };

    let database_url = dotenvy::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:peer_learning.db?mode=rwc".to_string());

    let pool = sqlx::SqlitePool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", database_url))?;

    let hashed =
        bcrypt::hash(&new_password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

    let result = sqlx::query("UPDATE admins SET password = ? WHERE username = ?")
        .bind(hashed)
        .bind(&username)
        .execute(&pool)
        .await
        .context("Failed to update administrator record")?;

    if result.rows_affected() == 0 {
        bail!("No administrator named '{}'", username);
    }

    println!("Password updated for '{}'", username);
    Ok(())
}

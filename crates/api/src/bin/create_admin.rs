//! Create an `Admin` account directly in the database.
//!
//! ```text
//! create-admin --username root --email root@example.com --department IT
//! ```
//!
//! The password comes from `--password` or `ADMIN_PASSWORD`.

use anyhow::{bail, Context};
use assetflow_api::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use assetflow_core::roles::ROLE_ADMIN;
use assetflow_core::validation::validate_email;
use assetflow_db::models::user::CreateUser;
use assetflow_db::repositories::UserRepo;
use clap::Parser;

#[derive(Parser)]
#[command(name = "create-admin")]
#[command(about = "Create an AssetFlow administrator account")]
#[command(version)]
struct Args {
    #[arg(long, env = "DATABASE_URL", help = "PostgreSQL connection string")]
    database_url: String,

    #[arg(long, help = "Login name of the new admin")]
    username: String,

    #[arg(long, help = "Email address of the new admin")]
    email: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, help = "Initial password")]
    password: String,

    #[arg(long, default_value = "IT", help = "Department of the new admin")]
    department: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let username = args.username.trim();
    if username.is_empty() {
        bail!("Username cannot be empty");
    }
    let email = args.email.trim();
    validate_email(email)?;
    validate_password_strength(&args.password, MIN_PASSWORD_LENGTH).map_err(anyhow::Error::msg)?;

    let pool = assetflow_db::create_pool(&args.database_url)
        .await
        .context("Failed to connect to database")?;
    assetflow_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    if UserRepo::find_by_username(&pool, username).await?.is_some() {
        bail!("Username '{username}' already exists");
    }
    if UserRepo::find_by_email(&pool, email).await?.is_some() {
        bail!("Email '{email}' already exists");
    }

    let password_hash =
        hash_password(&args.password).map_err(|e| anyhow::anyhow!("Password hashing error: {e}"))?;

    let admin = UserRepo::create(
        &pool,
        &CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
            department: Some(args.department.trim().to_string()),
        },
    )
    .await
    .context("Failed to create admin user")?;

    tracing::info!(user_id = admin.id, username = %admin.username, "Admin user created");
    println!(
        "Admin user '{}' created (email: {}, department: {})",
        admin.username,
        admin.email,
        admin.department.as_deref().unwrap_or("-")
    );
    Ok(())
}

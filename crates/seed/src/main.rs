//! Populate a database with a demo residential complex.
//!
//! ```text
//! conjunto-seed [--reset] [--admin-email E] [--admin-password P]
//! ```

mod demo;

use anyhow::Context;
use clap::Parser;
use conjunto_core::user::normalize_email;
use conjunto_db::repositories::UserRepo;
use conjunto_db::DbPool;

/// `conjunto-seed` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "conjunto-seed",
    about = "Create the admin account and demo data for a residential complex",
    version
)]
struct Args {
    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", value_name = "url")]
    database_url: String,
    /// Wipe all data tables first. Lookup tables and system roles are kept.
    #[arg(long)]
    reset: bool,
    #[arg(long, env = "SEED_ADMIN_EMAIL", default_value = "admin@conjunto.local")]
    admin_email: String,
    #[arg(long, env = "SEED_ADMIN_PASSWORD", default_value = "Admin-2026!")]
    admin_password: String,
}

/// Tables holding demo data, children first.
const DATA_TABLES: &[&str] = &[
    "survey_responses",
    "surveys",
    "payments",
    "notifications",
    "reservations",
    "pqrs_tickets",
    "parking_spots",
    "users",
    "apartments",
    "towers",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conjunto_seed=info".into()),
        )
        .init();

    let args = Args::parse();
    let admin_email = normalize_email(&args.admin_email);

    let pool = conjunto_db::create_pool(&args.database_url, 2)
        .await
        .context("Failed to connect to database")?;
    conjunto_db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    if args.reset {
        reset(&pool).await.context("Failed to reset data")?;
    } else if UserRepo::find_by_email(&pool, &admin_email).await?.is_some() {
        tracing::info!(email = %admin_email, "Admin already exists, skipping demo data");
        pool.close().await;
        return Ok(());
    }

    let summary = demo::seed(&pool, &admin_email, &args.admin_password).await?;
    tracing::info!(
        towers = summary.towers,
        apartments = summary.apartments,
        users = summary.users,
        parking_spots = summary.parking_spots,
        tickets = summary.tickets,
        payments = summary.payments,
        "Demo data created",
    );
    tracing::info!(email = %admin_email, "Log in with the admin account");

    pool.close().await;
    Ok(())
}

/// Truncate every data table, restart numbering and drop custom roles.
async fn reset(pool: &DbPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(&format!(
        "TRUNCATE {} RESTART IDENTITY CASCADE",
        DATA_TABLES.join(", ")
    ))
    .execute(&mut *tx)
    .await?;
    sqlx::query("ALTER SEQUENCE pqrs_ticket_seq RESTART")
        .execute(&mut *tx)
        .await?;
    sqlx::query("ALTER SEQUENCE payment_receipt_seq RESTART")
        .execute(&mut *tx)
        .await?;
    let roles = sqlx::query("DELETE FROM roles WHERE NOT is_system")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::warn!(
        tables = DATA_TABLES.len(),
        custom_roles = roles.rows_affected(),
        "Data reset",
    );
    Ok(())
}

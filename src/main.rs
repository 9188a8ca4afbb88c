use chrono::Utc;
use dotenvy::dotenv;
use school_ledger::{
    config::{database, school},
    core::{maintenance, subject},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the school configuration
    let config = school::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        "Loaded configuration for academic year {}",
        config.academic_year
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the subject catalogue
    subject::seed_subjects(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed subjects: {}", e))?;

    // 6. Bring fee statuses up to date
    match maintenance::run_daily_sweep(&db, Utc::now()).await {
        Ok(Some(result)) => {
            for change in &result.changes {
                info!(
                    "Fee {} (student {}): {} -> {}",
                    change.fee_id, change.student_id, change.old_status, change.new_status
                );
            }
        }
        Ok(None) => info!("Fee statuses already refreshed today"),
        Err(e) => {
            error!("Fee status sweep failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// Schema sync cannot express partial unique indexes, so the
/// final-submission backstop is created manually on startup. Everything else
/// (registration idempotency, team membership) rides on composite primary
/// keys.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // At most one final submission per (hackathon, submitter).
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_submission_final_per_submitter \
         ON submission (hackathon_id, submitter_id) WHERE is_final",
    )
    .await?;
    info!("Ensured index idx_submission_final_per_submitter exists");

    // At most one final submission per (hackathon, team).
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_submission_final_per_team \
         ON submission (hackathon_id, team_id) WHERE is_final AND team_id IS NOT NULL",
    )
    .await?;
    info!("Ensured index idx_submission_final_per_team exists");

    Ok(())
}

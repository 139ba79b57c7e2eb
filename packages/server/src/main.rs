use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::storage::s3::S3Signer;
use common::storage::{NoopSigner, UrlSigner};
use tracing::{Level, info, warn};

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    server::database::ensure_indexes(&db).await?;

    let signer: Arc<dyn UrlSigner> = match &config.storage {
        Some(storage) => Arc::new(S3Signer::new(
            &storage.bucket,
            &storage.region,
            &storage.endpoint,
            &storage.access_key,
            &storage.secret_key,
        )?),
        None => {
            warn!("Object storage not configured; file delivery degrades to unsigned URLs");
            Arc::new(NoopSigner::new(None))
        }
    };

    // Clock-driven lifecycle sweep. Stateless and idempotent, so a missed or
    // doubled tick is harmless.
    let sweep_db = db.clone();
    let sweep_interval = config.lifecycle.sweep_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(sweep_interval));
        loop {
            ticker.tick().await;
            match server::lifecycle::advance_by_clock(&sweep_db, chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(moved) => info!("Lifecycle sweep advanced {moved} hackathon(s)"),
                Err(e) => warn!("Lifecycle sweep failed: {e}"),
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState { db, signer, config };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use common::storage::UrlSigner;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub signer: Arc<dyn UrlSigner>,
    pub config: AppConfig,
}

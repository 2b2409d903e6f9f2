use std::sync::Arc;

use common::store::CodeStore;
use mq::StreamBroker;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn CodeStore>,
    /// Absent when the server runs without a broker (tests); submissions are
    /// then inserted but never enqueued.
    pub broker: Option<Arc<dyn StreamBroker>>,
    pub config: AppConfig,
}

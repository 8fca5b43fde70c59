use std::sync::Arc;

use muralis_storage::ObjectStore;

use crate::config::ServerConfig;
use crate::email::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: muralis_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Blob store for uploaded images and attachments. S3/MinIO in
    /// production, an in-memory double in tests.
    pub store: Arc<dyn ObjectStore>,
    /// SMTP mailer for verification codes. `None` when SMTP is not
    /// configured; registration then requires a pre-seeded code path.
    pub mailer: Option<Arc<Mailer>>,
}

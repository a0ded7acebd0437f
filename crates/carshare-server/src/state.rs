use carshare_db::Database;

use crate::auth::TokenDirectory;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    /// Bearer tokens accepted on mutating routes.
    pub tokens: TokenDirectory,
}

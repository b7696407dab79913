use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::TokenKeys;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, tokens: TokenKeys) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
        }
    }
}

//! Application state shared across handlers

use std::sync::Arc;

use catalog::CatalogService;
use jsonwebtoken::DecodingKey;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    /// Public key that verifies access tokens, parsed once at startup
    pub decoding_key: Arc<DecodingKey>,
}

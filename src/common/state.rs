// Application state shared across all modules

use std::sync::Arc;

use crate::services::IdentityProvider;
use crate::session::SessionCodec;

/// Built once at startup and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub codec: SessionCodec,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(codec: SessionCodec, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { codec, identity }
    }
}

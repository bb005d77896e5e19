//! Shared handler state.

use bookfair_core_rs::Engine;
use std::sync::Arc;

/// Application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

//! Application state for the web layer.

use std::sync::Arc;

use crate::engine::MeetingPointEngine;

/// Shared application state.
///
/// One engine serves every request, so the cache, the request queue and the
/// credential flag are shared across the session.
pub struct AppState<O> {
    pub engine: Arc<MeetingPointEngine<O>>,
}

impl<O> AppState<O> {
    pub fn new(engine: MeetingPointEngine<O>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

// Derived Clone would require `O: Clone`.
impl<O> Clone for AppState<O> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

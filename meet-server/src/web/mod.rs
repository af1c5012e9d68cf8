//! Web layer for the meeting point engine.
//!
//! Provides JSON endpoints for resolving meeting points, searching places
//! around them and routing both parties to a chosen place.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

//! Web layer for the transit client.
//!
//! JSON endpoints for place search, trip planning and line timetables.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

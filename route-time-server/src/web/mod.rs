//! Web layer for the route time server.
//!
//! JSON endpoints for route estimation, search, overlap and snapshot
//! status, plus the static dashboard.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, DASHBOARD_PAGE, create_router};
pub use state::AppState;

//! Lookups over the route database snapshot.
//!
//! All of these are linear scans over the route list; the database is
//! small enough that no index is kept.

mod error;
mod overlap;
mod search;
mod variant;

pub use error::ResolveError;
pub use overlap::find_overlapping_routes;
pub use search::{RouteMatch, SEARCH_LIMIT, search_routes};
pub use variant::{NamedStop, ResolvedRoute, VariantSummary, resolve};

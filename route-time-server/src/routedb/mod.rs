//! Published route database: download, disk cache and shared snapshot.
//!
//! The database lists every route variant (number, destination, operating
//! companies, ordered stops, frequency table) plus a stop directory. It is
//! fetched once at startup, shared read-only across requests, and
//! refreshed on a timer.

mod cache;
mod client;
mod error;
mod handle;
mod types;

pub use cache::{CachedDocument, RouteDbCache, RouteDbCacheConfig};
pub use client::{DEFAULT_ROUTE_DB_URL, RouteDbClient, RouteDbClientConfig};
pub use error::RouteDbError;
pub use handle::RouteDbHandle;
pub use types::{
    FrequencyTable, LocalizedName, RouteDb, RouteEntry, SUPPORTED_COMPANIES, ServicePeriod,
    StopEntry, UNKNOWN_DESTINATION,
};

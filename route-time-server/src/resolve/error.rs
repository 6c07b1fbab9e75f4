//! Route resolution errors.

/// Why a route number could not be resolved to a usable variant.
///
/// Both variants are "not found" from a caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No supported route variant has this number
    #[error("route {route} not found")]
    RouteNotFound { route: String },

    /// The selected variant has no stop list for any supported company
    #[error("no stop list for route variant {key}")]
    NoStops { key: String },
}

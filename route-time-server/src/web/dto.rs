//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::estimate::EstimationMatrix;
use crate::resolve::{NamedStop, ResolvedRoute, RouteMatch, VariantSummary};

/// Query for `/api/route`.
#[derive(Debug, Default, Deserialize)]
pub struct RouteRequest {
    /// Route number, e.g. "94"
    pub id: Option<String>,

    /// Index of the first stop; empty or missing means 0
    pub start: Option<String>,

    /// Index of the last stop; empty or missing means the final stop
    pub end: Option<String>,

    /// Variant index, used when `dest` does not match; empty or missing means 0
    pub variant: Option<String>,

    /// Destination name to pick the variant by
    pub dest: Option<String>,
}

/// A stop on the resolved variant.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
}

impl From<NamedStop> for StopResult {
    fn from(stop: NamedStop) -> Self {
        Self {
            id: stop.id.as_str().to_string(),
            name: stop.name,
        }
    }
}

/// One candidate variant of the requested route.
#[derive(Debug, Serialize)]
pub struct VariantResult {
    pub index: usize,
    pub dest: String,
    pub key: String,
}

impl From<VariantSummary> for VariantResult {
    fn from(v: VariantSummary) -> Self {
        Self {
            index: v.index,
            dest: v.dest,
            key: v.key,
        }
    }
}

/// Response for `/api/route`.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub title: String,
    pub stops: Vec<StopResult>,
    pub variants: Vec<VariantResult>,
    /// The variant actually used
    pub current_variant: usize,
    /// Estimated minutes per day code and start hour
    pub data: EstimationMatrix,
}

impl RouteResponse {
    pub fn new(route: ResolvedRoute, data: EstimationMatrix) -> Self {
        Self {
            title: route.title,
            stops: route.stops.into_iter().map(StopResult::from).collect(),
            variants: route.variants.into_iter().map(VariantResult::from).collect(),
            current_variant: route.selected,
            data,
        }
    }
}

/// Query for `/api/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub q: String,
}

/// A route search result.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub route: String,
    pub dest: String,
}

impl From<RouteMatch> for SearchResult {
    fn from(m: RouteMatch) -> Self {
        Self {
            route: m.route,
            dest: m.dest,
        }
    }
}

/// Query for `/api/overlap`.
#[derive(Debug, Default, Deserialize)]
pub struct OverlapRequest {
    pub start: Option<String>,
    pub end: Option<String>,
    pub exclude: Option<String>,
}

/// Response for `/api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// RFC 3339 time the route database snapshot was loaded
    pub loaded_at: String,
    pub routes: usize,
    pub stops: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Treat an empty or whitespace-only query value as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

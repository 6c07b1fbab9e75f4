//! Route number → single variant resolution.

use tracing::{debug, info};

use crate::domain::StopId;
use crate::routedb::{FrequencyTable, RouteDb, RouteEntry};

use super::error::ResolveError;

/// A stop with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedStop {
    pub id: StopId,
    /// English name, or the raw id when the directory has none.
    pub name: String,
}

/// One candidate variant, for caller disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummary {
    pub index: usize,
    pub dest: String,
    pub key: String,
}

/// The outcome of resolving a route number to one variant.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub stops: Vec<NamedStop>,
    /// "<route> to <destination>"
    pub title: String,
    pub stop_ids: Vec<StopId>,
    /// Every candidate variant, in key order.
    pub variants: Vec<VariantSummary>,
    /// Index into `variants` that was selected.
    pub selected: usize,
    pub frequency: Option<FrequencyTable>,
}

/// Resolve `route` to one of its variants.
///
/// Candidates are the supported-company entries with this route number,
/// in database key order. A destination hint (trimmed, case-insensitive)
/// picks the first candidate with that destination; otherwise
/// `variant_index` is used, falling back to 0 when out of range.
pub fn resolve(
    db: &RouteDb,
    route: &str,
    variant_index: i64,
    destination_hint: Option<&str>,
) -> Result<ResolvedRoute, ResolveError> {
    // routes() yields in key order
    let candidates: Vec<(&str, &RouteEntry)> = db
        .routes()
        .filter(|(_, entry)| entry.route.as_deref() == Some(route) && entry.is_supported())
        .collect();

    if candidates.is_empty() {
        debug!(route, "no candidates");
        return Err(ResolveError::RouteNotFound {
            route: route.to_string(),
        });
    }

    let variants: Vec<VariantSummary> = candidates
        .iter()
        .enumerate()
        .map(|(index, (key, entry))| VariantSummary {
            index,
            dest: entry.destination().to_string(),
            key: key.to_string(),
        })
        .collect();

    let hinted = destination_hint.and_then(|hint| {
        let wanted = hint.trim().to_lowercase();
        variants
            .iter()
            .position(|v| v.dest.trim().to_lowercase() == wanted)
    });
    if let Some(index) = hinted {
        debug!(route, index, "matched destination hint");
    }

    let selected = hinted
        .or_else(|| usize::try_from(variant_index).ok())
        .filter(|&i| i < candidates.len())
        .unwrap_or(0);

    let (key, entry) = candidates[selected];
    info!(route, key, dest = entry.destination(), "selected route variant");

    let stop_ids = entry
        .stop_ids()
        .ok_or_else(|| ResolveError::NoStops {
            key: key.to_string(),
        })?
        .to_vec();

    let stops = stop_ids
        .iter()
        .map(|id| NamedStop {
            id: id.clone(),
            name: db.stop_name(id).unwrap_or(id.as_str()).to_string(),
        })
        .collect();

    Ok(ResolvedRoute {
        stops,
        title: format!("{} to {}", route, entry.destination()),
        stop_ids,
        variants,
        selected,
        frequency: entry.freq.clone(),
    })
}

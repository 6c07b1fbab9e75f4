//! Route number prefix search.

use std::collections::HashSet;

use crate::routedb::RouteDb;

/// Maximum number of distinct results returned by [`search_routes`].
pub const SEARCH_LIMIT: usize = 10;

/// A route number and one of its destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: String,
    pub dest: String,
}

/// Find supported routes whose number starts with `query` (case-insensitive).
///
/// Scans in key order, keeps the first [`SEARCH_LIMIT`] distinct
/// (route, destination) pairs, then sorts them shortest route number first.
pub fn search_routes(db: &RouteDb, query: &str) -> Vec<RouteMatch> {
    let query = query.to_uppercase();
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for (_, entry) in db.routes() {
        let Some(route) = entry.route.as_deref() else {
            continue;
        };
        if !route.starts_with(&query) || !entry.is_supported() {
            continue;
        }

        let unique_key = format!("{}-{}", route, entry.dest.en.as_deref().unwrap_or(""));
        if seen.insert(unique_key) {
            matches.push(RouteMatch {
                route: route.to_string(),
                dest: entry.destination().to_string(),
            });
            if matches.len() >= SEARCH_LIMIT {
                break;
            }
        }
    }

    matches.sort_by(|a, b| {
        a.route
            .len()
            .cmp(&b.route.len())
            .then_with(|| a.route.cmp(&b.route))
    });
    matches
}

//! Routes that serve two stops in order.

use std::collections::BTreeSet;

use crate::routedb::RouteDb;

/// Route numbers of supported routes that call at `start` and later at `end`.
///
/// Order is judged by the first occurrence of each stop. Variants of
/// `exclude` are skipped. The result is de-duplicated and sorted.
pub fn find_overlapping_routes(
    db: &RouteDb,
    start: &str,
    end: &str,
    exclude: Option<&str>,
) -> Vec<String> {
    let mut matches = BTreeSet::new();

    for (_, entry) in db.routes() {
        let Some(route) = entry.route.as_deref() else {
            continue;
        };
        if exclude == Some(route) || !entry.is_supported() {
            continue;
        }
        let Some(stops) = entry.stop_ids() else {
            continue;
        };

        let start_idx = stops.iter().position(|s| s.as_str() == start);
        let end_idx = stops.iter().position(|s| s.as_str() == end);
        if let (Some(s), Some(e)) = (start_idx, end_idx)
            && s < e
        {
            matches.insert(route.to_string());
        }
    }

    matches.into_iter().collect()
}

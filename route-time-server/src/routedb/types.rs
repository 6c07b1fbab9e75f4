//! Typed view of the published route database.
//!
//! The upstream document is large and loosely structured. Only the
//! top-level `routeList` is required; individual route or stop entries
//! that fail to parse are skipped so one bad record cannot take the
//! whole snapshot down.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{Hhmm, StopId};

use super::error::RouteDbError;

/// Operating companies whose routes have timing data.
pub const SUPPORTED_COMPANIES: [&str; 2] = ["kmb", "ctb"];

/// Destination used when a route entry has no English destination.
pub const UNKNOWN_DESTINATION: &str = "Unknown";

/// A name in the database's bilingual format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub zh: Option<String>,
}

/// One entry of the stop directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StopEntry {
    #[serde(default)]
    pub name: LocalizedName,
}

/// One route variant from `routeList`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteEntry {
    /// Public route number, e.g. "94" or "A21".
    #[serde(default)]
    pub route: Option<String>,

    /// Operating company codes.
    #[serde(default)]
    pub co: Vec<String>,

    #[serde(default)]
    pub dest: LocalizedName,

    /// Ordered stop ids, per operating company. Companies whose list is
    /// not an array of ids are left out.
    #[serde(default, deserialize_with = "lenient_stops")]
    pub stops: HashMap<String, Vec<StopId>>,

    /// Absent when missing or not an object.
    #[serde(default, deserialize_with = "lenient_frequency")]
    pub freq: Option<FrequencyTable>,
}

fn lenient_stops<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<StopId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(raw) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(raw
        .into_iter()
        .filter_map(|(co, ids)| match serde_json::from_value(ids) {
            Ok(ids) => Some((co, ids)),
            Err(e) => {
                debug!(co = %co, error = %e, "ignoring malformed stop list");
                None
            }
        })
        .collect())
}

fn lenient_frequency<'de, D>(deserializer: D) -> Result<Option<FrequencyTable>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(FrequencyTable(map.into_iter().collect()))),
        other => {
            debug!(freq = %other, "ignoring malformed frequency table");
            Ok(None)
        }
    }
}

impl RouteEntry {
    /// Whether any operating company is one we have timing data for.
    pub fn is_supported(&self) -> bool {
        self.co
            .iter()
            .any(|c| SUPPORTED_COMPANIES.contains(&c.as_str()))
    }

    /// English destination, or "Unknown".
    pub fn destination(&self) -> &str {
        self.dest.en.as_deref().unwrap_or(UNKNOWN_DESTINATION)
    }

    /// The ordered stop list: KMB's if present, else CTB's.
    pub fn stop_ids(&self) -> Option<&[StopId]> {
        SUPPORTED_COMPANIES
            .iter()
            .filter_map(|co| self.stops.get(*co))
            .find(|ids| !ids.is_empty())
            .map(Vec::as_slice)
    }
}

/// A route's published service frequency table.
///
/// Maps a day bitmask (as a decimal string) to departure windows keyed by
/// start time, each `[endHHMM, intervalSeconds]`. Stored loosely and read
/// through [`FrequencyTable::periods`], which skips malformed entries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<String, Value>);

/// The operating span of one bitmask entry of a frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePeriod {
    /// Calendar days this period applies to.
    pub mask: u32,
    /// Earliest departure window start.
    pub first_start: Hhmm,
    /// Latest departure window end.
    pub last_end: Hhmm,
}

impl FrequencyTable {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        FrequencyTable(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse every well-formed bitmask entry into a [`ServicePeriod`].
    ///
    /// An entry is dropped whole if its mask is not an integer, its timings
    /// are not an object, or any start or end time is not a number.
    pub fn periods(&self) -> Vec<ServicePeriod> {
        self.0
            .iter()
            .filter_map(|(mask, timings)| {
                let period = parse_period(mask, timings);
                if period.is_none() {
                    debug!(mask = %mask, "skipping malformed frequency entry");
                }
                period
            })
            .collect()
    }
}

fn parse_period(mask: &str, timings: &Value) -> Option<ServicePeriod> {
    let mask = mask.trim().parse::<u32>().ok()?;
    let timings = timings.as_object()?;

    let mut first_start = Hhmm::from_raw(2400);
    let mut last_end = Hhmm::from_raw(0);
    for (start, window) in timings {
        let start = Hhmm::parse(start).ok()?;
        let end = window
            .as_array()
            .and_then(|w| w.first())
            .and_then(Hhmm::from_json)?;
        first_start = first_start.min(start);
        last_end = last_end.max(end);
    }

    Some(ServicePeriod {
        mask,
        first_start,
        last_end,
    })
}

/// A parsed snapshot of the published route database.
#[derive(Debug, Clone, Default)]
pub struct RouteDb {
    /// Route variants keyed by database key; iteration is in key order.
    routes: BTreeMap<String, RouteEntry>,
    stops: HashMap<String, StopEntry>,
}

impl RouteDb {
    /// Parse the raw JSON document.
    ///
    /// Fails only when `routeList` is missing or the document (or its
    /// `stopList`) has the wrong shape entirely.
    pub fn from_value(document: Value) -> Result<Self, RouteDbError> {
        let Value::Object(mut top) = document else {
            return Err(RouteDbError::MissingStructure("a top-level object"));
        };

        let route_list = match top.remove("routeList") {
            Some(Value::Object(map)) => map,
            _ => return Err(RouteDbError::MissingStructure("routeList")),
        };
        let stop_list = match top.remove("stopList") {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => Map::new(),
            Some(_) => return Err(RouteDbError::MissingStructure("stopList")),
        };

        let routes = parse_entries::<RouteEntry>("route", route_list);
        let stops = parse_entries::<StopEntry>("stop", stop_list)
            .into_iter()
            .collect();

        Ok(Self { routes, stops })
    }

    /// Parse a JSON document from bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RouteDbError> {
        let document: Value = serde_json::from_slice(bytes).map_err(|e| RouteDbError::Json {
            message: e.to_string(),
        })?;
        Self::from_value(document)
    }

    /// All route variants, in database key order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// English display name of a stop, if the directory has one.
    pub fn stop_name(&self, id: &StopId) -> Option<&str> {
        self.stops.get(id.as_str())?.name.en.as_deref()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

fn parse_entries<T: serde::de::DeserializeOwned>(
    kind: &str,
    raw: Map<String, Value>,
) -> BTreeMap<String, T> {
    let mut skipped = 0usize;
    let entries = raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                debug!(kind, key = %key, error = %e, "skipping malformed entry");
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(kind, skipped, "skipped malformed route database entries");
    }
    entries
}

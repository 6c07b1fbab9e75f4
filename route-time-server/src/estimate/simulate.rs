//! Virtual trip simulation over a stop range.
//!
//! A trip departs at the top of an hour and walks its segments in order.
//! Each found segment advances a running clock, so later segments are
//! looked up in the hour (and, past midnight, the day) the bus would
//! actually reach them.

use std::ops::Range;

use tracing::trace;

use crate::domain::{DayCode, StopId};

use super::store::{SegmentStore, TimingCorpus};

pub const SECS_PER_HOUR: f64 = 3600.0;
pub const SECS_PER_DAY: f64 = 86_400.0;

/// Result of simulating one trip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TripOutcome {
    /// Inflated travel time of the segments that had a sample.
    pub accumulated_secs: f64,
    /// Number of segments that had a sample.
    pub segments_found: usize,
}

/// Where a segment lookup lands for a given simulated clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPosition {
    pub day: DayCode,
    pub hour: u8,
}

impl ClockPosition {
    /// Position of `clock_secs` seconds after midnight of `start_day`.
    pub fn at(start_day: DayCode, clock_secs: f64) -> Self {
        let day_offset = (clock_secs / SECS_PER_DAY).floor() as u64;
        let hour = ((clock_secs / SECS_PER_HOUR).floor() as u64 % 24) as u8;
        Self {
            day: start_day.advance(day_offset),
            hour,
        }
    }
}

/// Sample for one segment with hour gap-fill.
///
/// Tries the exact hour, then the hour before, then the hour after, all on
/// the same day; the first sample found wins.
pub fn gap_filled_sample<C: TimingCorpus + ?Sized>(
    store: &mut SegmentStore<'_, C>,
    at: ClockPosition,
    origin: &StopId,
    dest: &StopId,
) -> Option<f64> {
    let hour = at.hour;
    [hour, (hour + 23) % 24, (hour + 1) % 24]
        .into_iter()
        .find_map(|h| store.lookup(at.day, h, origin, dest))
}

/// Simulate a trip over segments `range` (segment `i` joins stops `i` and
/// `i + 1`) departing `day` at `start_hour`:00.
///
/// Found samples are multiplied by `traffic_factor` before being added to
/// both the total and the clock. Segments with no sample add nothing and
/// leave the clock where it is. A range reaching past the last stop
/// simulates nothing.
pub fn simulate_trip<C: TimingCorpus + ?Sized>(
    stops: &[StopId],
    range: Range<usize>,
    day: DayCode,
    start_hour: u8,
    store: &mut SegmentStore<'_, C>,
    traffic_factor: f64,
) -> TripOutcome {
    let mut outcome = TripOutcome::default();
    let Some(path) = stops.get(range.start..range.end.saturating_add(1)) else {
        return outcome;
    };

    let mut clock = f64::from(start_hour) * SECS_PER_HOUR;
    for pair in path.windows(2) {
        let (origin, dest) = (&pair[0], &pair[1]);
        let at = ClockPosition::at(day, clock);

        let Some(raw) = gap_filled_sample(store, at, origin, dest) else {
            trace!(%origin, %dest, day = %at.day, hour = at.hour, "no sample for segment");
            continue;
        };

        let secs = raw * traffic_factor;
        outcome.accumulated_secs += secs;
        outcome.segments_found += 1;
        clock += secs;
    }

    outcome
}

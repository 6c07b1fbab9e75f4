//! Hourly estimation across a whole week.

use std::ops::Range;

use tracing::debug;

use crate::domain::{DayCode, StopId};
use crate::routedb::FrequencyTable;

use super::calendar::{HOURS_PER_DAY, valid_hours};
use super::config::EstimateConfig;
use super::matrix::EstimationMatrix;
use super::simulate::{TripOutcome, simulate_trip};
use super::store::{SegmentStore, TimingCorpus};

/// Runs trip simulations for every day and start hour of a stop range.
pub struct Estimator<'a, C: ?Sized> {
    corpus: &'a C,
    config: &'a EstimateConfig,
}

impl<'a, C: TimingCorpus + ?Sized> Estimator<'a, C> {
    pub fn new(corpus: &'a C, config: &'a EstimateConfig) -> Self {
        Self { corpus, config }
    }

    /// Estimate travel minutes from stop `start` to stop `end` of `stops`
    /// for each day and start hour.
    ///
    /// `end` defaults to the last stop. Indices are clamped to the stop
    /// list; an empty range yields an all-absent matrix. Hours outside the
    /// service window of `frequency` are absent.
    pub fn estimate(
        &self,
        stops: &[StopId],
        start: i64,
        end: Option<i64>,
        frequency: Option<&FrequencyTable>,
    ) -> EstimationMatrix {
        let mut matrix = EstimationMatrix::absent();
        let Some(range) = clamp_range(stops.len(), start, end) else {
            debug!(stops = stops.len(), start, ?end, "empty stop range");
            return matrix;
        };

        let total = range.len();
        // partitions are shared across days and hours, dropped with this call
        let mut store = SegmentStore::new(self.corpus);

        for day in DayCode::ALL {
            let hours = valid_hours(frequency, day, self.config.service_buffer_mins);
            debug!(%day, service_hours = hours.len(), "estimating day");

            for hour in (0..HOURS_PER_DAY).filter(|h| hours.contains(*h)) {
                let outcome = simulate_trip(
                    stops,
                    range.clone(),
                    day,
                    hour,
                    &mut store,
                    self.config.traffic_factor,
                );
                matrix.set(
                    day,
                    hour,
                    scale_estimate(outcome, total, self.config.min_coverage),
                );
            }
        }

        debug!(
            segments = total,
            partitions = store.partitions_read(),
            estimates = matrix.present_count(),
            "estimation complete"
        );
        matrix
    }
}

/// Clamp a requested stop range to a list of `len` stops.
///
/// Returns the segment range `start..end`, or `None` if it is empty.
pub fn clamp_range(len: usize, start: i64, end: Option<i64>) -> Option<Range<usize>> {
    let last = i64::try_from(len).unwrap_or(i64::MAX) - 1;
    let start = start.max(0);
    let end = end.unwrap_or(last).min(last);
    if start >= end {
        return None;
    }
    Some(start as usize..end as usize)
}

/// Extrapolate a trip outcome to the full `total` segments, in minutes.
///
/// The average of the found segments stands in for the missing ones.
/// Returns `None` when fewer than `min_coverage` of the segments were found,
/// or none were.
pub fn scale_estimate(outcome: TripOutcome, total: usize, min_coverage: f64) -> Option<f64> {
    let found = outcome.segments_found;
    if total > 0 && (found as f64) < total as f64 * min_coverage {
        return None;
    }
    if found == 0 {
        return None;
    }

    let secs = outcome.accumulated_secs / found as f64 * total as f64;
    Some(round_to_hundredths(secs / 60.0))
}

/// Halves round away from zero: 0.125 becomes 0.13.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range_cases() {
        assert_eq!(clamp_range(5, 0, None), Some(0..4));
        assert_eq!(clamp_range(5, -3, Some(2)), Some(0..2));
        assert_eq!(clamp_range(5, 1, Some(99)), Some(1..4));
        assert_eq!(clamp_range(5, 3, Some(3)), None);
        assert_eq!(clamp_range(5, 4, Some(2)), None);
        assert_eq!(clamp_range(5, 4, None), None);
        assert_eq!(clamp_range(5, 0, Some(-1)), None);
        assert_eq!(clamp_range(1, 0, None), None);
        assert_eq!(clamp_range(0, 0, None), None);
    }

    #[test]
    fn scaling_extrapolates_missing_segments() {
        let outcome = TripOutcome {
            accumulated_secs: 800.0,
            segments_found: 8,
        };
        assert_eq!(scale_estimate(outcome, 10, 0.5), Some(16.67));
    }

    #[test]
    fn complete_coverage_is_not_scaled() {
        let outcome = TripOutcome {
            accumulated_secs: 1320.0,
            segments_found: 2,
        };
        assert_eq!(scale_estimate(outcome, 2, 0.5), Some(22.0));
    }

    #[test]
    fn too_little_coverage_is_absent() {
        let outcome = TripOutcome {
            accumulated_secs: 100_000.0,
            segments_found: 4,
        };
        assert_eq!(scale_estimate(outcome, 10, 0.5), None);
    }

    #[test]
    fn exactly_half_coverage_is_enough() {
        let outcome = TripOutcome {
            accumulated_secs: 300.0,
            segments_found: 5,
        };
        assert_eq!(scale_estimate(outcome, 10, 0.5), Some(10.0));
    }

    #[test]
    fn halves_round_away_from_zero() {
        // 7.5s is exactly 0.125 minutes
        let outcome = TripOutcome {
            accumulated_secs: 7.5,
            segments_found: 1,
        };
        assert_eq!(scale_estimate(outcome, 1, 0.5), Some(0.13));
        assert_eq!(round_to_hundredths(0.375), 0.38);
    }

    #[test]
    fn nothing_found_is_absent() {
        assert_eq!(scale_estimate(TripOutcome::default(), 1, 0.0), None);
        assert_eq!(scale_estimate(TripOutcome::default(), 0, 0.5), None);
    }
}

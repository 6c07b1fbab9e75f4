//! Travel-time estimation from the historical timing corpus.
//!
//! For every day of the week and start hour, a virtual trip is walked
//! over the requested stop range, looking up each segment's historical
//! time in the hour the bus would reach it. Hours where the route does
//! not run, or where too few segments have data, are left absent.

mod calendar;
mod config;
mod engine;
mod matrix;
mod simulate;
mod store;

#[cfg(test)]
mod testing;

pub use calendar::{HOURS_PER_DAY, HourSet, valid_hours};
pub use config::EstimateConfig;
pub use engine::{Estimator, clamp_range, scale_estimate};
pub use matrix::{DayEstimates, EstimationMatrix};
pub use simulate::{ClockPosition, TripOutcome, simulate_trip};
pub use store::{FileCorpus, Partition, SegmentStore, TimingCorpus, parse_partition};

//! Domain types for the route time estimator.
//!
//! Small validated value types shared by the route database, the
//! resolver and the estimation engine.

mod day;
mod hhmm;
mod stop;

pub use day::{DayCode, InvalidDayCode};
pub use hhmm::{Hhmm, InvalidHhmm};
pub use stop::{PARTITION_PREFIX_LEN, StopId};

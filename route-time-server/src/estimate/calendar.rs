//! Service window resolution from a route's frequency table.

use std::fmt;

use crate::domain::DayCode;
use crate::routedb::FrequencyTable;

pub const HOURS_PER_DAY: u8 = 24;

const MINS_PER_DAY: u32 = 24 * 60;

/// A set of hours of the day, 0..=23.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct HourSet(u32);

impl HourSet {
    pub fn empty() -> Self {
        HourSet(0)
    }

    pub fn all() -> Self {
        HourSet((1 << HOURS_PER_DAY) - 1)
    }

    /// Add an hour. Values of 24 and above are ignored.
    pub fn insert(&mut self, hour: u8) {
        if hour < HOURS_PER_DAY {
            self.0 |= 1 << hour;
        }
    }

    pub fn contains(&self, hour: u8) -> bool {
        hour < HOURS_PER_DAY && self.0 & (1 << hour) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..HOURS_PER_DAY).filter(|h| self.contains(*h))
    }
}

impl fmt::Debug for HourSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Hours of `day` at which the route is in service.
///
/// With no table, or an empty one, every hour is valid. Otherwise each
/// bitmask entry that covers `day` contributes the hours whose start falls
/// between its first departure and its last window end plus
/// `buffer_mins`, checked both on the day itself and shifted by a day so
/// that window ends past 2400 admit the early hours.
pub fn valid_hours(table: Option<&FrequencyTable>, day: DayCode, buffer_mins: u32) -> HourSet {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        return HourSet::all();
    };

    let target = day.bitmask();
    let mut hours = HourSet::empty();

    for period in table.periods() {
        if period.mask & target == 0 {
            continue;
        }

        let window = period.first_start.minutes()..=period.last_end.minutes() + buffer_mins;
        for hour in 0..HOURS_PER_DAY {
            let same_day = u32::from(hour) * 60;
            let next_day = same_day + MINS_PER_DAY;
            if window.contains(&same_day) || window.contains(&next_day) {
                hours.insert(hour);
            }
        }
    }

    hours
}

//! The day × hour estimate matrix.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::DayCode;

use super::calendar::HOURS_PER_DAY;

/// Estimated minutes per start hour for one day.
pub type DayEstimates = [Option<f64>; HOURS_PER_DAY as usize];

/// Estimated travel minutes for each (day, start hour).
///
/// `None` means no service at that hour or too little data to estimate.
/// Serializes as a map from day code (`"0"` = Sunday) to 24 values.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationMatrix {
    days: [DayEstimates; 7],
}

impl EstimationMatrix {
    /// A matrix with every cell absent.
    pub fn absent() -> Self {
        Self {
            days: [[None; HOURS_PER_DAY as usize]; 7],
        }
    }

    pub fn get(&self, day: DayCode, hour: u8) -> Option<f64> {
        self.days[day.index()]
            .get(usize::from(hour))
            .copied()
            .flatten()
    }

    /// Set one cell. Hours of 24 and above are ignored.
    pub fn set(&mut self, day: DayCode, hour: u8, minutes: Option<f64>) {
        if let Some(cell) = self.days[day.index()].get_mut(usize::from(hour)) {
            *cell = minutes;
        }
    }

    pub fn day(&self, day: DayCode) -> &DayEstimates {
        &self.days[day.index()]
    }

    /// Number of cells holding an estimate.
    pub fn present_count(&self) -> usize {
        self.days.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_all_absent(&self) -> bool {
        self.present_count() == 0
    }
}

impl Default for EstimationMatrix {
    fn default() -> Self {
        Self::absent()
    }
}

impl Serialize for EstimationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DayCode::ALL.len()))?;
        for day in DayCode::ALL {
            map.serialize_entry(day.code(), &self.days[day.index()])?;
        }
        map.end()
    }
}

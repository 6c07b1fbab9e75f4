//! Day-of-week codes.

use std::fmt;

/// Error returned when parsing an invalid day code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid day code: {0:?}")]
pub struct InvalidDayCode(String);

/// A day of the week, as used to partition the timing corpus.
///
/// Codes run from `"0"` (Sunday) to `"6"` (Saturday). Each day maps to
/// exactly one bit of the published frequency-table calendar mask.
///
/// # Examples
///
/// ```
/// use route_time_server::domain::DayCode;
///
/// let sat = DayCode::parse("6").unwrap();
/// assert_eq!(sat, DayCode::Saturday);
/// assert_eq!(sat.next(), DayCode::Sunday);
/// assert_eq!(DayCode::Monday.bitmask(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayCode {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayCode {
    /// All days, in code order (Sunday first).
    pub const ALL: [DayCode; 7] = [
        DayCode::Sunday,
        DayCode::Monday,
        DayCode::Tuesday,
        DayCode::Wednesday,
        DayCode::Thursday,
        DayCode::Friday,
        DayCode::Saturday,
    ];

    /// Parse a single-digit day code (`"0"`..`"6"`).
    pub fn parse(s: &str) -> Result<Self, InvalidDayCode> {
        s.parse::<u8>()
            .ok()
            .and_then(Self::from_index)
            .ok_or_else(|| InvalidDayCode(s.to_string()))
    }

    /// Day for a numeric index, Sunday = 0.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Numeric index, Sunday = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The code used in corpus paths and serialized matrices.
    pub fn code(self) -> &'static str {
        match self {
            DayCode::Sunday => "0",
            DayCode::Monday => "1",
            DayCode::Tuesday => "2",
            DayCode::Wednesday => "3",
            DayCode::Thursday => "4",
            DayCode::Friday => "5",
            DayCode::Saturday => "6",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DayCode::Sunday => "Sunday",
            DayCode::Monday => "Monday",
            DayCode::Tuesday => "Tuesday",
            DayCode::Wednesday => "Wednesday",
            DayCode::Thursday => "Thursday",
            DayCode::Friday => "Friday",
            DayCode::Saturday => "Saturday",
        }
    }

    /// Calendar bit of this day in a frequency-table mask.
    ///
    /// Monday is bit 0 through Saturday at bit 5; Sunday is bit 6.
    pub fn bitmask(self) -> u32 {
        match self {
            DayCode::Sunday => 64,
            DayCode::Monday => 1,
            DayCode::Tuesday => 2,
            DayCode::Wednesday => 4,
            DayCode::Thursday => 8,
            DayCode::Friday => 16,
            DayCode::Saturday => 32,
        }
    }

    /// The day `days` days after this one, wrapping after Saturday.
    pub fn advance(self, days: u64) -> Self {
        let index = (self.index() as u64 + days % 7) % 7;
        Self::ALL[index as usize]
    }

    pub fn next(self) -> Self {
        self.advance(1)
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

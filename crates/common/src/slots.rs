//! The half-hour booking grid and the availability rules applied to it.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::{BookingInterval, ValidationError};

pub const SLOT_STEP_MINUTES: u16 = 30;
pub const SLOTS_PER_DAY: u16 = 48;

/// A point on the daily grid, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(pub u16);

impl Slot {
    /// Parse an `HH:MM` string. Returns `None` for anything off the clock.
    pub fn parse(text: &str) -> Option<Slot> {
        let (hour, minute) = text.split_once(':')?;
        let hour: u16 = hour.trim().parse().ok()?;
        let minute: u16 = minute.trim().parse().ok()?;
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Slot(hour * 60 + minute))
    }

    /// 24-hour `HH:MM` form, the shape the backend expects in requests.
    pub fn to_hhmm(self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }

    /// 12-hour form for display, e.g. `9:30 AM`.
    pub fn to_12h(self) -> String {
        let hour = self.0 / 60;
        let minute = self.0 % 60;
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour}:{minute:02} {suffix}")
    }
}

/// The 48 half-hour slots of a day, 00:00 through 23:30. Calling this again
/// restarts the sequence from the top.
pub fn grid() -> impl Iterator<Item = Slot> {
    (0..SLOTS_PER_DAY).map(|i| Slot(i * SLOT_STEP_MINUTES))
}

/// Slots that cannot begin a new booking: a start may not fall inside
/// `[start, end)` of any existing interval. A booking may begin exactly where
/// a previous one ends.
pub fn disabled_starts(
    grid: impl IntoIterator<Item = Slot>,
    bookings: &[BookingInterval],
) -> BTreeSet<Slot> {
    grid.into_iter()
        .filter(|slot| {
            bookings
                .iter()
                .any(|b| b.start_minute() <= slot.0 && slot.0 < b.end_minute())
        })
        .collect()
}

/// Slots that cannot end a new booking: an end may not fall inside
/// `(start, end]` of any existing interval. A booking may end exactly where
/// a later one begins.
pub fn disabled_ends(
    grid: impl IntoIterator<Item = Slot>,
    bookings: &[BookingInterval],
) -> BTreeSet<Slot> {
    grid.into_iter()
        .filter(|slot| {
            bookings
                .iter()
                .any(|b| b.start_minute() < slot.0 && slot.0 <= b.end_minute())
        })
        .collect()
}

/// Combine a `YYYY-MM-DD` date and `HH:MM` time the way the booking form
/// does. A pair that does not form a datetime cannot form a valid interval.
pub fn parse_datetime(date: &str, time: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(&format!("{date}T{time}"), "%Y-%m-%dT%H:%M")
        .map_err(|_| ValidationError::InvalidInterval)
}

/// A booking must end strictly after it starts.
pub fn validate_interval(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::InvalidInterval);
    }
    Ok(())
}

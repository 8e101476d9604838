//! Clock and alarm register codec.
//!
//! The hardware RTC keeps the calendar in two packed 32-bit registers (date
//! and time) of binary-coded-decimal nibbles, and takes its one-shot alarm
//! in a third register with a related but distinct layout. [`DateTime`] is
//! the canonical in-memory form; this module converts losslessly in both
//! directions and derives alarm registers for future wake-ups.

pub mod calendar;
mod codec;
mod fields;

pub use codec::{AlarmTarget, decode, decode_alarm, encode, encode_alarm};

/// Day of the week, 1-based the way the hardware stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    /// Hardware index, 1 (Monday) through 7 (Sunday).
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Weekday from the hardware index.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            7 => Some(Self::Sunday),
            _ => None,
        }
    }

    /// The day after this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Monday => Self::Tuesday,
            Self::Tuesday => Self::Wednesday,
            Self::Wednesday => Self::Thursday,
            Self::Thursday => Self::Friday,
            Self::Friday => Self::Saturday,
            Self::Saturday => Self::Sunday,
            Self::Sunday => Self::Monday,
        }
    }
}

/// Calendar date with a two-digit year (2000-2099 window).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    /// Year within the century, 0-99.
    pub year: u8,
    /// Month, 1-12.
    pub month: u8,
    /// Day of the month, 1-31.
    pub day: u8,
    pub weekday: Weekday,
}

/// Time of day, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
}

/// Canonical structured calendar/time value.
///
/// Fields are not validated; it is the caller's job to keep them within the
/// encodable ranges above. Out-of-range values silently corrupt neighbouring
/// register fields when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub date: CalendarDate,
    pub time: ClockTime,
}

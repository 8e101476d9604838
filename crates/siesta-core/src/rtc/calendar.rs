//! Calendar arithmetic for wake-time derivation and clock sync.
//!
//! The codec treats the calendar as opaque digits; rollover knowledge lives
//! here. Years are two-digit within the 2000-2099 window, so the leap rule
//! is plain divisibility by four.

use super::{CalendarDate, ClockTime, DateTime, Weekday};

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Seconds between the SNTP epoch (1900-01-01) and 2000-01-01.
const SNTP_CENTURY_OFFSET: u32 = 3_155_673_600;

/// 2000-01-01 was a Saturday.
const CENTURY_START_WEEKDAY: Weekday = Weekday::Saturday;

fn is_leap_year(year: u8) -> bool {
    year % 4 == 0
}

fn days_in_month(year: u8, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn next_day(date: CalendarDate) -> CalendarDate {
    let mut date = CalendarDate {
        weekday: date.weekday.next(),
        day: date.day + 1,
        ..date
    };
    if date.day > days_in_month(date.year, date.month) {
        date.day = 1;
        date.month += 1;
        if date.month > 12 {
            date.month = 1;
            // Wraps at the end of the century, like the hardware register.
            date.year = (date.year + 1) % 100;
        }
    }
    date
}

/// Move `value` forward by `seconds`, rolling over through minutes, hours,
/// days, months, years and the weekday.
pub fn advance(value: DateTime, seconds: u32) -> DateTime {
    let second_of_day = u32::from(value.time.hour) * SECONDS_PER_HOUR
        + u32::from(value.time.minute) * SECONDS_PER_MINUTE
        + u32::from(value.time.second);

    let total = u64::from(second_of_day) + u64::from(seconds);
    let mut days = total / u64::from(SECONDS_PER_DAY);
    let remainder = (total % u64::from(SECONDS_PER_DAY)) as u32;

    let mut date = value.date;
    while days > 0 {
        date = next_day(date);
        days -= 1;
    }

    DateTime {
        date,
        time: ClockTime {
            hour: (remainder / SECONDS_PER_HOUR) as u8,
            minute: (remainder % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
            second: (remainder % SECONDS_PER_MINUTE) as u8,
        },
    }
}

/// Convert an SNTP timestamp (seconds since 1900-01-01) into a [`DateTime`].
///
/// Returns `None` for timestamps before 2000, which the two-digit year
/// cannot represent.
pub fn from_sntp(sntp_seconds: u32) -> Option<DateTime> {
    let seconds = sntp_seconds.checked_sub(SNTP_CENTURY_OFFSET)?;

    let century_start = DateTime {
        date: CalendarDate {
            year: 0,
            month: 1,
            day: 1,
            weekday: CENTURY_START_WEEKDAY,
        },
        time: ClockTime {
            hour: 0,
            minute: 0,
            second: 0,
        },
    };
    Some(advance(century_start, seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: u8, month: u8, day: u8, weekday: Weekday, hms: (u8, u8, u8)) -> DateTime {
        DateTime {
            date: CalendarDate {
                year,
                month,
                day,
                weekday,
            },
            time: ClockTime {
                hour: hms.0,
                minute: hms.1,
                second: hms.2,
            },
        }
    }

    #[test]
    fn zero_seconds_is_identity() {
        let t = at(14, 2, 17, Weekday::Monday, (20, 23, 0));
        assert_eq!(advance(t, 0), t);
    }

    #[test]
    fn minute_rollover() {
        let t = at(14, 2, 17, Weekday::Monday, (20, 23, 30));
        assert_eq!(advance(t, 60), at(14, 2, 17, Weekday::Monday, (20, 24, 30)));
        assert_eq!(advance(t, 31), at(14, 2, 17, Weekday::Monday, (20, 24, 1)));
    }

    #[test]
    fn midnight_rollover_advances_weekday() {
        let t = at(14, 2, 17, Weekday::Monday, (23, 59, 50));
        assert_eq!(advance(t, 10), at(14, 2, 18, Weekday::Tuesday, (0, 0, 0)));
    }

    #[test]
    fn month_rollover() {
        let t = at(14, 2, 28, Weekday::Friday, (23, 59, 59));
        // 2014 is not a leap year, so February has 28 days.
        assert_eq!(advance(t, 1), at(14, 3, 1, Weekday::Saturday, (0, 0, 0)));
    }

    #[test]
    fn leap_day_is_observed() {
        let t = at(16, 2, 28, Weekday::Sunday, (23, 59, 59));
        assert_eq!(advance(t, 1), at(16, 2, 29, Weekday::Monday, (0, 0, 0)));
        assert_eq!(
            advance(t, 1 + SECONDS_PER_DAY),
            at(16, 3, 1, Weekday::Tuesday, (0, 0, 0))
        );
    }

    #[test]
    fn year_rollover() {
        let t = at(14, 12, 31, Weekday::Wednesday, (23, 59, 0));
        assert_eq!(advance(t, 60), at(15, 1, 1, Weekday::Thursday, (0, 0, 0)));
    }

    #[test]
    fn multi_day_advance() {
        let t = at(14, 2, 17, Weekday::Monday, (12, 0, 0));
        assert_eq!(
            advance(t, 7 * SECONDS_PER_DAY + 90),
            at(14, 2, 24, Weekday::Monday, (12, 1, 30))
        );
    }

    #[test]
    fn sntp_century_start() {
        assert_eq!(
            from_sntp(3_155_673_600),
            Some(at(0, 1, 1, Weekday::Saturday, (0, 0, 0)))
        );
    }

    #[test]
    fn sntp_known_timestamp() {
        // 2014-02-17 20:23:00 UTC, a Monday.
        // Unix 1392668580 + 2208988800 = 3601657380.
        assert_eq!(
            from_sntp(3_601_657_380),
            Some(at(14, 2, 17, Weekday::Monday, (20, 23, 0)))
        );
    }

    #[test]
    fn sntp_before_century_is_rejected() {
        assert_eq!(from_sntp(3_155_673_599), None);
        assert_eq!(from_sntp(0), None);
    }
}

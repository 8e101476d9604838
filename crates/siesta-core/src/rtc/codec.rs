//! Packed-register encode/decode.

use super::fields::{alarm_reg, date_reg, time_reg};
use super::{CalendarDate, ClockTime, DateTime, Weekday};

/// Pack a [`DateTime`] into the `(date, time)` register pair.
///
/// No range checking is performed: a field beyond its decimal range bleeds
/// into neighbouring bits exactly as it would on the hardware.
pub fn encode(value: &DateTime) -> (u32, u32) {
    let mut date = 0;
    date = date_reg::YEAR.insert(date, value.date.year);
    date = date_reg::WEEKDAY.insert(date, value.date.weekday.index() as u32);
    date = date_reg::MONTH.insert(date, value.date.month);
    date = date_reg::DAY.insert(date, value.date.day);

    let mut time = 0;
    time = time_reg::HOUR.insert(time, value.time.hour);
    time = time_reg::MINUTE.insert(time, value.time.minute);
    time = time_reg::SECOND.insert(time, value.time.second);

    (date, time)
}

/// Unpack the `(date, time)` register pair.
pub fn decode(date: u32, time: u32) -> DateTime {
    // The hardware only ever presents 1-7 here once the clock has been set;
    // an unset register reads as Monday.
    let weekday =
        Weekday::from_index(date_reg::WEEKDAY.extract(date) as u8).unwrap_or(Weekday::Monday);

    DateTime {
        date: CalendarDate {
            year: date_reg::YEAR.extract(date),
            month: date_reg::MONTH.extract(date),
            day: date_reg::DAY.extract(date),
            weekday,
        },
        time: ClockTime {
            hour: time_reg::HOUR.extract(time),
            minute: time_reg::MINUTE.extract(time),
            second: time_reg::SECOND.extract(time),
        },
    }
}

/// Pack an already-resolved future date/time into the alarm register.
///
/// The alarm layout is not the time-register layout: the day of the month
/// rides along in the top byte and the year and month do not exist at all.
/// All match-enable bits are left zero so the alarm fires on one exact
/// date/time.
pub fn encode_alarm(target: &DateTime) -> u32 {
    let mut alarm = 0;
    alarm = alarm_reg::DAY.insert(alarm, target.date.day);
    alarm = alarm_reg::HOUR.insert(alarm, target.time.hour);
    alarm = alarm_reg::MINUTE.insert(alarm, target.time.minute);
    alarm = alarm_reg::SECOND.insert(alarm, target.time.second);
    alarm
}

/// The fields an alarm register actually carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTarget {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Unpack an alarm register, for verification and scheduling math.
pub fn decode_alarm(alarm: u32) -> AlarmTarget {
    AlarmTarget {
        day: alarm_reg::DAY.extract(alarm),
        hour: alarm_reg::HOUR.extract(alarm),
        minute: alarm_reg::MINUTE.extract(alarm),
        second: alarm_reg::SECOND.extract(alarm),
    }
}

impl AlarmTarget {
    /// True if `moment` lines up with this alarm.
    pub fn matches(&self, moment: &DateTime) -> bool {
        self.day == moment.date.day
            && self.hour == moment.time.hour
            && self.minute == moment.time.minute
            && self.second == moment.time.second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DateTime {
        DateTime {
            date: CalendarDate {
                year: 14,
                month: 2,
                day: 17,
                weekday: Weekday::Monday,
            },
            time: ClockTime {
                hour: 20,
                minute: 23,
                second: 0,
            },
        }
    }

    #[test]
    fn known_value_packs_to_expected_nibbles() {
        let (date, time) = encode(&sample());

        // 2014-02-17, Monday.
        assert_eq!((date >> 20) & 0xF, 1, "year tens");
        assert_eq!((date >> 16) & 0xF, 4, "year units");
        assert_eq!((date >> 13) & 0x7, 1, "weekday");
        assert_eq!((date >> 12) & 0x1, 0, "month tens");
        assert_eq!((date >> 8) & 0xF, 2, "month units");
        assert_eq!((date >> 4) & 0x3, 1, "day tens");
        assert_eq!(date & 0xF, 7, "day units");

        // 20:23:00.
        assert_eq!((time >> 20) & 0x3, 2, "hour tens");
        assert_eq!((time >> 16) & 0xF, 0, "hour units");
        assert_eq!((time >> 12) & 0x7, 2, "minute tens");
        assert_eq!((time >> 8) & 0xF, 3, "minute units");
        assert_eq!((time >> 4) & 0x7, 0, "second tens");
        assert_eq!(time & 0xF, 0, "second units");
    }

    #[test]
    fn known_value_round_trips() {
        let value = sample();
        let (date, time) = encode(&value);
        assert_eq!(decode(date, time), value);
    }

    #[test]
    fn round_trip_over_field_extremes() {
        let years = [0u8, 9, 10, 14, 59, 99];
        let months = [1u8, 9, 10, 12];
        let days = [1u8, 9, 10, 28, 31];
        let hours = [0u8, 9, 10, 19, 20, 23];
        let minsec = [0u8, 9, 10, 39, 40, 59];

        for &year in &years {
            for &month in &months {
                for &day in &days {
                    for &hour in &hours {
                        for &ms in &minsec {
                            let value = DateTime {
                                date: CalendarDate {
                                    year,
                                    month,
                                    day,
                                    weekday: Weekday::Sunday,
                                },
                                time: ClockTime {
                                    hour,
                                    minute: ms,
                                    second: ms,
                                },
                            };
                            let (date, time) = encode(&value);
                            assert_eq!(decode(date, time), value, "{value:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn every_weekday_round_trips() {
        for index in 1..=7 {
            let weekday = Weekday::from_index(index).unwrap();
            let mut value = sample();
            value.date.weekday = weekday;
            let (date, time) = encode(&value);
            assert_eq!(decode(date, time).date.weekday, weekday);
        }
    }

    #[test]
    fn alarm_layout_differs_from_time_register() {
        let value = sample();
        let (_, time) = encode(&value);
        let alarm = encode_alarm(&value);

        // Day of the month lives in the alarm's top byte and nowhere in the
        // time register.
        assert_ne!(alarm, time);
        assert_eq!((alarm >> 28) & 0x3, 1, "day tens");
        assert_eq!((alarm >> 24) & 0xF, 7, "day units");
    }

    #[test]
    fn alarm_match_enable_bits_stay_zero() {
        let alarm = encode_alarm(&sample());
        for bit in [31, 30, 23, 15, 7] {
            assert_eq!(alarm >> bit & 1, 0, "bit {bit}");
        }
    }

    #[test]
    fn alarm_round_trips_and_matches_target() {
        let value = sample();
        let target = decode_alarm(encode_alarm(&value));
        assert_eq!(
            target,
            AlarmTarget {
                day: 17,
                hour: 20,
                minute: 23,
                second: 0
            }
        );
        assert!(target.matches(&value));
    }
}

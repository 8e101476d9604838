//! Wake scheduling state machine.
//!
//! The device-level cycle is RUNNING → SCHEDULING_WAKE → STANDBY, then a
//! hardware reset when the alarm fires brings it back to RUNNING. Standby is
//! never terminal: the alarm programmed here guarantees a future reset.
//!
//! Entering standby powers down everything that could observe a return
//! value, so the suspend itself is expressed as a [`Standby`] command handed
//! back to the outer driver. The firmware consumes it with the real
//! deep-sleep register sequence (which never returns); the simulator and the
//! tests consume it by advancing a fake clock. That keeps the whole
//! transition observable without hardware.

use log::info;

use crate::rtc::{self, DateTime, calendar};

/// Where the device currently is in its power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    SchedulingWake,
    Standby,
}

/// Proof that a one-shot wake alarm has been programmed.
///
/// Consuming this is the transition into standby. It must not be dropped on
/// the floor: a driver that schedules a wake and then keeps running would
/// get reset mid-flight when the alarm fires.
#[must_use = "a programmed wake alarm must be followed into standby"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standby {
    /// The moment the device will wake back up.
    pub target: DateTime,
    /// The alarm register as programmed.
    pub alarm: u32,
}

/// Access to the hardware clock, injected so the scheduler is testable.
///
/// Values cross this seam in packed register form; the codec owns all
/// structure.
pub trait WallClock {
    /// Current `(date, time)` register pair. Reads cannot fail.
    fn now(&self) -> (u32, u32);

    /// Set the calendar, for boot-time sync.
    fn set(&mut self, date: u32, time: u32);

    /// Program the one-shot alarm register.
    fn set_alarm(&mut self, alarm: u32);
}

/// Read the clock as a structured value.
pub fn current_datetime<C: WallClock>(clock: &C) -> DateTime {
    let (date, time) = clock.now();
    rtc::decode(date, time)
}

/// Write a structured value to the clock.
pub fn store_datetime<C: WallClock>(clock: &mut C, value: &DateTime) {
    let (date, time) = rtc::encode(value);
    clock.set(date, time);
}

/// Device power-cycle state machine.
#[derive(Debug)]
pub struct WakeCycle {
    phase: Phase,
}

impl Default for WakeCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeCycle {
    /// Cold boot starts in RUNNING.
    pub fn new() -> Self {
        Self {
            phase: Phase::Running,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Derive `now + seconds`, program it as the one-shot alarm, and hand
    /// back the standby command.
    pub fn schedule_wake<C: WallClock>(&mut self, clock: &mut C, seconds: u32) -> Standby {
        self.phase = Phase::SchedulingWake;

        let now = current_datetime(clock);
        let target = calendar::advance(now, seconds);
        let alarm = rtc::encode_alarm(&target);
        clock.set_alarm(alarm);

        info!(
            "wake alarm set for {:02}:{:02}:{:02} on day {} ({seconds}s from now)",
            target.time.hour, target.time.minute, target.time.second, target.date.day
        );

        self.phase = Phase::Standby;
        Standby { target, alarm }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtc::{CalendarDate, ClockTime, Weekday, decode_alarm};

    /// Minimal fake clock: remembers what was stored and programmed.
    struct FakeClock {
        registers: (u32, u32),
        alarm: Option<u32>,
    }

    impl FakeClock {
        fn at(value: &DateTime) -> Self {
            Self {
                registers: rtc::encode(value),
                alarm: None,
            }
        }
    }

    impl WallClock for FakeClock {
        fn now(&self) -> (u32, u32) {
            self.registers
        }

        fn set(&mut self, date: u32, time: u32) {
            self.registers = (date, time);
        }

        fn set_alarm(&mut self, alarm: u32) {
            self.alarm = Some(alarm);
        }
    }

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
    fn schedule_wake_programs_alarm_sixty_seconds_out() {
        let now = sample();
        let mut clock = FakeClock::at(&now);
        let mut cycle = WakeCycle::new();
        assert_eq!(cycle.phase(), Phase::Running);

        let standby = cycle.schedule_wake(&mut clock, 60);

        assert_eq!(cycle.phase(), Phase::Standby);
        assert_eq!(standby.target, calendar::advance(now, 60));
        assert_eq!(standby.target.time.minute, 24);

        let programmed = decode_alarm(clock.alarm.expect("alarm programmed"));
        assert!(programmed.matches(&standby.target));
    }

    #[test]
    fn schedule_wake_across_midnight_targets_next_day() {
        let now = DateTime {
            time: ClockTime {
                hour: 23,
                minute: 59,
                second: 30,
            },
            ..sample()
        };
        let mut clock = FakeClock::at(&now);
        let mut cycle = WakeCycle::new();

        let standby = cycle.schedule_wake(&mut clock, 60);

        assert_eq!(standby.target.date.day, 18);
        assert_eq!(decode_alarm(standby.alarm).day, 18);
    }

    #[test]
    fn datetime_store_and_retrieve_round_trip() {
        let value = sample();
        let mut clock = FakeClock::at(&value);

        let read_back = current_datetime(&clock);
        assert_eq!(read_back, value);

        let later = calendar::advance(value, 3600);
        store_datetime(&mut clock, &later);
        assert_eq!(current_datetime(&clock), later);
    }
}

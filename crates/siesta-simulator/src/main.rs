//! Desktop simulator for the siesta-rs wake/sleep cycle.
//!
//! Drives the same core logic the firmware runs — health record store,
//! register codec, wake scheduler — against in-memory doubles, so a full
//! day of sleep cycles plays out in milliseconds on a workstation.
//!
//! Three scenarios run back to back:
//!
//! 1. A run of clean cycles: wake, report, schedule, sleep.
//! 2. A radio hang mid-cycle: the forced shutdown is recorded, reported on
//!    the next wake, and acknowledged once the server accepts it.
//! 3. A torn record (single bit flip while "powered down"): surfaces as a
//!    corrupt status, gets reported, then wiped back to a clean baseline.

use std::convert::Infallible;

use embassy_futures::block_on;
use log::{info, warn};

use siesta_core::persist::{HealthStore, ShutdownStatus, mem::MemStorage};
use siesta_core::rtc::{self, CalendarDate, ClockTime, DateTime, Weekday, calendar};
use siesta_core::telemetry::{
    Reading, ReportSink, SHUTDOWN_ERROR_BODY, SHUTDOWN_ERROR_RESOURCE, is_accepted,
};
use siesta_core::wake::{Standby, WakeCycle, WallClock, current_datetime};

/// Seconds between scheduled wake-ups, matching the firmware default.
const STANDBY_SECS: u32 = 60;

// ---------------------------------------------------------------------------
// Hardware doubles
// ---------------------------------------------------------------------------

/// Register-level clock double: holds the packed date/time pair and the
/// programmed alarm, exactly like the hardware registers would.
struct SimClock {
    registers: (u32, u32),
    alarm: Option<u32>,
}

impl SimClock {
    fn at(value: &DateTime) -> Self {
        Self {
            registers: rtc::encode(value),
            alarm: None,
        }
    }

    /// "Sleep": jump the clock straight to the standby target, as if the
    /// alarm had just fired.
    fn fire_alarm(&mut self, standby: Standby) {
        let programmed = rtc::decode_alarm(self.alarm.take().expect("no alarm programmed"));
        assert!(
            programmed.matches(&standby.target),
            "alarm register disagrees with standby target"
        );
        self.registers = rtc::encode(&standby.target);
    }
}

impl WallClock for SimClock {
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

/// Report sink that logs instead of opening sockets. Accepts everything
/// unless told to play dead.
struct LogSink {
    /// When set, posts "time out": the sink returns no status at all,
    /// standing in for a hung radio.
    hang: bool,
}

impl ReportSink for LogSink {
    type Error = Infallible;

    async fn post(&mut self, resource: &str, body: &str) -> Result<u16, Infallible> {
        if self.hang {
            warn!("POST {resource} <- {body:?} ... no response");
            // A real hang never completes; the simulator's stand-in is a
            // sentinel status the caller treats as a deadline overrun.
            return Ok(0);
        }
        info!("POST {resource} <- {body:?} -> 200");
        Ok(200)
    }
}

// ---------------------------------------------------------------------------
// One wake cycle
// ---------------------------------------------------------------------------

/// Everything the firmware does between the alarm firing and deep sleep.
fn run_cycle(
    health: &mut HealthStore<MemStorage>,
    clock: &mut SimClock,
    sink: &mut LogSink,
) -> Standby {
    let now = current_datetime(clock);
    info!(
        "-- wake at 20{:02}-{:02}-{:02} {:02}:{:02}:{:02}",
        now.date.year, now.date.month, now.date.day, now.time.hour, now.time.minute,
        now.time.second
    );

    match health.last_shutdown_status() {
        ShutdownStatus::Clean => info!("last shutdown was OK"),
        status @ (ShutdownStatus::Unclean | ShutdownStatus::Corrupt) => {
            warn!("last shutdown was not OK: {status:?}");
            let code = block_on(sink.post(SHUTDOWN_ERROR_RESOURCE, SHUTDOWN_ERROR_BODY))
                .unwrap_or_default();
            if is_accepted(code) {
                let cleared = match status {
                    ShutdownStatus::Corrupt => health.wipe(),
                    _ => health.acknowledge_shutdown_error(),
                };
                cleared.expect("in-memory storage never fails");
            }
        }
    }

    let reading = Reading::Pressure {
        kilopascals: 101.32,
    };
    let code = block_on(sink.post(reading.resource(), reading.body().as_str()))
        .unwrap_or_default();
    if !is_accepted(code) {
        warn!("reading went unanswered, recording forced shutdown");
        health
            .record_unresponsive_shutdown()
            .expect("in-memory storage never fails");
    }

    let mut cycle = WakeCycle::new();
    cycle.schedule_wake(clock, STANDBY_SECS)
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let mut clock = SimClock::at(&DateTime {
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
    });

    let mut health = HealthStore::new(MemStorage::new());
    health.wipe().expect("in-memory storage never fails");

    let mut sink = LogSink { hang: false };

    info!("=== scenario 1: clean cycles ===");
    for _ in 0..3 {
        let standby = run_cycle(&mut health, &mut clock, &mut sink);
        clock.fire_alarm(standby);
    }
    assert_eq!(health.last_shutdown_status(), ShutdownStatus::Clean);

    info!("=== scenario 2: radio hang and recovery ===");
    sink.hang = true;
    let standby = run_cycle(&mut health, &mut clock, &mut sink);
    clock.fire_alarm(standby);
    assert_eq!(health.last_shutdown_status(), ShutdownStatus::Unclean);

    sink.hang = false;
    let before = health.get().unresponsive_shutdowns;
    let standby = run_cycle(&mut health, &mut clock, &mut sink);
    clock.fire_alarm(standby);
    assert_eq!(health.last_shutdown_status(), ShutdownStatus::Clean);
    assert_eq!(
        health.get().unresponsive_shutdowns,
        before,
        "acknowledging must keep the forced-shutdown count"
    );

    info!("=== scenario 3: torn record ===");
    health.storage_mut().flip_bit(1, 7);
    assert_eq!(health.last_shutdown_status(), ShutdownStatus::Corrupt);
    let standby = run_cycle(&mut health, &mut clock, &mut sink);
    clock.fire_alarm(standby);
    assert_eq!(health.last_shutdown_status(), ShutdownStatus::Clean);
    assert_eq!(
        health.get().unresponsive_shutdowns,
        0,
        "a corrupt record is wiped back to the zero baseline"
    );

    let ends = current_datetime(&clock);
    let expected = {
        // 6 cycles of STANDBY_SECS each from the starting instant.
        let start = DateTime {
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
        };
        calendar::advance(start, 6 * STANDBY_SECS)
    };
    assert_eq!(ends, expected);

    info!("simulation complete, clock reads {:02}:{:02}", ends.time.hour, ends.time.minute);
}

//! Wall clock and deep-sleep standby executor.
//!
//! The calendar is kept in the packed register form the core codec defines,
//! parked in RTC fast memory so it rides through deep sleep. While awake,
//! the current time is the stored registers advanced by the monotonic
//! elapsed time since they were written. Just before standby the planned
//! wake target is written back, so the clock reads correctly the moment the
//! chip resets out of sleep.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embassy_time::Instant;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use log::info;
use siesta_core::rtc::{self, DateTime, calendar};
use siesta_core::wake::{Standby, WallClock, store_datetime};

/// Years below this are implausible and mean the clock was never set since
/// the last cold power-on.
const PLAUSIBLE_YEAR: u8 = 14;

const CLOCK_MAGIC: u32 = 0x51E5_7A0C;

/// Packed clock state persisted across deep sleep.
#[repr(C)]
struct ClockState {
    magic: u32,
    date: u32,
    time: u32,
    alarm: u32,
}

#[esp_hal::ram(unstable(rtc_fast))]
static mut CLOCK_STATE: ClockState = ClockState {
    magic: 0,
    date: 0,
    time: 0,
    alarm: 0,
};

static CLOCK_TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the persisted clock.
pub struct SystemClock {
    /// Monotonic instant at which the stored registers were last written.
    anchor: Instant,
}

impl SystemClock {
    /// Take the clock. Returns `None` if already taken.
    pub fn take() -> Option<Self> {
        CLOCK_TAKEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                anchor: Instant::now(),
            })
    }

    fn state(&self) -> &ClockState {
        // SAFETY: exclusive handle; writes only happen through `&mut self`.
        unsafe { &*(&raw const CLOCK_STATE) }
    }

    fn state_mut(&mut self) -> &mut ClockState {
        // SAFETY: exclusive handle.
        unsafe { &mut *(&raw mut CLOCK_STATE) }
    }

    /// True if the calendar has to be fetched over SNTP before readings can
    /// be timestamped or alarms derived.
    pub fn needs_sync(&self) -> bool {
        if self.state().magic != CLOCK_MAGIC {
            return true;
        }
        let now = rtc::decode(self.state().date, self.state().time);
        now.date.year < PLAUSIBLE_YEAR
    }

    fn elapsed_seconds(&self) -> u32 {
        self.anchor.elapsed().as_secs() as u32
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> (u32, u32) {
        let stored = rtc::decode(self.state().date, self.state().time);
        let current = calendar::advance(stored, self.elapsed_seconds());
        rtc::encode(&current)
    }

    fn set(&mut self, date: u32, time: u32) {
        self.anchor = Instant::now();
        let state = self.state_mut();
        state.magic = CLOCK_MAGIC;
        state.date = date;
        state.time = time;
    }

    fn set_alarm(&mut self, alarm: u32) {
        self.state_mut().alarm = alarm;
    }
}

/// Consume the standby command: persist the wake target as the clock value
/// the chip will boot with, then drop into deep sleep until the timer wake
/// source fires. Only the RTC domain stays powered; execution resumes at the
/// reset vector.
pub fn enter_standby(
    clock: &mut SystemClock,
    rtc: &mut Rtc<'_>,
    standby: Standby,
    seconds: u32,
) -> ! {
    info!("entering standby for {seconds}s");
    store_datetime(clock, &standby.target);

    let timer = TimerWakeupSource::new(Duration::from_secs(u64::from(seconds)));
    rtc.sleep_deep(&[&timer])
}

/// Restore the planned wake target after reset, if one was recorded.
pub fn wake_target(clock: &SystemClock) -> Option<DateTime> {
    if clock.state().magic != CLOCK_MAGIC || clock.state().alarm == 0 {
        return None;
    }
    let now = rtc::decode(clock.state().date, clock.state().time);
    rtc::decode_alarm(clock.state().alarm)
        .matches(&now)
        .then_some(now)
}

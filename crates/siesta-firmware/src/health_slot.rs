//! Shutdown-health record slot in RTC fast memory.
//!
//! RTC fast memory keeps its contents through deep sleep and software
//! resets, which is exactly the window the health record has to survive. A
//! cold power-on leaves the region holding garbage; the record's checksum
//! catches that and the boot flow re-establishes the baseline with a wipe.

use core::sync::atomic::{AtomicBool, Ordering};

use siesta_core::persist::{NonVolatileStorage, PersistError, RECORD_WORDS};

#[esp_hal::ram(unstable(rtc_fast))]
static mut HEALTH_WORDS: [u32; RECORD_WORDS] = [0; RECORD_WORDS];

static SLOT_TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the single record slot.
pub struct RtcHealthSlot {
    _private: (),
}

impl RtcHealthSlot {
    /// Take the slot. Returns `None` if it has already been taken; there is
    /// exactly one record region on the chip.
    pub fn take() -> Option<Self> {
        SLOT_TAKEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { _private: () })
    }
}

impl NonVolatileStorage for RtcHealthSlot {
    fn read_words(&self, words: &mut [u32; RECORD_WORDS]) {
        // SAFETY: this handle is the only accessor (enforced by `take`) and
        // reads are word-aligned copies.
        *words = unsafe { *(&raw const HEALTH_WORDS) };
    }

    fn unlock(&mut self) -> Result<(), PersistError> {
        // RTC memory has no write-protect latch to release.
        Ok(())
    }

    fn lock(&mut self) {}

    fn write_words(&mut self, words: &[u32; RECORD_WORDS]) -> Result<(), PersistError> {
        // SAFETY: exclusive handle, and the store wraps this call in a
        // critical section, so the write cannot be torn by preemption.
        unsafe {
            *(&raw mut HEALTH_WORDS) = *words;
        }
        Ok(())
    }
}

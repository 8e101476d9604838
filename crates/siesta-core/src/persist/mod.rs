//! Durable shutdown-health record store.
//!
//! A single 16-byte record lives at a fixed offset in non-volatile storage
//! and survives deep-sleep cycles and power loss. It tracks whether the last
//! power-down was clean and how many times the device had to force itself
//! down because the radio stopped responding. The record carries an XOR-fold
//! checksum so a torn write is detected on the next boot instead of being
//! trusted.
//!
//! The storage itself is injected through [`NonVolatileStorage`], so the
//! same store logic runs against real hardware in the firmware and against
//! an in-memory buffer in tests and the simulator.

mod checksum;
pub mod mem;
mod record;
mod store;

pub use checksum::xor_fold;
pub use record::{HealthRecord, RECORD_BYTES, RECORD_WORDS};
pub use store::{HealthStore, NonVolatileStorage, PersistError, ShutdownStatus};

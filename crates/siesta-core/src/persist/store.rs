//! Record store operations over an injected storage handle.

use log::warn;
use thiserror_no_std::Error;

use super::record::{HealthRecord, RECORD_WORDS};

/// Failures the storage layer can report.
///
/// Reads never fail at this level; there is no error correction below the
/// checksum, so corruption is only ever detected one layer up.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PersistError {
    /// Write protection could not be released before programming.
    #[error("non-volatile write protection could not be released")]
    Lock,
    /// The program operation itself failed.
    #[error("non-volatile write failed")]
    Write,
}

/// Outcome of the last-shutdown health query.
///
/// `Corrupt` is deliberately its own outcome: a record that fails its
/// checksum says nothing about the last shutdown and must not be coerced
/// into either answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStatus {
    /// Record valid, no shutdown error flagged.
    Clean,
    /// Record valid, the previous shutdown was forced.
    Unclean,
    /// The record failed its checksum.
    Corrupt,
}

/// Word-granular non-volatile storage holding the single record slot.
///
/// Implementations own the fixed storage address. `unlock`/`lock` model the
/// write-protect key dance some backends require; backends without write
/// protection implement them as no-ops.
pub trait NonVolatileStorage {
    /// Read the record slot. Always succeeds at the I/O level.
    fn read_words(&self, words: &mut [u32; RECORD_WORDS]);

    /// Release write protection ahead of programming.
    fn unlock(&mut self) -> Result<(), PersistError>;

    /// Re-engage write protection.
    fn lock(&mut self);

    /// Program the record slot.
    fn write_words(&mut self, words: &[u32; RECORD_WORDS]) -> Result<(), PersistError>;
}

/// Shutdown-health record store.
pub struct HealthStore<S: NonVolatileStorage> {
    storage: S,
}

impl<S: NonVolatileStorage> HealthStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read the current record. Validity is the caller's question to ask;
    /// the read itself cannot fail.
    pub fn get(&self) -> HealthRecord {
        let mut words = [0u32; RECORD_WORDS];
        self.storage.read_words(&mut words);
        HealthRecord::from_words(words)
    }

    /// Write an all-zero record with its (zero) checksum, establishing the
    /// known-good baseline.
    pub fn wipe(&mut self) -> Result<(), PersistError> {
        let mut record = HealthRecord::default();
        record.stamp();
        self.put(&record)
    }

    /// Was the previous power-down clean?
    pub fn last_shutdown_status(&self) -> ShutdownStatus {
        let record = self.get();
        if !record.is_valid() {
            ShutdownStatus::Corrupt
        } else if record.last_shutdown_error == 0 {
            ShutdownStatus::Clean
        } else {
            ShutdownStatus::Unclean
        }
    }

    /// Clear the shutdown-error flag after the event has been reported
    /// upstream. Leaves the record untouched if the write fails.
    pub fn acknowledge_shutdown_error(&mut self) -> Result<(), PersistError> {
        let mut record = self.get();
        record.last_shutdown_error = 0;
        record.stamp();
        self.put(&record)
    }

    /// Flag the shutdown now being forced and bump the counter.
    ///
    /// A corrupt record is reset to the zero baseline here rather than
    /// reported: this runs on the way down after the radio has already hung,
    /// so recording something trustworthy beats failing.
    pub fn record_unresponsive_shutdown(&mut self) -> Result<(), PersistError> {
        let mut record = self.get();
        if !record.is_valid() {
            warn!("health record corrupt, resetting to baseline");
            record = HealthRecord::default();
        }

        record.last_shutdown_error = 1;
        record.unresponsive_shutdowns += 1;
        record.stamp();
        self.put(&record)
    }

    /// Get a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get a mutable reference to the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Unlock-program-lock sequence, run with interrupts masked so a
    /// preemption cannot tear the write. The lock is re-engaged on the error
    /// path too.
    fn put(&mut self, record: &HealthRecord) -> Result<(), PersistError> {
        critical_section::with(|_| {
            self.storage.unlock()?;
            let result = self.storage.write_words(&record.to_words());
            self.storage.lock();
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::mem::MemStorage;

    fn wiped_store() -> HealthStore<MemStorage> {
        let mut store = HealthStore::new(MemStorage::new());
        store.wipe().unwrap();
        store
    }

    #[test]
    fn wipe_establishes_clean_baseline() {
        let store = wiped_store();
        assert!(store.get().is_valid());
        assert_eq!(store.last_shutdown_status(), ShutdownStatus::Clean);
        assert_eq!(store.get().unresponsive_shutdowns, 0);
    }

    #[test]
    fn unresponsive_shutdown_flags_and_counts() {
        let mut store = wiped_store();
        store.record_unresponsive_shutdown().unwrap();

        let record = store.get();
        assert_eq!(record.last_shutdown_error, 1);
        assert_eq!(record.unresponsive_shutdowns, 1);
        assert_eq!(store.last_shutdown_status(), ShutdownStatus::Unclean);
    }

    #[test]
    fn acknowledge_clears_flag_but_keeps_count() {
        let mut store = wiped_store();
        store.record_unresponsive_shutdown().unwrap();
        store.acknowledge_shutdown_error().unwrap();

        let record = store.get();
        assert_eq!(record.last_shutdown_error, 0);
        assert_eq!(record.unresponsive_shutdowns, 1);
        assert_eq!(store.last_shutdown_status(), ShutdownStatus::Clean);
    }

    #[test]
    fn corruption_surfaces_as_corrupt_not_unclean() {
        let mut store = wiped_store();
        store.record_unresponsive_shutdown().unwrap();
        store.storage_mut().flip_bit(1, 3);

        assert_eq!(store.last_shutdown_status(), ShutdownStatus::Corrupt);
    }

    #[test]
    fn unresponsive_shutdown_resets_corrupt_record() {
        let mut store = wiped_store();
        store.record_unresponsive_shutdown().unwrap();
        store.record_unresponsive_shutdown().unwrap();
        assert_eq!(store.get().unresponsive_shutdowns, 2);

        // Corrupt the counter, then force another shutdown: the count
        // restarts from the zero baseline instead of trusting garbage.
        store.storage_mut().flip_bit(1, 17);
        store.record_unresponsive_shutdown().unwrap();

        let record = store.get();
        assert!(record.is_valid());
        assert_eq!(record.unresponsive_shutdowns, 1);
        assert_eq!(record.last_shutdown_error, 1);
    }

    #[test]
    fn lock_failure_propagates_without_mutating() {
        let mut store = wiped_store();
        store.record_unresponsive_shutdown().unwrap();
        let before = store.get();

        store.storage_mut().fail_unlock = true;
        assert_eq!(
            store.acknowledge_shutdown_error(),
            Err(PersistError::Lock)
        );
        assert_eq!(store.get(), before);
    }

    #[test]
    fn write_failure_leaves_storage_relocked() {
        let mut store = wiped_store();
        store.storage_mut().fail_writes = true;
        assert_eq!(store.wipe(), Err(PersistError::Write));
        assert!(store.storage().is_locked());
    }
}

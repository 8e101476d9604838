//! In-memory storage double for tests and the simulator.

use super::record::RECORD_WORDS;
use super::store::{NonVolatileStorage, PersistError};

/// Array-backed [`NonVolatileStorage`] with injectable lock and write
/// failures.
#[derive(Debug, Default)]
pub struct MemStorage {
    words: [u32; RECORD_WORDS],
    locked: bool,
    /// Make the next `unlock` fail, simulating stuck write protection.
    pub fail_unlock: bool,
    /// Make `write_words` fail after a successful unlock.
    pub fail_writes: bool,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            locked: true,
            ..Self::default()
        }
    }

    /// Flip one bit of the stored record, emulating a torn write.
    pub fn flip_bit(&mut self, word: usize, bit: u32) {
        self.words[word] ^= 1 << bit;
    }

    /// Whether write protection is currently engaged.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl NonVolatileStorage for MemStorage {
    fn read_words(&self, words: &mut [u32; RECORD_WORDS]) {
        *words = self.words;
    }

    fn unlock(&mut self) -> Result<(), PersistError> {
        if self.fail_unlock {
            return Err(PersistError::Lock);
        }
        self.locked = false;
        Ok(())
    }

    fn lock(&mut self) {
        self.locked = true;
    }

    fn write_words(&mut self, words: &[u32; RECORD_WORDS]) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Write);
        }
        debug_assert!(!self.locked, "write attempted while locked");
        self.words = *words;
        Ok(())
    }
}

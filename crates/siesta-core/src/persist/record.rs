//! On-storage layout of the shutdown-health record.

use super::checksum::xor_fold;

/// Record size in 32-bit words.
pub const RECORD_WORDS: usize = 4;

/// Record size in bytes.
pub const RECORD_BYTES: usize = RECORD_WORDS * 4;

/// Shutdown-health record, exactly 16 bytes with no padding.
///
/// Binary format (little-endian words):
/// - `last_shutdown_error`: 4 bytes — 0 if the last power-down was clean
/// - `unresponsive_shutdowns`: 4 bytes — forced-shutdown counter
/// - `shutdowns`: 4 bytes — reserved clean-shutdown counter
/// - `checksum`: 4 bytes — XOR-fold of the preceding 12 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthRecord {
    /// Non-zero if the last shutdown was not clean.
    pub last_shutdown_error: u32,
    /// How many times the device forced itself down after the radio stopped
    /// responding.
    pub unresponsive_shutdowns: u32,
    /// Reserved counter, present in the layout but not incremented by the
    /// shipped control flow.
    pub shutdowns: u32,
    /// XOR-fold checksum over the three fields above.
    pub checksum: u32,
}

// We don't want any padding.
const _: () = assert!(core::mem::size_of::<HealthRecord>() == RECORD_BYTES);

impl HealthRecord {
    /// Record as the word sequence written to storage.
    pub fn to_words(&self) -> [u32; RECORD_WORDS] {
        [
            self.last_shutdown_error,
            self.unresponsive_shutdowns,
            self.shutdowns,
            self.checksum,
        ]
    }

    /// Rebuild a record from the word sequence read from storage.
    pub fn from_words(words: [u32; RECORD_WORDS]) -> Self {
        Self {
            last_shutdown_error: words[0],
            unresponsive_shutdowns: words[1],
            shutdowns: words[2],
            checksum: words[3],
        }
    }

    fn to_bytes(self) -> [u8; RECORD_BYTES] {
        let mut bytes = [0u8; RECORD_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.to_words()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Recompute and store the checksum over the payload fields.
    pub fn stamp(&mut self) {
        let bytes = self.to_bytes();
        self.checksum = xor_fold(&bytes[..RECORD_BYTES - 4]);
    }

    /// True iff folding the entire record, stored checksum included, yields
    /// zero. A record that fails this is corrupt and must be treated as
    /// never initialized.
    pub fn is_valid(&self) -> bool {
        xor_fold(&self.to_bytes()) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_exactly_sixteen_bytes() {
        assert_eq!(core::mem::size_of::<HealthRecord>(), 16);
    }

    #[test]
    fn stamped_record_is_valid() {
        let mut record = HealthRecord {
            last_shutdown_error: 0x55,
            unresponsive_shutdowns: 0x53,
            shutdowns: 0,
            checksum: 0,
        };
        record.stamp();
        assert!(record.is_valid());
    }

    #[test]
    fn zeroed_record_is_valid() {
        // The wipe baseline: all-zero payload with all-zero checksum.
        assert!(HealthRecord::default().is_valid());
    }

    #[test]
    fn mutating_any_field_invalidates() {
        let mut record = HealthRecord {
            last_shutdown_error: 1,
            unresponsive_shutdowns: 7,
            shutdowns: 0,
            checksum: 0,
        };
        record.stamp();

        let mut tampered = record;
        tampered.unresponsive_shutdowns = 6;
        assert!(!tampered.is_valid());
    }

    #[test]
    fn single_bit_flip_anywhere_invalidates() {
        let mut record = HealthRecord {
            last_shutdown_error: 0,
            unresponsive_shutdowns: 3,
            shutdowns: 0,
            checksum: 0,
        };
        record.stamp();

        for word in 0..RECORD_WORDS {
            for bit in 0..32 {
                let mut words = record.to_words();
                words[word] ^= 1 << bit;
                assert!(
                    !HealthRecord::from_words(words).is_valid(),
                    "bit {bit} of word {word} went undetected"
                );
            }
        }
    }

    #[test]
    fn words_round_trip() {
        let mut record = HealthRecord {
            last_shutdown_error: 1,
            unresponsive_shutdowns: 42,
            shutdowns: 9,
            checksum: 0,
        };
        record.stamp();
        assert_eq!(HealthRecord::from_words(record.to_words()), record);
    }
}

//! Register bit-field descriptors.
//!
//! Each calendar quantity is stored as two separate BCD digits (tens and
//! units) at fixed bit offsets. Describing every sub-field as a
//! `{shift, width}` pair gives encode and decode one shared source of truth
//! per register, instead of two hand-maintained shift/mask tables that can
//! drift apart.

/// One raw sub-field within a 32-bit register.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub shift: u32,
    pub width: u32,
}

impl Field {
    pub(crate) const fn mask(self) -> u32 {
        ((1 << self.width) - 1) << self.shift
    }

    pub(crate) const fn insert(self, register: u32, value: u32) -> u32 {
        register | ((value << self.shift) & self.mask())
    }

    pub(crate) const fn extract(self, register: u32) -> u32 {
        (register & self.mask()) >> self.shift
    }
}

/// A decimal quantity split across a tens digit and a units digit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BcdField {
    pub tens: Field,
    pub units: Field,
}

impl BcdField {
    pub(crate) const fn insert(self, register: u32, value: u8) -> u32 {
        let tens = value / 10;
        let units = value - tens * 10;
        let register = self.tens.insert(register, tens as u32);
        self.units.insert(register, units as u32)
    }

    pub(crate) const fn extract(self, register: u32) -> u8 {
        (self.tens.extract(register) * 10 + self.units.extract(register)) as u8
    }
}

/// Date register: `YT[23:20] YU[19:16] WDU[15:13] MT[12] MU[11:8] DT[5:4]
/// DU[3:0]`.
pub(crate) mod date_reg {
    use super::{BcdField, Field};

    pub const YEAR: BcdField = BcdField {
        tens: Field { shift: 20, width: 4 },
        units: Field { shift: 16, width: 4 },
    };
    // Weekday is a plain 3-bit index, not BCD.
    pub const WEEKDAY: Field = Field { shift: 13, width: 3 };
    pub const MONTH: BcdField = BcdField {
        tens: Field { shift: 12, width: 1 },
        units: Field { shift: 8, width: 4 },
    };
    pub const DAY: BcdField = BcdField {
        tens: Field { shift: 4, width: 2 },
        units: Field { shift: 0, width: 4 },
    };
}

/// Time register: `HT[21:20] HU[19:16] MNT[14:12] MNU[11:8] ST[6:4]
/// SU[3:0]`, 24-hour.
pub(crate) mod time_reg {
    use super::{BcdField, Field};

    pub const HOUR: BcdField = BcdField {
        tens: Field { shift: 20, width: 2 },
        units: Field { shift: 16, width: 4 },
    };
    pub const MINUTE: BcdField = BcdField {
        tens: Field { shift: 12, width: 3 },
        units: Field { shift: 8, width: 4 },
    };
    pub const SECOND: BcdField = BcdField {
        tens: Field { shift: 4, width: 3 },
        units: Field { shift: 0, width: 4 },
    };
}

/// Alarm register: same quantities as the time register plus the day of the
/// month, at different offsets (`DT[29:28] DU[27:24] HT[21:20] HU[19:16]
/// MNT[14:12] MNU[11:8] ST[6:4] SU[3:0]`). The match-enable bits (31, 30,
/// 23, 15, 7) stay zero: every field must match, giving a one-shot alarm at
/// one specific date/time.
pub(crate) mod alarm_reg {
    use super::{BcdField, Field};

    pub const DAY: BcdField = BcdField {
        tens: Field { shift: 28, width: 2 },
        units: Field { shift: 24, width: 4 },
    };
    pub const HOUR: BcdField = BcdField {
        tens: Field { shift: 20, width: 2 },
        units: Field { shift: 16, width: 4 },
    };
    pub const MINUTE: BcdField = BcdField {
        tens: Field { shift: 12, width: 3 },
        units: Field { shift: 8, width: 4 },
    };
    pub const SECOND: BcdField = BcdField {
        tens: Field { shift: 4, width: 3 },
        units: Field { shift: 0, width: 4 },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_covers_width_at_shift() {
        let field = Field { shift: 13, width: 3 };
        assert_eq!(field.mask(), 0b111 << 13);
    }

    #[test]
    fn insert_then_extract_round_trips() {
        let field = Field { shift: 20, width: 4 };
        let register = field.insert(0, 9);
        assert_eq!(field.extract(register), 9);
    }

    #[test]
    fn insert_does_not_touch_other_bits() {
        let register = time_reg::MINUTE.insert(0, 59);
        assert_eq!(time_reg::HOUR.extract(register), 0);
        assert_eq!(time_reg::SECOND.extract(register), 0);
    }

    #[test]
    fn bcd_splits_tens_and_units() {
        let register = time_reg::MINUTE.insert(0, 47);
        assert_eq!(time_reg::MINUTE.tens.extract(register), 4);
        assert_eq!(time_reg::MINUTE.units.extract(register), 7);
        assert_eq!(time_reg::MINUTE.extract(register), 47);
    }
}

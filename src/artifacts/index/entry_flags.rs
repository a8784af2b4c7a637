//! The 16-bit flags field of an index entry
//!
//! ```text
//! bit 15     assume-valid
//! bit 14     extended (must be 0 in version 2)
//! bits 12-13 merge stage
//! bits 0-11  path length, saturated at 0xFFF
//! ```
//!
//! The path length is informational: entries are always decoded up to the
//! NUL terminator, so longer paths still round-trip.

use bitflags::bitflags;

/// Largest path length representable in the flags field
pub const MAX_PATH_SIZE: usize = 0xFFF;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;
        const STAGE_MASK = 0x3000;
        const NAME_MASK = 0x0FFF;
    }
}

impl EntryFlags {
    /// Flags for a path of `path_len` bytes at the given merge stage (0-3)
    pub fn for_path(path_len: usize, stage: u8) -> Self {
        let name_length = path_len.min(MAX_PATH_SIZE) as u16;
        let stage = (u16::from(stage) & 0b11) << 12;

        EntryFlags::from_bits_retain(name_length | stage)
    }

    pub fn name_length(&self) -> usize {
        (self.bits() & EntryFlags::NAME_MASK.bits()) as usize
    }

    pub fn stage(&self) -> u8 {
        ((self.bits() & EntryFlags::STAGE_MASK.bits()) >> 12) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0x0000)]
    #[case(8, 0, 0x0008)]
    #[case(8, 2, 0x2008)]
    #[case(5000, 3, 0x3FFF)]
    fn packs_length_and_stage(#[case] len: usize, #[case] stage: u8, #[case] bits: u16) {
        let flags = EntryFlags::for_path(len, stage);

        assert_eq!(flags.bits(), bits);
        assert_eq!(flags.name_length(), len.min(MAX_PATH_SIZE));
        assert_eq!(flags.stage(), stage);
    }

    #[test]
    fn stage_is_masked_to_two_bits() {
        assert_eq!(EntryFlags::for_path(1, 7).stage(), 3);
    }

    #[test]
    fn unknown_bits_are_retained() {
        let flags = EntryFlags::from_bits_retain(0x8001);

        assert!(flags.contains(EntryFlags::ASSUME_VALID));
        assert_eq!(flags.name_length(), 1);
        assert_eq!(flags.bits(), 0x8001);
    }
}

use std::{fmt::Debug, hash::Hash};

/// An atomic unit the engine can count, code and serialize.
pub trait Symbol: Copy + Ord + Hash + Debug {
    /// Width of the symbol in headers, in bits. Always a multiple of 8.
    const BITS: u32;

    fn to_bits(self) -> u64;

    fn from_bits(bits: u64) -> Option<Self>;

    /// Number of distinct values the symbol can take.
    fn alphabet_size() -> usize {
        1 << Self::BITS
    }
}

impl Symbol for u8 {
    const BITS: u32 = 8;

    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Option<Self> {
        u8::try_from(bits).ok()
    }
}

impl Symbol for u16 {
    const BITS: u32 = 16;

    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Option<Self> {
        u16::try_from(bits).ok()
    }
}

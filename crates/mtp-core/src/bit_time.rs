use core::fmt;


/// Logical time of a signalling link, counted in bit periods.
/// Every bit clock tick of the serial link advances the time by one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct BitTime {
    pub bits: u64,
}

impl BitTime {
    pub fn new(bits: u64) -> Self {
        BitTime { bits }
    }

    /// Add a number of bit periods to a BitTime
    pub fn add_bits(self, num_bits: u64) -> BitTime {
        BitTime { bits: self.bits.wrapping_add(num_bits) }
    }

    /// Difference between two BitTimes in bit periods
    pub fn diff(self, b: Self) -> i64 {
        self.bits.wrapping_sub(b.bits) as i64
    }

    /// Age of this BitTime compared to now
    #[inline(always)]
    pub fn age(self, now: BitTime) -> i64 {
        now.diff(self)
    }

    /// True if `now` is at or beyond this time
    #[inline(always)]
    pub fn is_reached(self, now: BitTime) -> bool {
        self.age(now) >= 0
    }

    /// Converts a duration in seconds into bit periods at the given rate, rounding up
    pub fn bits_from_secs(secs: f64, bit_rate: u32) -> u64 {
        (secs * bit_rate as f64).ceil() as u64
    }

    /// Time in seconds at the given rate
    pub fn as_secs(self, bit_rate: u32) -> f64 {
        self.bits as f64 / bit_rate as f64
    }
}

impl fmt::Display for BitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", self.bits)
    }
}

impl fmt::Debug for BitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.bits)
    }
}

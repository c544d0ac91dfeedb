use core::fmt;

/// Number of bits of a signalling point code
pub const POINT_CODE_BITS: usize = 14;
pub const POINT_CODE_MAX: u16 = (1 << POINT_CODE_BITS) - 1;

/// Number of bits of a signalling link code
pub const SLC_BITS: usize = 4;

/// 14-bit signalling point code
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct PointCode(u16);

impl PointCode {
    /// Returns None if the value does not fit into 14 bits
    pub fn new(value: u16) -> Option<Self> {
        if value > POINT_CODE_MAX {
            None
        } else {
            Some(PointCode(value))
        }
    }

    /// Masks the value to 14 bits
    pub fn from_raw(value: u64) -> Self {
        PointCode((value as u16) & POINT_CODE_MAX)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

/// Point codes are commonly written in 3-8-3 notation
impl fmt::Display for PointCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0 >> 11, (self.0 >> 3) & 0xff, self.0 & 0x07)
    }
}

impl fmt::Debug for PointCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_code_range() {
        assert!(PointCode::new(POINT_CODE_MAX).is_some());
        assert!(PointCode::new(POINT_CODE_MAX + 1).is_none());
        assert_eq!(PointCode::from_raw(0xffff_ffff).value(), POINT_CODE_MAX);
    }

    #[test]
    fn test_point_code_display() {
        let pc = PointCode::new((2 << 11) | (17 << 3) | 5).unwrap();
        assert_eq!(format!("{}", pc), "2-17-5");
    }
}

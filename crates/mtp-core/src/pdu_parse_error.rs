#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduParseErr {
    BufferEnded { field: Option<&'static str> },
    InvalidValue { field: &'static str, value: u64 },
    InconsistentLength { expected: usize, found: usize },
    Inconsistency { field: &'static str, reason: &'static str },
    /// Check bits do not match the frame contents
    CrcMismatch { expected: u16, found: u16 },
    /// Fewer octets than the smallest signal unit
    FrameTooShort { len: usize },
    /// More octets than the largest signal unit
    FrameTooLong { len: usize },
    /// Number of bits between flags is not a multiple of eight
    NotOctetAligned { bits: usize },
}

impl core::fmt::Display for PduParseErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PduParseErr::BufferEnded { field } => write!(f, "buffer ended while reading {:?}", field),
            PduParseErr::InvalidValue { field, value } => write!(f, "invalid value {} for {}", value, field),
            PduParseErr::InconsistentLength { expected, found } => {
                write!(f, "inconsistent length: expected {}, found {}", expected, found)
            }
            PduParseErr::Inconsistency { field, reason } => write!(f, "{}: {}", field, reason),
            PduParseErr::CrcMismatch { expected, found } => {
                write!(f, "crc mismatch: computed {:04x}, received {:04x}", expected, found)
            }
            PduParseErr::FrameTooShort { len } => write!(f, "frame too short: {} octets", len),
            PduParseErr::FrameTooLong { len } => write!(f, "frame too long: {} octets", len),
            PduParseErr::NotOctetAligned { bits } => write!(f, "frame not octet aligned: {} bits", bits),
        }
    }
}

impl std::error::Error for PduParseErr {}

/// Checks whether a value matches an expected value. If not, returns PduParseErr::InvalidValue
#[macro_export]
macro_rules! expect_value {
    ($value:ident, $expected:expr) => {
        $crate::expect_value!(@inner $value, $expected, stringify!($value))
    };
    ($value:expr, $expected:expr, $field:expr) => {
        $crate::expect_value!(@inner $value, $expected, $field)
    };

    (@inner $value:expr, $expected:expr, $field:expr) => {{
        let val = $value;
        if val == $expected {
            Ok(())
        } else {
            Err(PduParseErr::InvalidValue {
                field: $field,
                value: val.into(),
            })
        }
    }};
}

/// Reads a field of `$bits` bits into a new binding named after the field
#[macro_export]
macro_rules! let_field {
    ($buf:expr, $ident:ident, $bits:expr) => {
        let $ident = $buf.read_field($bits, stringify!($ident))?;
    };
}

/// Octet seen on an idle line: continuous flags
pub const IDLE_OCTET: u8 = 0x7e;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BitDevError {
    /// Input exhausted, the stack should halt
    RxEndOfData,
    RxReadError,
    TxWriteError,
}

impl core::fmt::Display for BitDevError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BitDevError::RxEndOfData => write!(f, "end of input"),
            BitDevError::RxReadError => write!(f, "read error"),
            BitDevError::TxWriteError => write!(f, "write error"),
        }
    }
}

impl std::error::Error for BitDevError {}

/// Trait for devices carrying the serial bit stream of a signalling link.
/// Octets are exchanged with the LSB sent and received first.
pub trait BitDev {
    /// Transmits `tx` and fills `rx` with as many received octets.
    /// A blocking device paces the whole stack.
    fn rxtx_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), BitDevError>;
}

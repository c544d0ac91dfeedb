use mtp_core::BitBuffer;
use mtp_core::pdu_parse_error::*;
use mtp_core::let_field;

/// Largest value of the length indicator. Longer payloads also carry 63.
pub const LI_MAX: usize = 63;

/// Q.703 2.2 Signal unit header: sequence numbers, indicator bits and length indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuHeader {
    // 7
    pub bsn: u8,
    // 1
    pub bib: bool,
    // 7
    pub fsn: u8,
    // 1
    pub fib: bool,
    // 6, followed by 2 spare bits
    pub li: u8,
}

impl SuHeader {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let_field!(buf, bsn, 7);
        let_field!(buf, bib, 1);
        let_field!(buf, fsn, 7);
        let_field!(buf, fib, 1);
        let_field!(buf, li, 6);
        // Spare, ignored on receipt
        let_field!(buf, _spare, 2);

        Ok(SuHeader {
            bsn: bsn as u8,
            bib: bib != 0,
            fsn: fsn as u8,
            fib: fib != 0,
            li: li as u8,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits((self.bsn & 0x7f) as u64, 7);
        buf.write_bits(self.bib as u64, 1);
        buf.write_bits((self.fsn & 0x7f) as u64, 7);
        buf.write_bits(self.fib as u64, 1);
        buf.write_bits((self.li as u64).min(LI_MAX as u64), 6);
        buf.write_bits(0, 2);
    }

    /// Length indicator for a payload of `len` octets
    pub fn li_for_len(len: usize) -> u8 {
        len.min(LI_MAX) as u8
    }
}

impl core::fmt::Display for SuHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "bsn={} bib={} fsn={} fib={} li={}",
            self.bsn, self.bib as u8, self.fsn, self.fib as u8, self.li
        )
    }
}

use mtp_core::crc16::{crc16_x25, crc16_x25_update, CRC_INIT, CRC_GOOD_RESIDUE};
use mtp_core::pdu_parse_error::*;
use mtp_core::{BitBuffer, Sio};

use crate::mtp2::enums::link_status::LinkStatus;
use crate::mtp2::fields::su_header::{LI_MAX, SuHeader};

/// Octets of the header (BSN/BIB, FSN/FIB, LI)
pub const SU_HEADER_LEN: usize = 3;
/// Octets of the check bits
pub const SU_CRC_LEN: usize = 2;
/// Longest signalling information field of an MSU
pub const SIF_MAX_LEN: usize = 272;
/// A fill-in signal unit, the shortest valid frame
pub const SU_MIN_LEN: usize = SU_HEADER_LEN + SU_CRC_LEN;
/// An MSU carrying SIO and a maximum length SIF
pub const SU_MAX_LEN: usize = SU_HEADER_LEN + 1 + SIF_MAX_LEN + SU_CRC_LEN;

/// Content of a signal unit, distinguished by its payload length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuBody {
    /// Fill-in signal unit, no payload
    Fisu,
    /// Link status signal unit, one or two status octets
    Lssu {
        status: LinkStatus,
        /// Upper five bits of the first status octet
        spare: u8,
        /// Second status octet, if present
        ext: Option<u8>,
    },
    /// Message signal unit, SIO followed by at least two octets of SIF
    Msu { sio: Sio, sif: Vec<u8> },
}

/// Q.703 2.2 A complete signal unit as found between two flags, check bits excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalUnit {
    pub bsn: u8,
    pub bib: bool,
    pub fsn: u8,
    pub fib: bool,
    pub body: SuBody,
}

impl SignalUnit {
    pub fn fisu(bsn: u8, bib: bool, fsn: u8, fib: bool) -> Self {
        SignalUnit { bsn, bib, fsn, fib, body: SuBody::Fisu }
    }

    pub fn lssu(bsn: u8, bib: bool, fsn: u8, fib: bool, status: LinkStatus) -> Self {
        SignalUnit {
            bsn,
            bib,
            fsn,
            fib,
            body: SuBody::Lssu { status, spare: 0, ext: None },
        }
    }

    pub fn msu(bsn: u8, bib: bool, fsn: u8, fib: bool, sio: Sio, sif: Vec<u8>) -> Self {
        SignalUnit { bsn, bib, fsn, fib, body: SuBody::Msu { sio, sif } }
    }

    /// Number of octets between the header and the check bits
    pub fn payload_len(&self) -> usize {
        match &self.body {
            SuBody::Fisu => 0,
            SuBody::Lssu { ext, .. } => 1 + ext.is_some() as usize,
            SuBody::Msu { sif, .. } => 1 + sif.len(),
        }
    }

    /// Parses a frame as delivered by the deframer: header, payload, check bits (low octet first).
    /// The check bits and the length indicator are verified.
    pub fn from_frame(frame: &[u8]) -> Result<Self, PduParseErr> {
        if frame.len() < SU_MIN_LEN {
            return Err(PduParseErr::FrameTooShort { len: frame.len() });
        }
        if frame.len() > SU_MAX_LEN {
            return Err(PduParseErr::FrameTooLong { len: frame.len() });
        }

        let data_len = frame.len() - SU_CRC_LEN;
        if crc16_x25_update(CRC_INIT, frame) != CRC_GOOD_RESIDUE {
            let found = frame[data_len] as u16 | (frame[data_len + 1] as u16) << 8;
            return Err(PduParseErr::CrcMismatch {
                expected: crc16_x25(&frame[..data_len]),
                found,
            });
        }

        let mut buf = BitBuffer::from_bytes(&frame[..data_len]);
        let hdr = SuHeader::from_bitbuf(&mut buf)?;

        // 63 means "63 or more"
        let payload_len = data_len - SU_HEADER_LEN;
        let li_ok = if hdr.li as usize == LI_MAX {
            payload_len >= LI_MAX
        } else {
            hdr.li as usize == payload_len
        };
        if !li_ok {
            return Err(PduParseErr::InconsistentLength {
                expected: hdr.li as usize,
                found: payload_len,
            });
        }

        let body = match payload_len {
            0 => SuBody::Fisu,
            1 | 2 => {
                let status = buf.read_field(3, "status")?;
                let spare = buf.read_field(5, "spare")?;
                let ext = if payload_len == 2 {
                    Some(buf.read_field(8, "status_ext")? as u8)
                } else {
                    None
                };
                SuBody::Lssu {
                    // Three bits always map onto a variant
                    status: LinkStatus::try_from(status).map_err(|_| PduParseErr::InvalidValue { field: "status", value: status })?,
                    spare: spare as u8,
                    ext,
                }
            }
            _ => {
                let sio = buf.read_field(8, "sio")? as u8;
                let sif = buf.read_remaining_bytes("sif")?;
                SuBody::Msu { sio, sif }
            }
        };

        Ok(SignalUnit {
            bsn: hdr.bsn,
            bib: hdr.bib,
            fsn: hdr.fsn,
            fib: hdr.fib,
            body,
        })
    }

    /// Serializes header and payload and appends the check bits
    pub fn to_frame(&self) -> Vec<u8> {
        let payload_len = self.payload_len();
        let mut buf = BitBuffer::new_autoexpand((SU_HEADER_LEN + payload_len + SU_CRC_LEN) * 8);

        let hdr = SuHeader {
            bsn: self.bsn,
            bib: self.bib,
            fsn: self.fsn,
            fib: self.fib,
            li: SuHeader::li_for_len(payload_len),
        };
        hdr.to_bitbuf(&mut buf);

        match &self.body {
            SuBody::Fisu => {}
            SuBody::Lssu { status, spare, ext } => {
                buf.write_bits(status.into_raw(), 3);
                buf.write_bits((*spare & 0x1f) as u64, 5);
                if let Some(ext) = ext {
                    buf.write_bits(*ext as u64, 8);
                }
            }
            SuBody::Msu { sio, sif } => {
                buf.write_bits(*sio as u64, 8);
                buf.write_bytes(sif);
            }
        }

        let crc = crc16_x25(buf.as_bytes());
        buf.write_bits((crc & 0xff) as u64, 8);
        buf.write_bits((crc >> 8) as u64, 8);
        buf.into_bytes()
    }

    /// Short name of the signal unit type, for logging
    pub fn kind(&self) -> &'static str {
        match &self.body {
            SuBody::Fisu => "FISU",
            SuBody::Lssu { .. } => "LSSU",
            SuBody::Msu { .. } => "MSU",
        }
    }
}

impl core::fmt::Display for SignalUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "bsn={} bib={} fsn={} fib={} ",
            self.bsn, self.bib as u8, self.fsn, self.fib as u8
        )?;
        match &self.body {
            SuBody::Fisu => write!(f, "FISU"),
            SuBody::Lssu { status, .. } => write!(f, "LSSU {}", status),
            SuBody::Msu { sio, sif } => write!(f, "MSU sio={:02x} sif_len={}", sio, sif.len()),
        }
    }
}

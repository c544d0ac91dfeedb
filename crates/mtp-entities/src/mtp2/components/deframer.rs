use std::collections::VecDeque;

use mtp_core::PduParseErr;
use mtp_pdus::mtp2::pdus::signal_unit::{SU_MAX_LEN, SU_MIN_LEN};

/// Octet counting reports one error per this many bits without a valid frame (16 octets)
pub const OCTET_COUNT_BITS: usize = 128;

/// Output of the receive side of the HDLC framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeframerEvent {
    /// Octet aligned content between two flags, stuffing removed, check bits included
    Frame(Vec<u8>),
    /// Content between two flags that cannot be a signal unit
    BadFrame(PduParseErr),
    /// Abort or oversized frame. Octet counting mode entered.
    OctetCountingStart,
    /// Another 16 octets passed while octet counting
    OctetCountingError,
}

/// Receive side of the HDLC framing, fed one bit at a time.
///
/// Five ones followed by a zero mark a stuffed bit, six ones followed by a zero are
/// a flag, seven ones abort the current frame. Events are queued and fetched with
/// `pop_event`.
#[derive(Debug, Default)]
pub struct HdlcDeframer {
    /// Consecutive ones seen, saturating
    ones: u8,
    /// A flag was seen and bits are being collected
    in_frame: bool,
    frame: Vec<u8>,
    bits: usize,
    /// The last bit stored was a zero (opening bit of a possible flag)
    last_zero_stored: bool,

    octet_counting: bool,
    octet_count_bits: usize,

    events: VecDeque<DeframerEvent>,
}

impl HdlcDeframer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_octet_counting(&self) -> bool {
        self.octet_counting
    }

    pub fn pop_event(&mut self) -> Option<DeframerEvent> {
        self.events.pop_front()
    }

    pub fn push_bit(&mut self, bit: u8) {
        if self.octet_counting {
            self.octet_count_bits += 1;
            if self.octet_count_bits >= OCTET_COUNT_BITS {
                self.octet_count_bits = 0;
                self.events.push_back(DeframerEvent::OctetCountingError);
            }
        }

        if bit != 0 {
            self.ones = self.ones.saturating_add(1);
            match self.ones {
                1..=6 => self.store_bit(1),
                7 => {
                    tracing::trace!("abort, {} bits discarded", self.bits);
                    self.in_frame = false;
                    self.clear_frame();
                    self.start_octet_counting();
                }
                _ => {}
            }
            return;
        }

        let ones = self.ones;
        self.ones = 0;
        match ones {
            5 => {
                // Stuffed bit
                self.last_zero_stored = false;
            }
            6 => {
                if self.in_frame {
                    self.end_of_frame();
                }
                self.in_frame = true;
                self.clear_frame();
            }
            7.. => {
                // End of an abort sequence, wait for the next flag
            }
            _ => self.store_bit(0),
        }
    }

    fn store_bit(&mut self, bit: u8) {
        if !self.in_frame {
            return;
        }
        if self.bits % 8 == 0 {
            self.frame.push(0);
        }
        self.frame[self.bits / 8] |= bit << (self.bits % 8);
        self.bits += 1;
        if bit == 0 {
            self.last_zero_stored = true;
        }

        // Longest signal unit plus the flag bits stored ahead of the closing flag
        if self.bits > SU_MAX_LEN * 8 + 7 {
            tracing::trace!("frame exceeds {} octets", SU_MAX_LEN);
            self.events.push_back(DeframerEvent::BadFrame(PduParseErr::FrameTooLong { len: self.bits / 8 }));
            self.in_frame = false;
            self.clear_frame();
            self.start_octet_counting();
        }
    }

    fn end_of_frame(&mut self) {
        // The flag's zero and its six ones were stored as data
        let flag_bits = 6 + self.last_zero_stored as usize;
        let nbits = self.bits.saturating_sub(flag_bits);
        if nbits == 0 {
            // Flag fill
            return;
        }
        if nbits % 8 != 0 {
            self.events.push_back(DeframerEvent::BadFrame(PduParseErr::NotOctetAligned { bits: nbits }));
            return;
        }
        let len = nbits / 8;
        if len < SU_MIN_LEN {
            self.events.push_back(DeframerEvent::BadFrame(PduParseErr::FrameTooShort { len }));
            return;
        }

        if self.octet_counting {
            tracing::trace!("octet counting ends");
            self.octet_counting = false;
            self.octet_count_bits = 0;
        }
        let mut frame = std::mem::take(&mut self.frame);
        frame.truncate(len);
        self.events.push_back(DeframerEvent::Frame(frame));
    }

    fn clear_frame(&mut self) {
        self.frame.clear();
        self.bits = 0;
        self.last_zero_stored = false;
    }

    fn start_octet_counting(&mut self) {
        if !self.octet_counting {
            self.octet_counting = true;
            self.octet_count_bits = 0;
            self.events.push_back(DeframerEvent::OctetCountingStart);
        }
    }
}

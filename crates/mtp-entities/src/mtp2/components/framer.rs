use std::collections::VecDeque;

/// Opening/closing flag, 0111 1110 on the line
pub const HDLC_FLAG: u8 = 0x7e;

/// Appends the bits of `frame` in transmission order (LSB of each octet first),
/// inserting a zero after every run of five ones.
pub fn stuff_frame(frame: &[u8], out: &mut VecDeque<u8>) {
    let mut ones = 0;
    for &byte in frame {
        for i in 0..8 {
            let bit = (byte >> i) & 1;
            out.push_back(bit);
            if bit == 1 {
                ones += 1;
                if ones == 5 {
                    out.push_back(0);
                    ones = 0;
                }
            } else {
                ones = 0;
            }
        }
    }
}

/// Transmit side of the HDLC framing.
///
/// Each frame is preceded by a flag. The flag of the following frame closes it,
/// so back-to-back frames share a single flag. When no frame is available, flags
/// are sent as fill.
#[derive(Debug, Default)]
pub struct HdlcFramer {
    bits: VecDeque<u8>,
}

impl HdlcFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once all bits of the previous frame have been sent
    pub fn needs_frame(&self) -> bool {
        self.bits.is_empty()
    }

    /// Queues a flag followed by the stuffed frame. `None` queues a flag only.
    pub fn load_frame(&mut self, frame: Option<&[u8]>) {
        for i in 0..8 {
            self.bits.push_back((HDLC_FLAG >> i) & 1);
        }
        if let Some(frame) = frame {
            stuff_frame(frame, &mut self.bits);
        }
    }

    /// Next bit on the line. Sends flag fill if nothing was loaded.
    pub fn next_bit(&mut self) -> u8 {
        if self.bits.is_empty() {
            self.load_frame(None);
        }
        self.bits.pop_front().unwrap_or(0)
    }

    /// Bits still to be sent for the current frame
    pub fn pending_bits(&self) -> usize {
        self.bits.len()
    }
}

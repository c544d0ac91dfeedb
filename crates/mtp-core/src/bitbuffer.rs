use std::fmt;

use crate::pdu_parse_error::PduParseErr;

/// Bit-level view on an octet buffer, in SS7 transmission order.
///
/// Bits are numbered in the order they appear on the serial link: the least
/// significant bit of each octet comes first. Multi-bit fields are likewise
/// stored least significant bit first, so a 14-bit point code written at
/// offset 0 occupies the whole first octet and the low six bits of the second.
pub struct BitBuffer {
    buffer: Vec<u8>,
    pos: usize,              // next bit offset for read/write
    end: usize,              // bits at or after this are out of window
    flag_autoexpand: bool,   // if true, writes grow the buffer and move the end pointer
}

impl BitBuffer {
    /// Create a zeroed buffer capable of holding exactly `len_bits` bits.
    pub fn new(len_bits: usize) -> Self {
        BitBuffer {
            buffer: vec![0; len_bits.div_ceil(8)],
            pos: 0,
            end: len_bits,
            flag_autoexpand: false,
        }
    }

    /// Create an empty buffer with an initial capacity. Writes advance the end pointer
    /// and reallocate when needed.
    pub fn new_autoexpand(initial_max_len_bits: usize) -> Self {
        BitBuffer {
            buffer: Vec::with_capacity(initial_max_len_bits.div_ceil(8)),
            pos: 0,
            end: 0,
            flag_autoexpand: true,
        }
    }

    /// Wrap an existing byte-vector. No new allocation is needed here.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len_bits = data.len() * 8;
        BitBuffer {
            buffer: data,
            pos: 0,
            end: len_bits,
            flag_autoexpand: false,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Construct a BitBuffer from a string of '0'/'1' characters, in transmission order.
    /// Panics if any other character is encountered.
    pub fn from_bitstr(bitstr: &str) -> Self {
        let mut buf = BitBuffer::new(bitstr.len());
        for c in bitstr.chars() {
            match c {
                '0' => buf.write_bit(0),
                '1' => buf.write_bit(1),
                other => panic!("from_bitstr: invalid character `{}`; only '0' or '1' allowed", other),
            }
        }
        buf.pos = 0;
        buf
    }

    /// Peek `num_bits` at the current pos, without advancing.
    /// Returns None on overflow or if `num_bits>64`.
    pub fn peek_bits(&self, num_bits: usize) -> Option<u64> {
        if num_bits > 64 || self.pos + num_bits > self.end {
            return None;
        }
        Some(self.read_bits_at_unchecked(self.pos, num_bits))
    }

    /// Read `num_bits` at the current pos, advancing on success.
    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        let v = self.peek_bits(num_bits)?;
        self.pos += num_bits;
        Some(v)
    }

    /// Similar to read_bits, but returns a PduParseErr::BufferEnded naming the field
    /// if not enough bits are available.
    pub fn read_field(&mut self, num_bits: usize, field: &'static str) -> Result<u64, PduParseErr> {
        self.read_bits(num_bits).ok_or(PduParseErr::BufferEnded { field: Some(field) })
    }

    /// Returns all remaining octets. The position must be octet aligned.
    pub fn read_remaining_bytes(&mut self, field: &'static str) -> Result<Vec<u8>, PduParseErr> {
        if self.pos % 8 != 0 {
            return Err(PduParseErr::Inconsistency { field, reason: "not octet aligned" });
        }
        let start = self.pos / 8;
        let end = self.end / 8;
        self.pos = end * 8;
        Ok(self.buffer[start..end].to_vec())
    }

    pub fn write_bit(&mut self, bit: u8) {
        self.write_bits(bit as u64, 1);
    }

    /// Write the `num_bits` least significant bits of `value`, least significant first.
    /// Panics when writing beyond the end of a fixed-size buffer.
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        assert!(num_bits <= 64, "write_bits: num_bits {} > 64", num_bits);
        if num_bits < 64 {
            assert!(value >> num_bits == 0, "write_bits: value {:#x} exceeds {} bits", value, num_bits);
        }

        let new_pos = self.pos + num_bits;
        if new_pos > self.end {
            if self.flag_autoexpand {
                self.end = new_pos;
                let needed = new_pos.div_ceil(8);
                if self.buffer.len() < needed {
                    self.buffer.resize(needed, 0);
                }
            } else {
                panic!("write_bits: write of {} bits at {} beyond end {}", num_bits, self.pos, self.end);
            }
        }

        for i in 0..num_bits {
            let bit_pos = self.pos + i;
            let mask = 1u8 << (bit_pos % 8);
            if (value >> i) & 1 == 1 {
                self.buffer[bit_pos / 8] |= mask;
            } else {
                self.buffer[bit_pos / 8] &= !mask;
            }
        }
        self.pos = new_pos;
    }

    /// Append whole octets
    pub fn write_bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.write_bits(b as u64, 8);
        }
    }

    pub fn get_len(&self) -> usize {
        self.end
    }

    pub fn get_len_remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// Move the position to an absolute bit offset
    pub fn seek(&mut self, offset: usize) {
        assert!(offset <= self.end, "seek: offset {} beyond end {}", offset, self.end);
        self.pos = offset;
    }

    /// Buffer contents, trailing partial octet included
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.end.div_ceil(8)]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.end.div_ceil(8));
        self.buffer
    }

    /// Hex dump of all octets in the window
    pub fn dump_hex(&self) -> String {
        self.as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bits in transmission order
    pub fn dump_bin(&self) -> String {
        let mut s = String::with_capacity(self.end);
        for i in 0..self.end {
            s.push(if self.read_bits_at_unchecked(i, 1) == 1 { '1' } else { '0' });
        }
        s
    }

    fn read_bits_at_unchecked(&self, bit_pos: usize, num_bits: usize) -> u64 {
        let mut value = 0u64;
        for i in 0..num_bits {
            let p = bit_pos + i;
            let bit = (self.buffer[p / 8] >> (p % 8)) & 1;
            value |= (bit as u64) << i;
        }
        value
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer {{ pos: {}, end: {}, data: {} }}", self.pos, self.end, self.dump_hex())
    }
}

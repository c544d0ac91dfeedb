/// CRC-16 (ITU-T X.25 / HDLC FCS), reflected form as used for the check bits of signal units.
/// Octets are processed LSB first, matching the transmission order on the link.
pub const GEN_POLY_REFLECTED: u16 = 0x8408;
pub const CRC_INIT: u16 = 0xffff;

/// Residue left in the register after running the CRC over data plus its (inverted) check bits
pub const CRC_GOOD_RESIDUE: u16 = 0xf0b8;

/// Run the CRC register over `input`, starting with `crc`. Returns the raw register.
pub fn crc16_x25_update(mut crc: u16, input: &[u8]) -> u16 {
    for &byte in input {
        crc ^= byte as u16;
        for _ in 0..8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ GEN_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Check bits for a signal unit: initial 0xffff, inverted result.
/// Transmitted low octet first.
pub fn crc16_x25(input: &[u8]) -> u16 {
    !crc16_x25_update(CRC_INIT, input)
}

/// Verifies a frame that ends with its two check octets (low octet first)
pub fn crc16_x25_check(frame: &[u8]) -> bool {
    if frame.len() < 2 {
        return false;
    }
    crc16_x25_update(CRC_INIT, frame) == CRC_GOOD_RESIDUE
}

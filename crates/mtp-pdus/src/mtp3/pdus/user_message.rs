use mtp_core::pdu_parse_error::*;
use mtp_core::BitBuffer;
use mtp_core::let_field;

use crate::mtp3::fields::routing_label::{ROUTING_LABEL_LEN, RoutingLabel};

/// Octets in front of the user data: routing label, ident and opcode
pub const USER_MESSAGE_HEADER_LEN: usize = ROUTING_LABEL_LEN + 2;

/// Signalling information field of a user message exchanged between base station and switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub label: RoutingLabel,
    // 8
    pub ident: u8,
    // 8
    pub opcode: u8,
    pub data: Vec<u8>,
}

impl UserMessage {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let label = RoutingLabel::from_bitbuf(buf)?;
        let_field!(buf, ident, 8);
        let_field!(buf, opcode, 8);
        let data = buf.read_remaining_bytes("data")?;

        Ok(UserMessage {
            label,
            ident: ident as u8,
            opcode: opcode as u8,
            data,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        self.label.to_bitbuf(buf);
        buf.write_bits(self.ident as u64, 8);
        buf.write_bits(self.opcode as u64, 8);
        buf.write_bytes(&self.data);
    }

    pub fn from_sif(sif: &[u8]) -> Result<Self, PduParseErr> {
        if sif.len() < USER_MESSAGE_HEADER_LEN {
            return Err(PduParseErr::InconsistentLength {
                expected: USER_MESSAGE_HEADER_LEN,
                found: sif.len(),
            });
        }
        Self::from_bitbuf(&mut BitBuffer::from_bytes(sif))
    }

    pub fn to_sif(&self) -> Vec<u8> {
        let mut buf = BitBuffer::new_autoexpand((USER_MESSAGE_HEADER_LEN + self.data.len()) * 8);
        self.to_bitbuf(&mut buf);
        buf.into_bytes()
    }
}

impl core::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "user_message {{")?;
        write!(f, "  {}", self.label)?;
        write!(f, "  ident: {:02x}", self.ident)?;
        write!(f, "  opcode: {:02x}", self.opcode)?;
        write!(f, "  data_len: {}", self.data.len())?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use mtp_core::debug;
    use mtp_core::PointCode;

    use crate::mtp2::pdus::signal_unit::{SignalUnit, SuBody};

    use super::*;

    #[test]
    fn test_user_message_in_msu() {
        debug::setup_logging_verbose();
        let payload = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let frame = SignalUnit::msu(0, true, 1, true, 0xcd, payload.clone()).to_frame();

        let su = SignalUnit::from_frame(&frame).expect("Failed parsing");
        let SuBody::Msu { sio, sif } = su.body else {
            panic!("not an MSU");
        };
        assert_eq!(sio, 0xcd);

        let msg = UserMessage::from_sif(&sif).expect("Failed parsing");
        tracing::info!("Parsed: {}", msg);
        assert_eq!(msg.label.dcp, PointCode::from_raw(0x0201));
        assert_eq!(msg.label.ocp, PointCode::from_raw((0x02 >> 6) | (0x03 << 2) | ((0x04 & 0x0f) << 10)));
        assert_eq!(msg.label.slc, 0x04 >> 4);
        assert_eq!(msg.ident, 0x05);
        assert_eq!(msg.opcode, 0x06);
        assert!(msg.data.is_empty());

        assert_eq!(msg.to_sif(), payload);
    }

    #[test]
    fn test_user_message_with_data() {
        let msg = UserMessage {
            label: RoutingLabel {
                dcp: PointCode::from_raw(2),
                ocp: PointCode::from_raw(1),
                slc: 3,
            },
            ident: 0x10,
            opcode: 0x42,
            data: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let sif = msg.to_sif();
        assert_eq!(sif.len(), USER_MESSAGE_HEADER_LEN + 4);
        assert_eq!(UserMessage::from_sif(&sif).unwrap(), msg);
    }

    #[test]
    fn test_short_user_message() {
        assert!(UserMessage::from_sif(&[1, 2, 3, 4, 5]).is_err());
    }
}

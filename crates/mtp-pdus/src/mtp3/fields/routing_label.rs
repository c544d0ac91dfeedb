use mtp_core::pdu_parse_error::*;
use mtp_core::{BitBuffer, PointCode, POINT_CODE_BITS, SLC_BITS};
use mtp_core::let_field;

/// Octets of the routing label
pub const ROUTING_LABEL_LEN: usize = 4;

/// Q.704 2.2 Routing label in front of every user message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingLabel {
    // 14, destination point code
    pub dcp: PointCode,
    // 14, originating point code
    pub ocp: PointCode,
    // 4
    pub slc: u8,
}

impl RoutingLabel {
    pub fn from_bitbuf(buf: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let_field!(buf, dcp, POINT_CODE_BITS);
        let_field!(buf, ocp, POINT_CODE_BITS);
        let_field!(buf, slc, SLC_BITS);

        Ok(RoutingLabel {
            dcp: PointCode::from_raw(dcp),
            ocp: PointCode::from_raw(ocp),
            slc: slc as u8,
        })
    }

    pub fn to_bitbuf(&self, buf: &mut BitBuffer) {
        buf.write_bits(self.dcp.value() as u64, POINT_CODE_BITS);
        buf.write_bits(self.ocp.value() as u64, POINT_CODE_BITS);
        buf.write_bits((self.slc & 0x0f) as u64, SLC_BITS);
    }

    /// Splits a signalling information field into label and the octets following it
    pub fn split_sif(sif: &[u8]) -> Result<(Self, &[u8]), PduParseErr> {
        if sif.len() < ROUTING_LABEL_LEN {
            return Err(PduParseErr::BufferEnded { field: Some("routing_label") });
        }
        let mut buf = BitBuffer::from_bytes(&sif[..ROUTING_LABEL_LEN]);
        let label = Self::from_bitbuf(&mut buf)?;
        Ok((label, &sif[ROUTING_LABEL_LEN..]))
    }

    pub fn to_bytes(&self) -> [u8; ROUTING_LABEL_LEN] {
        let mut buf = BitBuffer::new(ROUTING_LABEL_LEN * 8);
        self.to_bitbuf(&mut buf);
        let mut out = [0u8; ROUTING_LABEL_LEN];
        out.copy_from_slice(buf.as_bytes());
        out
    }
}

impl core::fmt::Display for RoutingLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dcp={} ocp={} slc={}", self.dcp, self.ocp, self.slc)
    }
}

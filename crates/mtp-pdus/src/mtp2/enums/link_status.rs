use mtp_saps::l2::Mtp2Prim;

/// Q.703 11.2 Status field of a link status signal unit
/// Bits: 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkStatus {
    /// Out of alignment
    Sio = 0,
    /// Normal alignment
    Sin = 1,
    /// Emergency alignment
    Sie = 2,
    /// Out of service
    Sios = 3,
    /// Processor outage
    Sipo = 4,
    /// Busy
    Sib = 5,
    Spare6 = 6,
    Spare7 = 7,
}

impl std::convert::TryFrom<u64> for LinkStatus {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(LinkStatus::Sio),
            1 => Ok(LinkStatus::Sin),
            2 => Ok(LinkStatus::Sie),
            3 => Ok(LinkStatus::Sios),
            4 => Ok(LinkStatus::Sipo),
            5 => Ok(LinkStatus::Sib),
            6 => Ok(LinkStatus::Spare6),
            7 => Ok(LinkStatus::Spare7),
            _ => Err(()),
        }
    }
}

impl LinkStatus {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }

    /// Event fed to the link state machine when this status is received.
    /// Spare codes have no meaning and produce no event.
    pub fn as_event(self) -> Option<Mtp2Prim> {
        match self {
            LinkStatus::Sio => Some(Mtp2Prim::Sio),
            LinkStatus::Sin => Some(Mtp2Prim::Sin),
            LinkStatus::Sie => Some(Mtp2Prim::Sie),
            LinkStatus::Sios => Some(Mtp2Prim::Sios),
            LinkStatus::Sipo => Some(Mtp2Prim::Sipo),
            LinkStatus::Sib => Some(Mtp2Prim::Sib),
            LinkStatus::Spare6 | LinkStatus::Spare7 => None,
        }
    }
}

impl From<LinkStatus> for u64 {
    fn from(e: LinkStatus) -> Self { e.into_raw() }
}

impl core::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkStatus::Sio => write!(f, "SIO"),
            LinkStatus::Sin => write!(f, "SIN"),
            LinkStatus::Sie => write!(f, "SIE"),
            LinkStatus::Sios => write!(f, "SIOS"),
            LinkStatus::Sipo => write!(f, "SIPO"),
            LinkStatus::Sib => write!(f, "SIB"),
            LinkStatus::Spare6 => write!(f, "Spare6"),
            LinkStatus::Spare7 => write!(f, "Spare7"),
        }
    }
}

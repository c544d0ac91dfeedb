/// Service access points between the entities of the stack
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sap {
    /// Phy/Mtp2, blocks of octets carrying the serial bit stream
    PhSap,
    /// Mtp2/Mtp3, link control and message transfer
    L2Sap,
    /// Mtp3/User, MTP-TRANSFER and link status
    L3Sap,
}

/// Link speed class. Selects the timer and monitor profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkSpeed {
    /// 64 kbit/s and above
    Rate64k,
    /// 4.8 kbit/s and below
    Rate4k8,
}

impl LinkSpeed {
    pub fn from_bit_rate(bit_rate: u32) -> Self {
        if bit_rate >= 64000 {
            LinkSpeed::Rate64k
        } else {
            LinkSpeed::Rate4k8
        }
    }
}

impl core::fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkSpeed::Rate64k => write!(f, "64k"),
            LinkSpeed::Rate4k8 => write!(f, "4.8k"),
        }
    }
}

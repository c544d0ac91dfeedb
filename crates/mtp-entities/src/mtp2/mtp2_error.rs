/// Reasons a message handed to the signalling link is not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mtp2Error {
    /// Messages are only accepted while the link is in service
    NotInService,
    /// 127 messages are awaiting acknowledgement, no sequence number is free
    Congested,
    /// Signalling information shorter than two octets would be read as a status unit
    SifTooShort(usize),
}

impl core::fmt::Display for Mtp2Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Mtp2Error::NotInService => write!(f, "link not in service"),
            Mtp2Error::Congested => write!(f, "retransmission buffer full"),
            Mtp2Error::SifTooShort(len) => write!(f, "signalling information of {} octets too short", len),
        }
    }
}

impl std::error::Error for Mtp2Error {}

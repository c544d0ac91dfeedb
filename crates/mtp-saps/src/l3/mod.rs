use mtp_core::Sio;

use crate::l2::{Mtp2Prim, OutOfServiceCause};


/// Control requests from the user, passed straight through to the signalling link
#[derive(Debug)]
pub struct L3ControlReq {
    pub prim: Mtp2Prim,
}

/// MTP-TRANSFER request. Mtp3 prepends the routing label.
#[derive(Debug)]
pub struct L3TransferReq {
    /// Signalling link code, 4 bits
    pub slc: u8,
    pub data: Vec<u8>,
}

/// Indications delivered to the user of the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L3Ind {
    InService,
    OutOfService(OutOfServiceCause),
    RemoteProcessorOutage,
    RemoteProcessorRecovered,
    /// MTP-TRANSFER indication, routing label already removed
    Transfer { sio: Sio, slc: u8, data: Vec<u8> },
}

impl core::fmt::Display for L3Ind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            L3Ind::InService => write!(f, "IN_SERVICE"),
            L3Ind::OutOfService(cause) => write!(f, "OUT_OF_SERVICE ({})", cause),
            L3Ind::RemoteProcessorOutage => write!(f, "REMOTE_PROCESSOR_OUTAGE"),
            L3Ind::RemoteProcessorRecovered => write!(f, "REMOTE_PROCESSOR_RECOVERED"),
            L3Ind::Transfer { sio, slc, data } => write!(f, "DATA sio={:02x} slc={} len={}", sio, slc, data.len()),
        }
    }
}

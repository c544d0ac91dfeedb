pub mod mtp2_prim;
pub mod out_of_service_cause;

pub use mtp2_prim::Mtp2Prim;
pub use out_of_service_cause::OutOfServiceCause;

use mtp_core::Sio;


/// Layer 3 requests a link control action (start, stop, emergency, local outage)
#[derive(Debug)]
pub struct L2ControlReq {
    pub prim: Mtp2Prim,
}

/// Layer 3 hands a message to the signalling link for transmission
#[derive(Debug)]
pub struct L2DataReq {
    pub sio: Sio,
    /// Signalling information field, routing label included
    pub sif: Vec<u8>,
}

/// Indications from the signalling link to Layer 3
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L2Ind {
    InService,
    OutOfService(OutOfServiceCause),
    RemoteProcessorOutage,
    RemoteProcessorRecovered,
    /// Accepted message signal unit
    Data { sio: Sio, sif: Vec<u8> },
}

impl core::fmt::Display for L2Ind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            L2Ind::InService => write!(f, "IN_SERVICE"),
            L2Ind::OutOfService(cause) => write!(f, "OUT_OF_SERVICE ({})", cause),
            L2Ind::RemoteProcessorOutage => write!(f, "REMOTE_PROCESSOR_OUTAGE"),
            L2Ind::RemoteProcessorRecovered => write!(f, "REMOTE_PROCESSOR_RECOVERED"),
            L2Ind::Data { sio, sif } => write!(f, "DATA sio={:02x} len={}", sio, sif.len()),
        }
    }
}

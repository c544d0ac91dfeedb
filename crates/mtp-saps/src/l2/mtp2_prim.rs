/// Events driving the signalling link state machine.
///
/// Requests from Layer 3, status units and frames received from the peer,
/// timer expiries and the outputs of the error monitors all arrive as one
/// of these and are applied one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mtp2Prim {
    // Requests from Layer 3
    PowerOn = 0,
    Emergency = 1,
    EmergencyCeases = 2,
    LocalProcessorOutage = 3,
    LocalProcessorRecovered = 4,
    Start = 7,
    Stop = 8,

    // Received status units
    Sios = 12,
    Sio = 13,
    Sin = 14,
    Sie = 15,
    Sipo = 16,
    Sib = 17,

    // Received frames
    Msu = 18,
    Fisu = 19,

    // Timer expiry
    T1Timeout = 20,
    T2Timeout = 21,
    T3Timeout = 22,
    T4Timeout = 23,

    // Error monitors
    CorrectSu = 24,
    AbortProving = 25,
    LinkFailure = 26,
}

impl Mtp2Prim {
    /// True for the primitives Layer 3 may issue
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Mtp2Prim::PowerOn
                | Mtp2Prim::Emergency
                | Mtp2Prim::EmergencyCeases
                | Mtp2Prim::LocalProcessorOutage
                | Mtp2Prim::LocalProcessorRecovered
                | Mtp2Prim::Start
                | Mtp2Prim::Stop
        )
    }

    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl std::convert::TryFrom<u64> for Mtp2Prim {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(Mtp2Prim::PowerOn),
            1 => Ok(Mtp2Prim::Emergency),
            2 => Ok(Mtp2Prim::EmergencyCeases),
            3 => Ok(Mtp2Prim::LocalProcessorOutage),
            4 => Ok(Mtp2Prim::LocalProcessorRecovered),
            7 => Ok(Mtp2Prim::Start),
            8 => Ok(Mtp2Prim::Stop),
            12 => Ok(Mtp2Prim::Sios),
            13 => Ok(Mtp2Prim::Sio),
            14 => Ok(Mtp2Prim::Sin),
            15 => Ok(Mtp2Prim::Sie),
            16 => Ok(Mtp2Prim::Sipo),
            17 => Ok(Mtp2Prim::Sib),
            18 => Ok(Mtp2Prim::Msu),
            19 => Ok(Mtp2Prim::Fisu),
            20 => Ok(Mtp2Prim::T1Timeout),
            21 => Ok(Mtp2Prim::T2Timeout),
            22 => Ok(Mtp2Prim::T3Timeout),
            23 => Ok(Mtp2Prim::T4Timeout),
            24 => Ok(Mtp2Prim::CorrectSu),
            25 => Ok(Mtp2Prim::AbortProving),
            26 => Ok(Mtp2Prim::LinkFailure),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for Mtp2Prim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Mtp2Prim::PowerOn => "POWER_ON",
            Mtp2Prim::Emergency => "EMERGENCY",
            Mtp2Prim::EmergencyCeases => "EMERGENCY_CEASES",
            Mtp2Prim::LocalProcessorOutage => "LOCAL_PROCESSOR_OUTAGE",
            Mtp2Prim::LocalProcessorRecovered => "LOCAL_PROCESSOR_RECOVERED",
            Mtp2Prim::Start => "START",
            Mtp2Prim::Stop => "STOP",
            Mtp2Prim::Sios => "SIOS",
            Mtp2Prim::Sio => "SIO",
            Mtp2Prim::Sin => "SIN",
            Mtp2Prim::Sie => "SIE",
            Mtp2Prim::Sipo => "SIPO",
            Mtp2Prim::Sib => "SIB",
            Mtp2Prim::Msu => "MSU",
            Mtp2Prim::Fisu => "FISU",
            Mtp2Prim::T1Timeout => "T1_TIMEOUT",
            Mtp2Prim::T2Timeout => "T2_TIMEOUT",
            Mtp2Prim::T3Timeout => "T3_TIMEOUT",
            Mtp2Prim::T4Timeout => "T4_TIMEOUT",
            Mtp2Prim::CorrectSu => "CORRECT_SU",
            Mtp2Prim::AbortProving => "ABORT_PROVING",
            Mtp2Prim::LinkFailure => "LINK_FAILURE",
        };
        write!(f, "{}", s)
    }
}

/// Cause reported with an OUT_OF_SERVICE indication
/// Bits: 8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutOfServiceCause {
    /// T2 expired while waiting for the peer to align
    AlignmentTimeout = 1,
    /// Link failure detected locally (T1, error rate monitor)
    LinkFailureLocal = 2,
    /// Link failure signalled by the peer (status units while aligned)
    LinkFailureRemote = 3,
    /// Proving aborted too often
    ProvingFailureLocal = 4,
    /// Peer fell out of alignment during alignment or proving
    ProvingFailureRemote = 5,
    /// T3 expired before proving could start
    ProvingTimeout = 6,
}

impl std::convert::TryFrom<u64> for OutOfServiceCause {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            1 => Ok(OutOfServiceCause::AlignmentTimeout),
            2 => Ok(OutOfServiceCause::LinkFailureLocal),
            3 => Ok(OutOfServiceCause::LinkFailureRemote),
            4 => Ok(OutOfServiceCause::ProvingFailureLocal),
            5 => Ok(OutOfServiceCause::ProvingFailureRemote),
            6 => Ok(OutOfServiceCause::ProvingTimeout),
            _ => Err(()),
        }
    }
}

impl OutOfServiceCause {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u64
    }
}

impl From<OutOfServiceCause> for u64 {
    fn from(e: OutOfServiceCause) -> Self { e.into_raw() }
}

impl core::fmt::Display for OutOfServiceCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OutOfServiceCause::AlignmentTimeout => write!(f, "alignment timeout"),
            OutOfServiceCause::LinkFailureLocal => write!(f, "link failure (local)"),
            OutOfServiceCause::LinkFailureRemote => write!(f, "link failure (remote)"),
            OutOfServiceCause::ProvingFailureLocal => write!(f, "proving failure (local)"),
            OutOfServiceCause::ProvingFailureRemote => write!(f, "proving failure (remote)"),
            OutOfServiceCause::ProvingTimeout => write!(f, "proving timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_codes() {
        for raw in 1..=6u64 {
            let cause = OutOfServiceCause::try_from(raw).unwrap();
            assert_eq!(cause.into_raw(), raw);
        }
        assert!(OutOfServiceCause::try_from(0).is_err());
        assert!(OutOfServiceCause::try_from(7).is_err());
    }
}

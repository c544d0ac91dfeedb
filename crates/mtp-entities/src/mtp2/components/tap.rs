use mtp_core::PduParseErr;
use mtp_pdus::mtp2::pdus::signal_unit::SignalUnit;

/// Decision of a tap on a received signal unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapVerdict {
    /// Continue with standard processing
    Process,
    /// The tap handled it, the link does not see it
    Consume,
}

/// Hook on the receive path, called for every decoded signal unit and every bad frame
/// before the link processes them. Used to run the link as a passive monitor.
pub trait SignalUnitTap: Send {
    fn on_signal_unit(&mut self, link: &str, su: &SignalUnit) -> TapVerdict;

    fn on_bad_frame(&mut self, _link: &str, _err: &PduParseErr) -> TapVerdict {
        TapVerdict::Process
    }
}

/// Passes everything on to the link
#[derive(Debug, Default)]
pub struct StandardTap;

impl SignalUnitTap for StandardTap {
    fn on_signal_unit(&mut self, _link: &str, _su: &SignalUnit) -> TapVerdict {
        TapVerdict::Process
    }
}

/// Sniffer: logs every signal unit and keeps it away from the link.
/// Fill-in signal units repeating the previous one are only counted.
#[derive(Debug, Default)]
pub struct LoggingTap {
    last_fisu: Option<SignalUnit>,
    repeated: u64,
    pub signal_units: u64,
    pub bad_frames: u64,
}

impl SignalUnitTap for LoggingTap {
    fn on_signal_unit(&mut self, link: &str, su: &SignalUnit) -> TapVerdict {
        self.signal_units += 1;
        if su.kind() == "FISU" && self.last_fisu.as_ref() == Some(su) {
            self.repeated += 1;
            return TapVerdict::Consume;
        }
        if self.repeated > 0 {
            tracing::info!(link = %link, "<- previous FISU repeated {} times", self.repeated);
            self.repeated = 0;
        }
        self.last_fisu = if su.kind() == "FISU" { Some(su.clone()) } else { None };
        tracing::info!(link = %link, "<- {}", su);
        TapVerdict::Consume
    }

    fn on_bad_frame(&mut self, link: &str, err: &PduParseErr) -> TapVerdict {
        self.bad_frames += 1;
        tracing::info!(link = %link, "<- bad frame: {}", err);
        TapVerdict::Consume
    }
}

#[cfg(test)]
mod tests {
    use mtp_pdus::mtp2::enums::link_status::LinkStatus;

    use super::*;

    #[test]
    fn test_logging_tap_consumes() {
        let mut tap = LoggingTap::default();
        let fisu = SignalUnit::fisu(1, true, 2, true);
        assert_eq!(tap.on_signal_unit("mon", &fisu), TapVerdict::Consume);
        assert_eq!(tap.on_signal_unit("mon", &fisu), TapVerdict::Consume);
        assert_eq!(tap.repeated, 1);
        let lssu = SignalUnit::lssu(1, true, 2, true, LinkStatus::Sin);
        assert_eq!(tap.on_signal_unit("mon", &lssu), TapVerdict::Consume);
        assert_eq!(tap.repeated, 0);
        assert_eq!(tap.on_bad_frame("mon", &PduParseErr::FrameTooShort { len: 2 }), TapVerdict::Consume);
        assert_eq!((tap.signal_units, tap.bad_frames), (3, 1));
    }

    #[test]
    fn test_standard_tap() {
        let mut tap = StandardTap;
        let fisu = SignalUnit::fisu(1, true, 2, true);
        assert_eq!(tap.on_signal_unit("bs", &fisu), TapVerdict::Process);
        assert_eq!(tap.on_bad_frame("bs", &PduParseErr::FrameTooShort { len: 2 }), TapVerdict::Process);
    }
}

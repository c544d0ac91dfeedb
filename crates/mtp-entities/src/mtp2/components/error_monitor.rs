use mtp_saps::l2::Mtp2Prim;

/// AERM threshold during normal proving
pub const TI_NORMAL: u32 = 4;
/// AERM threshold during emergency proving
pub const TI_EMERGENCY: u32 = 1;
/// SUERM threshold
pub const SUERM_T: u32 = 16;
/// SUERM leak: good signal units per decrement
pub const SUERM_D: u32 = 256;

/// Q.703 10 Error rate monitoring.
///
/// The alignment error rate monitor (AERM) runs while proving, the signal unit error
/// rate monitor (SUERM) once proving has completed. Both are fed with good and bad
/// signal units and return the event to feed to the state machine, if any.
#[derive(Debug, Default)]
pub struct ErrorMonitor {
    ignore: bool,
    pub proving_errors: u32,
    /// Abort proving already reported for this proving period
    aerm_fired: bool,
    pub monitor_errors: u32,
    pub monitor_good: u32,
}

impl ErrorMonitor {
    pub fn new(ignore: bool) -> Self {
        ErrorMonitor { ignore, ..Default::default() }
    }

    pub fn reset(&mut self) {
        self.reset_aerm();
        self.reset_suerm();
    }

    pub fn reset_aerm(&mut self) {
        self.proving_errors = 0;
        self.aerm_fired = false;
    }

    pub fn reset_suerm(&mut self) {
        self.monitor_errors = 0;
        self.monitor_good = 0;
    }

    /// AERM: a correctly received signal unit
    pub fn aerm_good(&mut self) -> Option<Mtp2Prim> {
        if self.ignore {
            return None;
        }
        Some(Mtp2Prim::CorrectSu)
    }

    /// AERM: a bad frame or 16 octets of octet counting.
    /// Fires once per proving period, as soon as the error count is at or above `ti`.
    /// `ti` may drop while proving when emergency alignment starts.
    pub fn aerm_error(&mut self, ti: u32) -> Option<Mtp2Prim> {
        if self.ignore {
            return None;
        }
        self.proving_errors += 1;
        tracing::debug!("proving error {}/{}", self.proving_errors, ti);
        if !self.aerm_fired && self.proving_errors >= ti {
            self.aerm_fired = true;
            Some(Mtp2Prim::AbortProving)
        } else {
            None
        }
    }

    /// SUERM: a correctly received signal unit
    pub fn suerm_good(&mut self) {
        if self.ignore {
            return;
        }
        self.monitor_good += 1;
        if self.monitor_good >= SUERM_D {
            self.monitor_good = 0;
            if self.monitor_errors > 0 {
                self.monitor_errors -= 1;
                tracing::trace!("link error count down to {}", self.monitor_errors);
            }
        }
    }

    /// SUERM: a bad frame or 16 octets of octet counting
    pub fn suerm_error(&mut self) -> Option<Mtp2Prim> {
        if self.ignore {
            return None;
        }
        self.monitor_good = 0;
        self.monitor_errors += 1;
        tracing::debug!("link error {}/{}", self.monitor_errors, SUERM_T);
        if self.monitor_errors >= SUERM_T {
            self.monitor_errors = 0;
            Some(Mtp2Prim::LinkFailure)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aerm_fires_once() {
        let mut mon = ErrorMonitor::new(false);
        for _ in 0..TI_NORMAL - 1 {
            assert_eq!(mon.aerm_error(TI_NORMAL), None);
        }
        assert_eq!(mon.aerm_error(TI_NORMAL), Some(Mtp2Prim::AbortProving));
        assert_eq!(mon.aerm_error(TI_NORMAL), None);
        mon.reset_aerm();
        assert_eq!(mon.aerm_error(TI_EMERGENCY), Some(Mtp2Prim::AbortProving));
        assert_eq!(mon.aerm_good(), Some(Mtp2Prim::CorrectSu));
    }

    #[test]
    fn test_aerm_threshold_lowered() {
        let mut mon = ErrorMonitor::new(false);
        assert_eq!(mon.aerm_error(TI_NORMAL), None);
        assert_eq!(mon.aerm_error(TI_NORMAL), None);
        // Emergency proving starts with two errors already counted
        assert_eq!(mon.aerm_error(TI_EMERGENCY), Some(Mtp2Prim::AbortProving));
        assert_eq!(mon.aerm_error(TI_EMERGENCY), None);
        assert_eq!(mon.proving_errors, 4);
    }

    #[test]
    fn test_suerm_threshold() {
        let mut mon = ErrorMonitor::new(false);
        for _ in 0..SUERM_T - 1 {
            assert_eq!(mon.suerm_error(), None);
        }
        assert_eq!(mon.suerm_error(), Some(Mtp2Prim::LinkFailure));
    }

    #[test]
    fn test_suerm_leak() {
        let mut mon = ErrorMonitor::new(false);
        mon.suerm_error();
        mon.suerm_error();
        for _ in 0..SUERM_D {
            mon.suerm_good();
        }
        assert_eq!(mon.monitor_errors, 1);
        for _ in 0..SUERM_D * 3 {
            mon.suerm_good();
        }
        assert_eq!(mon.monitor_errors, 0);

        // An error restarts the good count
        for _ in 0..SUERM_D - 1 {
            mon.suerm_good();
        }
        mon.suerm_error();
        mon.suerm_good();
        assert_eq!(mon.monitor_errors, 1);
    }

    #[test]
    fn test_ignore_monitor() {
        let mut mon = ErrorMonitor::new(true);
        for _ in 0..100 {
            assert_eq!(mon.suerm_error(), None);
            assert_eq!(mon.aerm_error(TI_EMERGENCY), None);
        }
        assert_eq!(mon.aerm_good(), None);
        assert_eq!(mon.monitor_errors, 0);
    }
}

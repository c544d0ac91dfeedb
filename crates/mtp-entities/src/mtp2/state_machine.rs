use mtp_pdus::mtp2::enums::link_status::LinkStatus;
use mtp_saps::l2::{L2Ind, Mtp2Prim, OutOfServiceCause};

use crate::mtp2::Mtp2Link;
use crate::mtp2::components::timers::Mtp2Timer;

/// Proving attempts before alignment is given up
pub const MAX_PROVING_TRIES: u8 = 5;

/// Q.703 link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mtp2State {
    PowerOff = 0,
    OutOfService = 1,
    NotAligned = 2,
    Aligned = 3,
    Proving = 4,
    AlignedReady = 5,
    AlignedNotReady = 6,
    InService = 7,
    ProcessorOutage = 8,
}

impl Mtp2State {
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl core::fmt::Display for Mtp2State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Mtp2State::PowerOff => "POWER_OFF",
            Mtp2State::OutOfService => "OUT_OF_SERVICE",
            Mtp2State::NotAligned => "NOT_ALIGNED",
            Mtp2State::Aligned => "ALIGNED",
            Mtp2State::Proving => "PROVING",
            Mtp2State::AlignedReady => "ALIGNED_READY",
            Mtp2State::AlignedNotReady => "ALIGNED_NOT_READY",
            Mtp2State::InService => "IN_SERVICE",
            Mtp2State::ProcessorOutage => "PROCESSOR_OUTAGE",
        };
        write!(f, "{}", s)
    }
}

/// Set of states a table row applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSet(u16);

impl StateSet {
    pub const ALL: StateSet = StateSet(0x1ff);

    pub const fn of(states: &[Mtp2State]) -> StateSet {
        let mut bits = 0;
        let mut i = 0;
        while i < states.len() {
            bits |= states[i].bit();
            i += 1;
        }
        StateSet(bits)
    }

    pub const fn contains(self, state: Mtp2State) -> bool {
        self.0 & state.bit() != 0
    }
}

pub type Action = fn(&mut Mtp2Link, Mtp2Prim);

pub struct StateTableRow {
    pub states: StateSet,
    pub event: Mtp2Prim,
    pub action: Action,
    pub name: &'static str,
}

macro_rules! row {
    ($states:expr, $event:ident, $action:ident) => {
        StateTableRow {
            states: $states,
            event: Mtp2Prim::$event,
            action: Mtp2Link::$action,
            name: stringify!($action),
        }
    };
}

use Mtp2State::*;

const ALL: StateSet = StateSet::ALL;
const S_NOT_ALIGNED: StateSet = StateSet::of(&[NotAligned]);
const S_ALIGNED: StateSet = StateSet::of(&[Aligned]);
const S_PROVING: StateSet = StateSet::of(&[Proving]);
const S_ALIGNED_PROVING: StateSet = StateSet::of(&[Aligned, Proving]);
const S_OUT_OF_SERVICE: StateSet = StateSet::of(&[OutOfService]);
const S_READY_NOT_READY: StateSet = StateSet::of(&[AlignedReady, AlignedNotReady]);
const S_READY: StateSet = StateSet::of(&[AlignedReady]);
const S_NOT_READY: StateSet = StateSet::of(&[AlignedNotReady]);
const S_READY_IN_SERVICE: StateSet = StateSet::of(&[AlignedReady, AlignedNotReady, InService]);
const S_LINK_UP: StateSet = StateSet::of(&[AlignedReady, AlignedNotReady, InService, ProcessorOutage]);
const S_IN_SERVICE: StateSet = StateSet::of(&[InService]);
const S_OUTAGE: StateSet = StateSet::of(&[ProcessorOutage]);

/// Rows are matched in order; the first row containing the current state and the event runs.
/// Rows for all states come first for power on and stop, last for the flag-only fallbacks.
pub static STATE_TABLE: &[StateTableRow] = &[
    row!(ALL, PowerOn, a_power_on),
    row!(ALL, Stop, a_stop),

    row!(S_ALIGNED_PROVING, Emergency, a_aligned_emergency),
    row!(S_ALIGNED_PROVING, EmergencyCeases, a_aligned_emergency_ceases),
    row!(ALL, Emergency, a_set_emergency),
    row!(ALL, EmergencyCeases, a_clear_emergency),

    row!(S_OUT_OF_SERVICE, Start, a_start),

    row!(S_NOT_ALIGNED, Sio, a_not_aligned_status),
    row!(S_NOT_ALIGNED, Sin, a_not_aligned_status),
    row!(S_NOT_ALIGNED, Sie, a_not_aligned_status),
    row!(S_NOT_ALIGNED, T2Timeout, a_alignment_timeout),

    row!(S_ALIGNED, Sin, a_start_proving),
    row!(S_ALIGNED, Sie, a_start_proving),
    row!(S_ALIGNED, Sios, a_proving_failure_remote),
    row!(S_ALIGNED, T3Timeout, a_proving_timeout),

    row!(S_PROVING, Sio, a_proving_failure_remote),
    row!(S_PROVING, Sios, a_proving_failure_remote),
    row!(S_PROVING, Sie, a_proving_sie),
    row!(S_PROVING, CorrectSu, a_correct_su),
    row!(S_PROVING, AbortProving, a_abort_proving),
    row!(S_PROVING, T4Timeout, a_proving_complete),

    row!(S_LINK_UP, LinkFailure, a_link_failure_local),
    row!(S_READY_NOT_READY, T1Timeout, a_link_failure_local),
    row!(S_LINK_UP, Sio, a_link_failure_remote),
    row!(S_LINK_UP, Sin, a_link_failure_remote),
    row!(S_LINK_UP, Sie, a_link_failure_remote),
    row!(S_LINK_UP, Sios, a_link_failure_remote),

    row!(S_READY_NOT_READY, Fisu, a_aligned_in_service),
    row!(S_READY_NOT_READY, Msu, a_aligned_in_service),
    row!(S_READY_IN_SERVICE, Sipo, a_remote_outage),

    row!(S_READY, LocalProcessorOutage, a_ready_local_outage),
    row!(S_NOT_READY, LocalProcessorRecovered, a_not_ready_local_recovered),
    row!(S_IN_SERVICE, LocalProcessorOutage, a_in_service_local_outage),

    row!(S_OUTAGE, Sipo, a_outage),
    row!(S_OUTAGE, Fisu, a_outage),
    row!(S_OUTAGE, Msu, a_outage),
    row!(S_OUTAGE, LocalProcessorOutage, a_outage),
    row!(S_OUTAGE, LocalProcessorRecovered, a_outage),

    row!(ALL, LocalProcessorOutage, a_set_local_outage),
    row!(ALL, LocalProcessorRecovered, a_clear_local_outage),
    row!(ALL, Sib, a_busy),
];

pub fn find_row(state: Mtp2State, event: Mtp2Prim) -> Option<&'static StateTableRow> {
    STATE_TABLE.iter().find(|r| r.event == event && r.states.contains(state))
}

impl Mtp2Link {
    pub(crate) fn set_state(&mut self, new_state: Mtp2State) {
        if new_state != self.state {
            tracing::info!(link = %self.name, "state {} -> {}", self.state, new_state);
            self.state = new_state;
        }
    }

    pub(crate) fn notify(&mut self, ind: L2Ind) {
        tracing::debug!(link = %self.name, "indication {}", ind);
        self.indications.push(ind);
    }

    pub(crate) fn start_timer(&mut self, timer: Mtp2Timer) {
        let duration = self.profile.duration(timer, false);
        self.timers.start(timer, self.now, duration);
    }

    /// Arms T4, with the emergency duration if either side asks for emergency alignment
    fn start_t4(&mut self) {
        let emergency = self.local_emergency || self.remote_emergency;
        self.t4_emergency = emergency;
        let duration = self.profile.duration(Mtp2Timer::T4, emergency);
        self.timers.start(Mtp2Timer::T4, self.now, duration);
    }

    /// Switches a running normal proving period to the emergency duration
    fn upgrade_t4(&mut self) {
        if !self.t4_emergency && self.timers.is_running(Mtp2Timer::T4) {
            tracing::debug!(link = %self.name, "proving switches to emergency");
            self.timers.stop(Mtp2Timer::T4);
            self.start_t4();
        }
    }

    /// Out of service: nothing queued, SIOS sent, no timers, sequence numbers back to 127
    fn reset_link(&mut self) {
        self.rtb.reset();
        self.tx_lssu = Some(LinkStatus::Sios);
        self.timers.stop_all();
        self.monitor.reset();
        self.further_proving = false;
        self.proving_tries = 0;
        self.t4_emergency = false;
        self.remote_emergency = false;
        self.remote_outage = false;
        self.remote_recovery_pending = false;
        self.set_state(OutOfService);
    }

    fn link_failure(&mut self, cause: OutOfServiceCause) {
        tracing::error!(link = %self.name, "link failure in {}: {}", self.state, cause);
        self.reset_link();
        self.notify(L2Ind::OutOfService(cause));
    }

    fn a_power_on(&mut self, _ev: Mtp2Prim) {
        self.local_emergency = false;
        self.local_outage = false;
        self.reset_link();
    }

    fn a_stop(&mut self, _ev: Mtp2Prim) {
        self.reset_link();
    }

    fn a_set_emergency(&mut self, _ev: Mtp2Prim) {
        self.local_emergency = true;
    }

    fn a_clear_emergency(&mut self, _ev: Mtp2Prim) {
        self.local_emergency = false;
    }

    fn a_aligned_emergency(&mut self, _ev: Mtp2Prim) {
        self.local_emergency = true;
        self.tx_lssu = Some(LinkStatus::Sie);
        if self.state == Proving {
            self.upgrade_t4();
        }
    }

    fn a_aligned_emergency_ceases(&mut self, _ev: Mtp2Prim) {
        self.local_emergency = false;
        self.tx_lssu = Some(LinkStatus::Sin);
    }

    fn a_start(&mut self, _ev: Mtp2Prim) {
        self.tx_lssu = Some(LinkStatus::Sio);
        self.start_timer(Mtp2Timer::T2);
        self.set_state(NotAligned);
    }

    fn a_not_aligned_status(&mut self, ev: Mtp2Prim) {
        if ev == Mtp2Prim::Sie {
            self.remote_emergency = true;
        }
        self.timers.stop(Mtp2Timer::T2);
        self.tx_lssu = Some(if self.local_emergency { LinkStatus::Sie } else { LinkStatus::Sin });
        self.start_timer(Mtp2Timer::T3);
        self.set_state(Aligned);
    }

    fn a_alignment_timeout(&mut self, _ev: Mtp2Prim) {
        self.link_failure(OutOfServiceCause::AlignmentTimeout);
    }

    fn a_start_proving(&mut self, ev: Mtp2Prim) {
        if ev == Mtp2Prim::Sie {
            self.remote_emergency = true;
        }
        self.timers.stop(Mtp2Timer::T3);
        self.proving_tries = 0;
        self.further_proving = false;
        self.monitor.reset_aerm();
        self.start_t4();
        self.set_state(Proving);
    }

    fn a_proving_failure_remote(&mut self, _ev: Mtp2Prim) {
        self.link_failure(OutOfServiceCause::ProvingFailureRemote);
    }

    fn a_proving_timeout(&mut self, _ev: Mtp2Prim) {
        self.link_failure(OutOfServiceCause::ProvingTimeout);
    }

    fn a_proving_sie(&mut self, _ev: Mtp2Prim) {
        self.remote_emergency = true;
        self.upgrade_t4();
    }

    fn a_correct_su(&mut self, _ev: Mtp2Prim) {
        if !self.further_proving {
            return;
        }
        tracing::debug!(link = %self.name, "proving restarts, attempt {}", self.proving_tries + 1);
        self.timers.stop(Mtp2Timer::T4);
        self.monitor.reset_aerm();
        self.start_t4();
        self.further_proving = false;
    }

    fn a_abort_proving(&mut self, _ev: Mtp2Prim) {
        self.proving_tries += 1;
        if self.proving_tries >= MAX_PROVING_TRIES {
            self.link_failure(OutOfServiceCause::ProvingFailureLocal);
            return;
        }
        tracing::warn!(link = %self.name, "proving aborted ({}/{})", self.proving_tries, MAX_PROVING_TRIES);
        self.timers.stop(Mtp2Timer::T4);
        self.further_proving = true;
    }

    fn a_proving_complete(&mut self, _ev: Mtp2Prim) {
        if self.further_proving {
            self.start_t4();
            return;
        }
        self.timers.stop(Mtp2Timer::T4);
        if self.local_outage {
            self.tx_lssu = Some(LinkStatus::Sipo);
            self.set_state(AlignedNotReady);
        } else {
            self.tx_lssu = None;
            self.set_state(AlignedReady);
        }
        self.monitor.reset_suerm();
        self.start_timer(Mtp2Timer::T1);
    }

    fn a_link_failure_local(&mut self, _ev: Mtp2Prim) {
        self.link_failure(OutOfServiceCause::LinkFailureLocal);
    }

    fn a_link_failure_remote(&mut self, _ev: Mtp2Prim) {
        self.link_failure(OutOfServiceCause::LinkFailureRemote);
    }

    fn a_aligned_in_service(&mut self, _ev: Mtp2Prim) {
        self.timers.stop(Mtp2Timer::T1);
        if self.local_outage {
            self.tx_lssu = Some(LinkStatus::Sipo);
            self.set_state(ProcessorOutage);
        } else {
            self.tx_lssu = None;
            self.set_state(InService);
        }
        self.notify(L2Ind::InService);
    }

    fn a_remote_outage(&mut self, _ev: Mtp2Prim) {
        self.timers.stop(Mtp2Timer::T1);
        self.remote_outage = true;
        self.set_state(ProcessorOutage);
        self.notify(L2Ind::RemoteProcessorOutage);
    }

    fn a_ready_local_outage(&mut self, _ev: Mtp2Prim) {
        self.local_outage = true;
        self.tx_lssu = Some(LinkStatus::Sipo);
        self.set_state(AlignedNotReady);
    }

    fn a_not_ready_local_recovered(&mut self, _ev: Mtp2Prim) {
        self.local_outage = false;
        self.tx_lssu = None;
        self.set_state(AlignedReady);
    }

    fn a_in_service_local_outage(&mut self, _ev: Mtp2Prim) {
        self.local_outage = true;
        self.tx_lssu = Some(LinkStatus::Sipo);
        self.set_state(ProcessorOutage);
    }

    /// Processor outage: local and remote outage are tracked independently,
    /// service resumes once both have cleared
    fn a_outage(&mut self, ev: Mtp2Prim) {
        match ev {
            Mtp2Prim::Sipo => {
                if !self.remote_outage {
                    self.remote_outage = true;
                    self.remote_recovery_pending = false;
                    self.notify(L2Ind::RemoteProcessorOutage);
                }
            }
            Mtp2Prim::Fisu | Mtp2Prim::Msu => {
                if self.remote_outage {
                    self.remote_outage = false;
                    self.remote_recovery_pending = true;
                }
            }
            Mtp2Prim::LocalProcessorOutage => {
                self.local_outage = true;
                self.tx_lssu = Some(LinkStatus::Sipo);
            }
            Mtp2Prim::LocalProcessorRecovered => {
                self.local_outage = false;
                self.tx_lssu = None;
            }
            _ => {}
        }

        if !self.local_outage && !self.remote_outage {
            if self.remote_recovery_pending {
                self.remote_recovery_pending = false;
                self.notify(L2Ind::RemoteProcessorRecovered);
            }
            self.tx_lssu = None;
            self.set_state(InService);
        }
    }

    fn a_set_local_outage(&mut self, _ev: Mtp2Prim) {
        self.local_outage = true;
    }

    fn a_clear_local_outage(&mut self, _ev: Mtp2Prim) {
        self.local_outage = false;
    }

    fn a_busy(&mut self, _ev: Mtp2Prim) {
        tracing::debug!(link = %self.name, "SIB received, flow control not supported");
    }
}

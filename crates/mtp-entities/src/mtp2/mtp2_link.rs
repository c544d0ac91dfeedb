use mtp_config::CfgLink;
use mtp_core::{BitTime, PduParseErr, Sio};
use mtp_pdus::mtp2::enums::link_status::LinkStatus;
use mtp_pdus::mtp2::pdus::signal_unit::{SIF_MAX_LEN, SignalUnit, SuBody};
use mtp_saps::l2::{L2Ind, Mtp2Prim};

use crate::mtp2::Mtp2Error;
use crate::mtp2::components::deframer::{DeframerEvent, HdlcDeframer};
use crate::mtp2::components::error_monitor::{ErrorMonitor, TI_EMERGENCY, TI_NORMAL};
use crate::mtp2::components::framer::HdlcFramer;
use crate::mtp2::components::retransmit::{RetransmitBuffer, RxVerdict};
use crate::mtp2::components::tap::{SignalUnitTap, StandardTap, TapVerdict};
use crate::mtp2::components::timers::{Mtp2Timer, Mtp2Timers, TimerProfile};
use crate::mtp2::state_machine::{Mtp2State, find_row};

/// One signalling link: framing in both directions, the Q.703 link state machine,
/// error correction and error rate monitoring.
///
/// The link is driven bit by bit, or block by block, by its owner. Indications for
/// Layer 3 are collected and fetched with `take_indications`.
pub struct Mtp2Link {
    pub(crate) name: String,
    pub(crate) profile: TimerProfile,
    pub(crate) state: Mtp2State,
    pub(crate) now: BitTime,
    pub(crate) timers: Mtp2Timers,
    pub(crate) rtb: RetransmitBuffer,
    pub(crate) monitor: ErrorMonitor,

    framer: HdlcFramer,
    deframer: HdlcDeframer,
    tap: Box<dyn SignalUnitTap>,

    /// Status sent in every signal unit, None sends FISUs and MSUs
    pub(crate) tx_lssu: Option<LinkStatus>,

    pub(crate) local_emergency: bool,
    pub(crate) remote_emergency: bool,
    /// T4 currently runs with the emergency duration
    pub(crate) t4_emergency: bool,
    pub(crate) further_proving: bool,
    pub(crate) proving_tries: u8,

    pub(crate) local_outage: bool,
    pub(crate) remote_outage: bool,
    /// Remote outage has cleared but has not been reported yet
    pub(crate) remote_recovery_pending: bool,

    pub(crate) indications: Vec<L2Ind>,
}

impl Mtp2Link {
    pub fn new(cfg: &CfgLink) -> Self {
        Self::with_tap(cfg, Box::new(StandardTap))
    }

    pub fn with_tap(cfg: &CfgLink, tap: Box<dyn SignalUnitTap>) -> Self {
        let mut link = Mtp2Link {
            name: cfg.name.clone(),
            profile: TimerProfile::new(cfg.bit_rate),
            state: Mtp2State::PowerOff,
            now: BitTime::default(),
            timers: Mtp2Timers::new(),
            rtb: RetransmitBuffer::new(),
            monitor: ErrorMonitor::new(cfg.ignore_monitor),
            framer: HdlcFramer::new(),
            deframer: HdlcDeframer::new(),
            tap,
            tx_lssu: None,
            local_emergency: false,
            remote_emergency: false,
            t4_emergency: false,
            further_proving: false,
            proving_tries: 0,
            local_outage: false,
            remote_outage: false,
            remote_recovery_pending: false,
            indications: Vec::new(),
        };
        tracing::info!(link = %link.name, "link created, {} bit/s ({})", cfg.bit_rate, cfg.link_speed());
        link.send_primitive(Mtp2Prim::PowerOn);
        link.local_emergency = cfg.emergency;
        link
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Mtp2State {
        self.state
    }

    pub fn now(&self) -> BitTime {
        self.now
    }

    pub fn tx_lssu(&self) -> Option<LinkStatus> {
        self.tx_lssu
    }

    pub fn timer_running(&self, timer: Mtp2Timer) -> bool {
        self.timers.is_running(timer)
    }

    pub fn timer_remaining(&self, timer: Mtp2Timer) -> Option<u64> {
        self.timers.remaining(timer, self.now)
    }

    pub fn retransmit_buffer(&self) -> &RetransmitBuffer {
        &self.rtb
    }

    pub fn monitor(&self) -> &ErrorMonitor {
        &self.monitor
    }

    pub fn timer_profile(&self) -> &TimerProfile {
        &self.profile
    }

    pub fn is_emergency(&self) -> bool {
        self.local_emergency || self.remote_emergency
    }

    pub fn is_local_outage(&self) -> bool {
        self.local_outage
    }

    pub fn is_remote_outage(&self) -> bool {
        self.remote_outage
    }

    /// Applies one event to the state machine. Events without a matching table row are ignored.
    pub fn send_primitive(&mut self, prim: Mtp2Prim) {
        match find_row(self.state, prim) {
            Some(row) => {
                tracing::debug!(link = %self.name, "{} in {}: {}", prim, self.state, row.name);
                (row.action)(self, prim);
            }
            None => {
                tracing::trace!(link = %self.name, "{} ignored in {}", prim, self.state);
            }
        }
    }

    /// Queues a message for transmission, returns its forward sequence number
    pub fn enqueue_data(&mut self, sio: Sio, mut sif: Vec<u8>) -> Result<u8, Mtp2Error> {
        if self.state != Mtp2State::InService {
            return Err(Mtp2Error::NotInService);
        }
        if sif.len() < 2 {
            return Err(Mtp2Error::SifTooShort(sif.len()));
        }
        if sif.len() > SIF_MAX_LEN {
            tracing::warn!(link = %self.name, "truncating {} octets of signalling information to {}", sif.len(), SIF_MAX_LEN);
            sif.truncate(SIF_MAX_LEN);
        }
        self.rtb.enqueue(sio, sif)
    }

    /// Advances the link clock and fires expired timers, T1 first
    pub fn set_time(&mut self, now: BitTime) {
        self.now = now;
        for timer in Mtp2Timer::ALL {
            if self.timers.take_expired(timer, now) {
                tracing::debug!(link = %self.name, "{:?} expired", timer);
                self.send_primitive(timer.expiry_event());
            }
        }
    }

    pub fn take_indications(&mut self) -> Vec<L2Ind> {
        std::mem::take(&mut self.indications)
    }

    /// Takes the link out of service, queued messages are dropped
    pub fn shutdown(&mut self) {
        if self.state != Mtp2State::OutOfService {
            tracing::info!(link = %self.name, "shutting down in {}", self.state);
        }
        self.send_primitive(Mtp2Prim::Stop);
        self.indications.clear();
    }

    /// Next bit to put on the line
    pub fn send_bit(&mut self) -> u8 {
        if self.framer.needs_frame() {
            let frame = self.next_frame();
            self.framer.load_frame(frame.as_deref());
        }
        self.framer.next_bit()
    }

    /// Processes one bit from the line
    pub fn receive_bit(&mut self, bit: u8) {
        self.deframer.push_bit(bit & 1);
        while let Some(event) = self.deframer.pop_event() {
            self.handle_deframer_event(event);
        }
    }

    /// `num_bytes` octets of line bits, first bit in the LSB of each octet
    pub fn send_block(&mut self, num_bytes: usize) -> Vec<u8> {
        let mut block = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            let mut byte = 0u8;
            for i in 0..8 {
                byte |= self.send_bit() << i;
            }
            block.push(byte);
        }
        block
    }

    /// Octets of line bits, first bit in the LSB of each octet
    pub fn receive_block(&mut self, block: &[u8]) {
        for byte in block {
            for i in 0..8 {
                self.receive_bit((byte >> i) & 1);
            }
        }
    }

    /// Signal unit to send next: status while not ready, messages in service, fill-in otherwise
    fn next_frame(&mut self) -> Option<Vec<u8>> {
        if self.state == Mtp2State::PowerOff {
            return None;
        }
        let (bsn, bib) = self.rtb.take_backward();
        let fib = self.rtb.fib;

        let su = if let Some(status) = self.tx_lssu {
            SignalUnit::lssu(bsn, bib, self.rtb.tx_seq, fib, status)
        } else {
            let next = if self.state == Mtp2State::InService { self.rtb.select_next() } else { None };
            match next {
                Some((msu, _)) => SignalUnit::msu(bsn, bib, msu.seq, fib, msu.sio, msu.sif),
                None => SignalUnit::fisu(bsn, bib, self.rtb.tx_seq, fib),
            }
        };
        tracing::trace!(link = %self.name, "-> {}", su);
        Some(su.to_frame())
    }

    fn handle_deframer_event(&mut self, event: DeframerEvent) {
        match event {
            DeframerEvent::Frame(frame) => match SignalUnit::from_frame(&frame) {
                Ok(su) => self.receive_signal_unit(su),
                Err(e) => self.receive_bad_frame(e),
            },
            DeframerEvent::BadFrame(e) => self.receive_bad_frame(e),
            DeframerEvent::OctetCountingStart => {
                tracing::debug!(link = %self.name, "octet counting");
            }
            DeframerEvent::OctetCountingError => self.count_error(),
        }
    }

    fn receive_bad_frame(&mut self, err: PduParseErr) {
        if self.tap.on_bad_frame(&self.name, &err) == TapVerdict::Consume {
            return;
        }
        tracing::debug!(link = %self.name, "<- bad frame: {}", err);
        self.count_error();
    }

    fn receive_signal_unit(&mut self, su: SignalUnit) {
        if self.tap.on_signal_unit(&self.name, &su) == TapVerdict::Consume {
            return;
        }
        tracing::trace!(link = %self.name, "<- {}", su);
        self.count_good();

        match su.body {
            SuBody::Lssu { status, .. } => match status.as_event() {
                Some(event) => self.send_primitive(event),
                None => tracing::debug!(link = %self.name, "spare link status {} ignored", status),
            },
            // Acknowledgements are taken in the state the signal unit arrived in
            SuBody::Fisu => {
                if self.sequencing_active() {
                    self.rtb.process_backward(su.bsn, su.bib);
                }
                self.send_primitive(Mtp2Prim::Fisu);
            }
            SuBody::Msu { sio, sif } => {
                if self.sequencing_active() {
                    self.rtb.process_backward(su.bsn, su.bib);
                }
                self.send_primitive(Mtp2Prim::Msu);
                if self.state != Mtp2State::InService {
                    tracing::debug!(link = %self.name, "MSU fsn={} discarded in {}", su.fsn, self.state);
                    return;
                }
                match self.rtb.check_received(su.fsn, su.fib) {
                    RxVerdict::Accept => self.notify(L2Ind::Data { sio, sif }),
                    verdict => {
                        tracing::debug!(link = %self.name, "MSU fsn={} not accepted: {:?}", su.fsn, verdict);
                    }
                }
            }
        }
    }

    fn sequencing_active(&self) -> bool {
        matches!(self.state, Mtp2State::InService | Mtp2State::ProcessorOutage)
    }

    fn count_good(&mut self) {
        match self.state {
            Mtp2State::Proving => {
                if let Some(event) = self.monitor.aerm_good() {
                    self.send_primitive(event);
                }
            }
            Mtp2State::AlignedReady
            | Mtp2State::AlignedNotReady
            | Mtp2State::InService
            | Mtp2State::ProcessorOutage => self.monitor.suerm_good(),
            _ => {}
        }
    }

    fn count_error(&mut self) {
        let event = match self.state {
            Mtp2State::Proving => {
                let ti = if self.is_emergency() { TI_EMERGENCY } else { TI_NORMAL };
                self.monitor.aerm_error(ti)
            }
            Mtp2State::AlignedReady
            | Mtp2State::AlignedNotReady
            | Mtp2State::InService
            | Mtp2State::ProcessorOutage => self.monitor.suerm_error(),
            _ => None,
        };
        if let Some(event) = event {
            self.send_primitive(event);
        }
    }
}

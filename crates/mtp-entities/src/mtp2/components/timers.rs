use mtp_core::{BitTime, LinkSpeed, assert_warn};
use mtp_saps::l2::Mtp2Prim;

/// Q.703 12.3 Timers of the signalling link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mtp2Timer {
    /// Aligned ready, waiting for the peer to leave proving
    T1,
    /// Not aligned
    T2,
    /// Aligned
    T3,
    /// Proving period
    T4,
}

impl Mtp2Timer {
    pub const ALL: [Mtp2Timer; 4] = [Mtp2Timer::T1, Mtp2Timer::T2, Mtp2Timer::T3, Mtp2Timer::T4];

    fn idx(self) -> usize {
        match self {
            Mtp2Timer::T1 => 0,
            Mtp2Timer::T2 => 1,
            Mtp2Timer::T3 => 2,
            Mtp2Timer::T4 => 3,
        }
    }

    /// Event delivered to the state machine on expiry
    pub fn expiry_event(self) -> Mtp2Prim {
        match self {
            Mtp2Timer::T1 => Mtp2Prim::T1Timeout,
            Mtp2Timer::T2 => Mtp2Prim::T2Timeout,
            Mtp2Timer::T3 => Mtp2Prim::T3Timeout,
            Mtp2Timer::T4 => Mtp2Prim::T4Timeout,
        }
    }
}

/// Timer durations in bit periods for one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProfile {
    pub t1: u64,
    pub t2: u64,
    pub t3: u64,
    pub t4_normal: u64,
    pub t4_emergency: u64,
}

impl TimerProfile {
    pub fn new(bit_rate: u32) -> Self {
        let (t1, t4_normal, t4_emergency) = match LinkSpeed::from_bit_rate(bit_rate) {
            LinkSpeed::Rate64k => (45.0, 8.2, 0.5),
            LinkSpeed::Rate4k8 => (500.0, 110.0, 7.0),
        };
        TimerProfile {
            t1: BitTime::bits_from_secs(t1, bit_rate),
            t2: BitTime::bits_from_secs(11.5, bit_rate),
            t3: BitTime::bits_from_secs(1.5, bit_rate),
            t4_normal: BitTime::bits_from_secs(t4_normal, bit_rate),
            t4_emergency: BitTime::bits_from_secs(t4_emergency, bit_rate),
        }
    }

    pub fn duration(&self, timer: Mtp2Timer, emergency: bool) -> u64 {
        match timer {
            Mtp2Timer::T1 => self.t1,
            Mtp2Timer::T2 => self.t2,
            Mtp2Timer::T3 => self.t3,
            Mtp2Timer::T4 if emergency => self.t4_emergency,
            Mtp2Timer::T4 => self.t4_normal,
        }
    }
}

/// Single-shot timers on the link clock. At most one instance per timer is pending.
#[derive(Debug, Default)]
pub struct Mtp2Timers {
    deadlines: [Option<BitTime>; 4],
}

impl Mtp2Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `timer`. A pending instance must have been stopped before.
    pub fn start(&mut self, timer: Mtp2Timer, now: BitTime, duration: u64) {
        let slot = &mut self.deadlines[timer.idx()];
        assert_warn!(slot.is_none(), "{:?} started while pending", timer);
        *slot = Some(now.add_bits(duration));
        tracing::trace!("start {:?}: expires at {}", timer, now.add_bits(duration));
    }

    /// Cancels `timer`, returns whether it was pending
    pub fn stop(&mut self, timer: Mtp2Timer) -> bool {
        self.deadlines[timer.idx()].take().is_some()
    }

    pub fn stop_all(&mut self) {
        self.deadlines = [None; 4];
    }

    pub fn is_running(&self, timer: Mtp2Timer) -> bool {
        self.deadlines[timer.idx()].is_some()
    }

    /// Bit periods until `timer` expires, if pending
    pub fn remaining(&self, timer: Mtp2Timer, now: BitTime) -> Option<u64> {
        self.deadlines[timer.idx()].map(|d| d.diff(now).max(0) as u64)
    }

    /// Clears and reports `timer` if its deadline has been reached
    pub fn take_expired(&mut self, timer: Mtp2Timer, now: BitTime) -> bool {
        match self.deadlines[timer.idx()] {
            Some(deadline) if deadline.is_reached(now) => {
                self.deadlines[timer.idx()] = None;
                true
            }
            _ => false,
        }
    }

    pub fn any_running(&self) -> bool {
        self.deadlines.iter().any(|d| d.is_some())
    }
}

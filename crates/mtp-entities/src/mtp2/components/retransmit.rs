use std::collections::VecDeque;

use mtp_core::Sio;

use crate::mtp2::Mtp2Error;

/// Sequence numbers are 7 bit
pub const SEQ_MASK: u8 = 0x7f;
/// Value of all sequence numbers after a reset
pub const SEQ_RESET: u8 = 127;
/// Messages awaiting acknowledgement before new ones are refused
pub const MAX_OUTSTANDING: usize = 127;

#[inline]
pub fn seq_next(seq: u8) -> u8 {
    seq.wrapping_add(1) & SEQ_MASK
}

/// A queued message signal unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMsu {
    pub seq: u8,
    pub sio: Sio,
    pub sif: Vec<u8>,
    pub transmitted: bool,
}

/// What to do with a received MSU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxVerdict {
    /// In sequence, hand to Layer 3
    Accept,
    /// Already accepted before
    Duplicate,
    /// Gap detected, a negative acknowledgement has been requested
    Nack,
    /// Discarded while waiting for the retransmission that was asked for
    AwaitRetransmission,
}

/// Q.703 5 Basic error correction: sequence numbers, indicator bits and the
/// retransmission buffer holding every message until the peer acknowledges it.
#[derive(Debug)]
pub struct RetransmitBuffer {
    queue: VecDeque<TxMsu>,

    /// FSN of the last MSU sent
    pub tx_seq: u8,
    pub fib: bool,
    /// FSN of the last MSU accepted, sent back as BSN
    pub rx_seq: u8,
    pub bib: bool,
    /// Sequence number of the last MSU queued
    pub tx_queue_seq: u8,
    /// Invert BIB on the next signal unit sent
    pub tx_nack: bool,
}

impl Default for RetransmitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RetransmitBuffer {
    pub fn new() -> Self {
        RetransmitBuffer {
            queue: VecDeque::new(),
            tx_seq: SEQ_RESET,
            fib: true,
            rx_seq: SEQ_RESET,
            bib: true,
            tx_queue_seq: SEQ_RESET,
            tx_nack: false,
        }
    }

    /// Drops all messages and returns to the initial sequence numbers
    pub fn reset(&mut self) {
        if !self.queue.is_empty() {
            tracing::debug!("flushing {} queued messages", self.queue.len());
        }
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TxMsu> {
        self.queue.iter()
    }

    /// Appends a message with the next sequence number
    pub fn enqueue(&mut self, sio: Sio, sif: Vec<u8>) -> Result<u8, Mtp2Error> {
        if self.queue.len() >= MAX_OUTSTANDING {
            return Err(Mtp2Error::Congested);
        }
        let seq = seq_next(self.tx_queue_seq);
        self.tx_queue_seq = seq;
        self.queue.push_back(TxMsu { seq, sio, sif, transmitted: false });
        Ok(seq)
    }

    /// Message following the last one sent, if queued. Sets `tx_seq` to it.
    /// Returns the message and whether it is a retransmission.
    pub fn select_next(&mut self) -> Option<(TxMsu, bool)> {
        let want = seq_next(self.tx_seq);
        let entry = self.queue.iter_mut().find(|m| m.seq == want)?;
        let retransmission = entry.transmitted;
        entry.transmitted = true;
        self.tx_seq = want;
        if retransmission {
            tracing::debug!("retransmitting MSU fsn={}", want);
        } else {
            tracing::trace!("transmitting MSU fsn={}", want);
        }
        Some((entry.clone(), retransmission))
    }

    /// Positive acknowledgement: frees all messages up to and including `bsn`.
    /// Only transmitted messages can be acknowledged; the scan stops at the first one not sent yet.
    pub fn ack(&mut self, bsn: u8) -> usize {
        let pos = self
            .queue
            .iter()
            .take_while(|m| m.transmitted)
            .position(|m| m.seq == bsn);
        match pos {
            Some(pos) => {
                self.queue.drain(..=pos);
                tracing::trace!("ack bsn={}: {} messages freed, {} left", bsn, pos + 1, self.queue.len());
                pos + 1
            }
            None => 0,
        }
    }

    /// Negative acknowledgement: restart transmission after `bsn` and take over the peer's BIB as FIB.
    /// Returns whether there was anything to retransmit.
    pub fn nack(&mut self, bsn: u8, bib: bool) -> bool {
        let from = seq_next(bsn);
        let found = self.queue.iter().any(|m| m.seq == from && m.transmitted);
        self.fib = bib;
        if found {
            tracing::debug!("nack bsn={}: retransmitting from fsn={}", bsn, from);
            self.tx_seq = bsn & SEQ_MASK;
        } else {
            tracing::debug!("nack bsn={}: nothing to retransmit", bsn);
        }
        found
    }

    /// Processes BSN/BIB of a received FISU or MSU
    pub fn process_backward(&mut self, bsn: u8, bib: bool) {
        self.ack(bsn);
        if bib != self.fib {
            self.nack(bsn, bib);
        }
    }

    /// Sequence check of a received MSU. Updates `rx_seq` on acceptance.
    pub fn check_received(&mut self, fsn: u8, fib: bool) -> RxVerdict {
        if fsn == self.rx_seq {
            return RxVerdict::Duplicate;
        }
        if fib != self.bib {
            // A negative acknowledgement is outstanding
            return RxVerdict::AwaitRetransmission;
        }
        if fsn == seq_next(self.rx_seq) {
            self.rx_seq = fsn;
            return RxVerdict::Accept;
        }
        tracing::debug!("fsn={} out of sequence, expected {}", fsn, seq_next(self.rx_seq));
        self.tx_nack = true;
        RxVerdict::Nack
    }

    /// BSN and BIB for the next signal unit sent. Inverts BIB if a negative acknowledgement is pending.
    pub fn take_backward(&mut self) -> (u8, bool) {
        if self.tx_nack {
            self.bib = !self.bib;
            self.tx_nack = false;
        }
        (self.rx_seq, self.bib)
    }
}

#[cfg(test)]
mod tests {
    use mtp_core::debug;

    use super::*;

    fn filled(n: usize) -> RetransmitBuffer {
        let mut buf = RetransmitBuffer::new();
        for i in 0..n {
            buf.enqueue(0xcd, vec![i as u8; 4]).unwrap();
        }
        buf
    }

    #[test]
    fn test_enqueue_wraps() {
        let mut buf = RetransmitBuffer::new();
        assert_eq!(buf.enqueue(0xcd, vec![]).unwrap(), 0);
        assert_eq!(buf.enqueue(0xcd, vec![]).unwrap(), 1);
        for _ in 2..MAX_OUTSTANDING {
            buf.enqueue(0xcd, vec![]).unwrap();
        }
        assert_eq!(buf.len(), MAX_OUTSTANDING);
        assert_eq!(buf.tx_queue_seq, 126);
        assert_eq!(buf.enqueue(0xcd, vec![]), Err(Mtp2Error::Congested));
        assert!(buf.iter().all(|m| m.seq <= SEQ_MASK));
    }

    #[test]
    fn test_select_in_order() {
        debug::setup_logging_verbose();
        let mut buf = filled(3);
        assert_eq!(buf.select_next().map(|(m, r)| (m.seq, r)), Some((0, false)));
        assert_eq!(buf.select_next().map(|(m, r)| (m.seq, r)), Some((1, false)));
        assert_eq!(buf.select_next().map(|(m, r)| (m.seq, r)), Some((2, false)));
        assert_eq!(buf.select_next(), None);
        assert_eq!(buf.tx_seq, 2);
    }

    #[test]
    fn test_ack_idempotent() {
        let mut buf = filled(4);
        buf.select_next();
        buf.select_next();
        buf.select_next();

        assert_eq!(buf.ack(1), 2);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.ack(1), 0);
        assert_eq!(buf.len(), 2);

        // seq 3 was never sent
        assert_eq!(buf.ack(3), 0);
        assert_eq!(buf.ack(2), 1);
        assert_eq!(buf.iter().next().map(|m| m.seq), Some(3));
    }

    #[test]
    fn test_nack_rewinds() {
        let mut buf = RetransmitBuffer::new();
        // Start numbering at 1
        buf.tx_queue_seq = 0;
        buf.tx_seq = 0;
        for i in 1..=5u8 {
            assert_eq!(buf.enqueue(0xcd, vec![i]).unwrap(), i);
        }
        for _ in 1..=5 {
            buf.select_next();
        }
        assert_eq!(buf.tx_seq, 5);

        assert!(buf.nack(3, false));
        assert!(!buf.fib);
        let (msg, retransmission) = buf.select_next().unwrap();
        assert_eq!(msg.seq, 4);
        assert!(retransmission);
        let (msg, _) = buf.select_next().unwrap();
        assert_eq!(msg.seq, 5);
        assert_eq!(buf.select_next(), None);
    }

    #[test]
    fn test_nack_without_entry() {
        let mut buf = filled(1);
        assert!(!buf.nack(40, false));
        assert_eq!(buf.tx_seq, SEQ_RESET);
        assert!(!buf.fib);
    }

    #[test]
    fn test_receive_sequence() {
        let mut buf = RetransmitBuffer::new();
        assert_eq!(buf.check_received(0, true), RxVerdict::Accept);
        assert_eq!(buf.rx_seq, 0);
        assert_eq!(buf.check_received(0, true), RxVerdict::Duplicate);

        // Gap: 2 instead of 1
        assert_eq!(buf.check_received(2, true), RxVerdict::Nack);
        assert!(buf.tx_nack);
        assert_eq!(buf.take_backward(), (0, false));
        assert!(!buf.tx_nack);

        // Still old FIB: waiting for retransmission
        assert_eq!(buf.check_received(3, true), RxVerdict::AwaitRetransmission);
        assert_eq!(buf.check_received(1, false), RxVerdict::Accept);
        assert_eq!(buf.check_received(2, false), RxVerdict::Accept);
        assert_eq!(buf.take_backward(), (2, false));
    }

    #[test]
    fn test_reset() {
        let mut buf = filled(5);
        buf.select_next();
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!((buf.tx_seq, buf.rx_seq, buf.tx_queue_seq), (127, 127, 127));
        assert!(buf.fib && buf.bib && !buf.tx_nack);
    }
}

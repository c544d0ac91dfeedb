use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::phy::components::bit_dev::{BitDev, BitDevError, IDLE_OCTET};

/// One end of a back-to-back connection between two stacks in one process.
/// What one end sends, the other receives on a later exchange; while nothing
/// is pending the line is idle.
pub struct LoopbackDev {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    peer_gone: bool,
}

impl LoopbackDev {
    /// Two connected ends
    pub fn pair() -> (LoopbackDev, LoopbackDev) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (
            LoopbackDev { tx: a_tx, rx: a_rx, peer_gone: false },
            LoopbackDev { tx: b_tx, rx: b_rx, peer_gone: false },
        )
    }

    /// Octets sent by the peer and not received yet
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl BitDev for LoopbackDev {
    fn rxtx_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), BitDevError> {
        if !self.peer_gone {
            for &octet in tx {
                if self.tx.send(octet).is_err() {
                    tracing::info!("loopback peer disconnected");
                    self.peer_gone = true;
                    break;
                }
            }
        }

        for slot in rx.iter_mut() {
            *slot = match self.rx.try_recv() {
                Ok(octet) => octet,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => IDLE_OCTET,
            };
        }
        Ok(())
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use mtp_entities::phy::components::bit_dev::{BitDev, BitDevError};
use mtp_entities::phy::components::loopback_dev::LoopbackDev;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Disturbances applied to what one end of a loopback line receives
#[derive(Default)]
pub struct LineControl {
    /// Replace everything received with ones
    pub jam: AtomicBool,
    /// Bit error rate in errors per million bits
    pub ber_ppm: AtomicU32,
    /// Countdown: the n-th block received from now on gets one octet inverted
    pub corrupt_block: AtomicUsize,
}

impl LineControl {
    pub fn set_jam(&self, jam: bool) {
        self.jam.store(jam, Ordering::SeqCst);
    }

    pub fn set_ber_ppm(&self, ppm: u32) {
        self.ber_ppm.store(ppm, Ordering::SeqCst);
    }

    pub fn corrupt_nth_block(&self, n: usize) {
        self.corrupt_block.store(n, Ordering::SeqCst);
    }
}

/// Loopback end with controllable line errors on the receive side
pub struct NoisyDev {
    inner: LoopbackDev,
    ctl: Arc<LineControl>,
    rng: StdRng,
}

impl NoisyDev {
    pub fn new(inner: LoopbackDev, seed: u64) -> (Self, Arc<LineControl>) {
        let ctl = Arc::new(LineControl::default());
        let dev = NoisyDev { inner, ctl: ctl.clone(), rng: StdRng::seed_from_u64(seed) };
        (dev, ctl)
    }
}

impl BitDev for NoisyDev {
    fn rxtx_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), BitDevError> {
        self.inner.rxtx_block(tx, rx)?;

        if self.ctl.jam.load(Ordering::SeqCst) {
            rx.fill(0xff);
            return Ok(());
        }

        let countdown = self.ctl.corrupt_block.load(Ordering::SeqCst);
        if countdown > 0 {
            self.ctl.corrupt_block.store(countdown - 1, Ordering::SeqCst);
            if countdown == 1 && !rx.is_empty() {
                let idx = rx.len() / 2;
                tracing::info!("corrupting received octet {:02x}", rx[idx]);
                rx[idx] ^= 0xff;
            }
        }

        let ppm = self.ctl.ber_ppm.load(Ordering::SeqCst);
        if ppm > 0 {
            let p = ppm as f64 / 1_000_000.0;
            for octet in rx.iter_mut() {
                for bit in 0..8 {
                    if self.rng.random_bool(p) {
                        *octet ^= 1 << bit;
                    }
                }
            }
        }
        Ok(())
    }
}

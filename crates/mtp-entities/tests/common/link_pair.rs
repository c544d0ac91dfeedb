use std::sync::Arc;

use mtp_core::mtp_entities::MtpEntity;
use mtp_entities::mtp2::Mtp2State;
use mtp_entities::phy::components::loopback_dev::LoopbackDev;
use mtp_saps::l2::Mtp2Prim;
use mtp_saps::l3::L3Ind;

use super::component_test::{ComponentTest, default_test_config, peer_config};
use super::noisy_dev::{LineControl, NoisyDev};

/// Two complete stacks connected back to back over a loopback line.
/// Each round runs one tick of `a`, then one tick of `b`.
pub struct LinkPair {
    pub a: ComponentTest,
    pub b: ComponentTest,
    /// Errors on what `a` receives
    pub line_a: Arc<LineControl>,
    /// Errors on what `b` receives
    pub line_b: Arc<LineControl>,
}

impl LinkPair {
    pub fn new() -> Self {
        let cfg_a = default_test_config("a");
        let cfg_b = peer_config(&cfg_a, "b");
        let (dev_a, dev_b) = LoopbackDev::pair();
        let (dev_a, line_a) = NoisyDev::new(dev_a, 1);
        let (dev_b, line_b) = NoisyDev::new(dev_b, 2);

        let mut a = ComponentTest::new(cfg_a);
        a.register_phy(dev_a);
        a.populate_entities(vec![MtpEntity::Mtp2, MtpEntity::Mtp3], vec![MtpEntity::User]);

        let mut b = ComponentTest::new(cfg_b);
        b.register_phy(dev_b);
        b.populate_entities(vec![MtpEntity::Mtp2, MtpEntity::Mtp3], vec![MtpEntity::User]);

        Self { a, b, line_a, line_b }
    }

    pub fn run_rounds(&mut self, rounds: usize) {
        for _ in 0..rounds {
            self.a.run_tick();
            self.b.run_tick();
        }
    }

    /// Runs until `done` holds, checked after every round. Returns false if `max_rounds` passed.
    pub fn run_until(&mut self, max_rounds: usize, mut done: impl FnMut(&mut Self) -> bool) -> bool {
        for _ in 0..max_rounds {
            self.run_rounds(1);
            if done(self) {
                return true;
            }
        }
        false
    }

    /// Starts both ends, with emergency proving to keep the test short
    pub fn start(&mut self) {
        for side in [&mut self.a, &mut self.b] {
            side.send_control(Mtp2Prim::Emergency);
            side.send_control(Mtp2Prim::Start);
        }
    }

    /// Starts both ends and waits until both report in service
    pub fn bring_up(&mut self) {
        self.start();
        let up = self.run_until(2000, |p| {
            p.a.user_indications().contains(&L3Ind::InService) && p.b.user_indications().contains(&L3Ind::InService)
        });
        assert!(up, "link did not come up: a={} b={}", self.a.mtp2().link().state(), self.b.mtp2().link().state());
        assert_eq!(self.a.mtp2().link().state(), Mtp2State::InService);
        assert_eq!(self.b.mtp2().link().state(), Mtp2State::InService);
    }
}

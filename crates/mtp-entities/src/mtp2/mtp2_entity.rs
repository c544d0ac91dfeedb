use mtp_config::SharedConfig;
use mtp_core::mtp_entities::MtpEntity;
use mtp_core::{BitTime, Sap};
use mtp_saps::l2::L2Ind;
use mtp_saps::ph::PhBlockReq;
use mtp_saps::{SapMsg, SapMsgInner};

use crate::mtp2::Mtp2Link;
use crate::mtp2::components::tap::{SignalUnitTap, StandardTap};
use crate::{MessageQueue, MtpEntityTrait};

/// Signalling link entity. Owns one `Mtp2Link`, feeds it the octets from Phy and
/// the requests from Mtp3, hands its indications up.
pub struct Mtp2 {
    link: Mtp2Link,
    /// Octets sent to Phy per tick
    block_bytes: usize,
}

impl Mtp2 {
    pub fn new(config: SharedConfig) -> Self {
        Self::with_tap(config, Box::new(StandardTap))
    }

    pub fn with_tap(config: SharedConfig, tap: Box<dyn SignalUnitTap>) -> Self {
        let cfg = config.config();
        Self {
            link: Mtp2Link::with_tap(&cfg.link, tap),
            block_bytes: cfg.phy_io.block_bytes,
        }
    }

    pub fn link(&self) -> &Mtp2Link {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Mtp2Link {
        &mut self.link
    }

    /// Orderly stop, queued messages are dropped
    pub fn shutdown(&mut self) {
        self.link.shutdown();
    }

    fn forward_indications(&mut self, queue: &mut MessageQueue) {
        for ind in self.link.take_indications() {
            queue.push_back(SapMsg {
                sap: Sap::L2Sap,
                src: MtpEntity::Mtp2,
                dest: MtpEntity::Mtp3,
                time: self.link.now(),
                msg: SapMsgInner::L2Ind(ind),
            });
        }
    }

    fn rx_phsap_prim(&mut self, message: SapMsg) {
        match message.msg {
            SapMsgInner::PhBlockInd(prim) => self.link.receive_block(&prim.data),
            other => tracing::warn!(link = %self.link.name(), "unexpected primitive on PH-SAP: {}", other),
        }
    }

    fn rx_l2sap_prim(&mut self, message: SapMsg) {
        match message.msg {
            SapMsgInner::L2ControlReq(prim) => {
                if prim.prim.is_request() {
                    self.link.send_primitive(prim.prim);
                } else {
                    tracing::warn!(link = %self.link.name(), "{} is not a link request, ignored", prim.prim);
                }
            }
            SapMsgInner::L2DataReq(prim) => {
                let len = prim.sif.len();
                match self.link.enqueue_data(prim.sio, prim.sif) {
                    Ok(fsn) => tracing::debug!(link = %self.link.name(), "queued {} octets as fsn={}", len, fsn),
                    Err(e) => tracing::warn!(link = %self.link.name(), "message of {} octets dropped: {}", len, e),
                }
            }
            other => tracing::warn!(link = %self.link.name(), "unexpected primitive on L2-SAP: {}", other),
        }
    }
}

impl MtpEntityTrait for Mtp2 {
    fn entity(&self) -> MtpEntity {
        MtpEntity::Mtp2
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?} from {:?}", message.sap, message.src);

        match message.sap {
            Sap::PhSap => self.rx_phsap_prim(message),
            Sap::L2Sap => self.rx_l2sap_prim(message),
            _ => tracing::warn!(link = %self.link.name(), "unexpected {} on {:?}", message.msg, message.sap),
        }
        self.forward_indications(queue);
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, time: BitTime) {
        self.link.set_time(time);
        self.forward_indications(queue);
    }

    fn tick_end(&mut self, queue: &mut MessageQueue, time: BitTime) -> bool {
        let data = self.link.send_block(self.block_bytes);
        queue.push_back(SapMsg {
            sap: Sap::PhSap,
            src: MtpEntity::Mtp2,
            dest: MtpEntity::Phy,
            time,
            msg: SapMsgInner::PhBlockReq(PhBlockReq { data }),
        });
        false
    }
}

impl core::fmt::Debug for Mtp2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mtp2({} {})", self.link.name(), self.link.state())
    }
}

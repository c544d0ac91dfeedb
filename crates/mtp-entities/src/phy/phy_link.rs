use mtp_config::SharedConfig;
use mtp_core::mtp_entities::MtpEntity;
use mtp_core::{BitTime, Sap};
use mtp_saps::ph::PhBlockInd;
use mtp_saps::{SapMsg, SapMsgInner};

use crate::phy::components::bit_dev::{BitDev, BitDevError, IDLE_OCTET};
use crate::{MessageQueue, MtpEntityTrait};

/// Bit pump between Mtp2 and a line device. Every block Mtp2 hands down is
/// exchanged with the device, the octets received in return travel back up.
pub struct Phy<D: BitDev> {
    name: String,
    time: BitTime,

    /// RX/TX device
    dev: D,
    rx_buf: Vec<u8>,

    blocks: u64,
    /// Device reported end of input or failed, no further exchanges
    halt: bool,
}

impl<D: BitDev> Phy<D> {
    pub fn new(config: SharedConfig, dev: D) -> Self {
        let cfg = config.config();
        Self {
            name: cfg.link.name.clone(),
            time: BitTime::default(),
            dev,
            rx_buf: vec![IDLE_OCTET; cfg.phy_io.block_bytes],
            blocks: 0,
            halt: false,
        }
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.dev
    }

    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    fn rx_phsap_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let SapMsgInner::PhBlockReq(prim) = message.msg else {
            tracing::warn!(link = %self.name, "unexpected primitive on PH-SAP: {}", message.msg);
            return;
        };
        if self.halt {
            return;
        }

        self.rx_buf.resize(prim.data.len(), IDLE_OCTET);
        match self.dev.rxtx_block(&prim.data, &mut self.rx_buf) {
            Ok(()) => {
                self.blocks += 1;
                queue.push_back(SapMsg {
                    sap: Sap::PhSap,
                    src: MtpEntity::Phy,
                    dest: MtpEntity::Mtp2,
                    time: self.time,
                    msg: SapMsgInner::PhBlockInd(PhBlockInd { data: self.rx_buf.clone() }),
                });
            }
            Err(BitDevError::RxEndOfData) => {
                tracing::info!(link = %self.name, "end of input after {} blocks", self.blocks);
                self.halt = true;
            }
            Err(e) => {
                tracing::error!(link = %self.name, "device {} after {} blocks", e, self.blocks);
                self.halt = true;
            }
        }
    }
}

impl<D: BitDev + Send + 'static> MtpEntityTrait for Phy<D> {
    fn entity(&self) -> MtpEntity {
        MtpEntity::Phy
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?}", message.msg);

        match message.sap {
            Sap::PhSap => {
                self.rx_phsap_prim(queue, message);
            }
            _ => {
                tracing::warn!(link = %self.name, "unexpected {} on {:?}", message.msg, message.sap);
            }
        }
    }

    fn tick_start(&mut self, _queue: &mut MessageQueue, time: BitTime) {
        self.time = time;
    }

    fn tick_end(&mut self, _queue: &mut MessageQueue, _time: BitTime) -> bool {
        self.halt
    }
}

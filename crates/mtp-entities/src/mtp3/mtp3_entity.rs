use mtp_config::SharedConfig;
use mtp_core::mtp_entities::MtpEntity;
use mtp_core::{BitTime, PointCode, Sap, Sio};
use mtp_pdus::mtp3::fields::routing_label::RoutingLabel;
use mtp_saps::l2::{L2ControlReq, L2DataReq, L2Ind};
use mtp_saps::l3::L3Ind;
use mtp_saps::{SapMsg, SapMsgInner};

use crate::{MessageQueue, MtpEntityTrait};

/// Layer 3 shim on top of a single signalling link: adds the routing label to
/// outgoing messages, checks and strips it on incoming ones, passes link status through.
pub struct Mtp3 {
    config: SharedConfig,
    time: BitTime,
    name: String,
    sio: Sio,
    local_pc: PointCode,
    remote_pc: PointCode,

    /// Incoming messages rejected by the label or SIO checks
    dropped: u64,
}

impl Mtp3 {
    pub fn new(config: SharedConfig) -> Self {
        let cfg = config.config();
        Self {
            name: cfg.link.name.clone(),
            sio: cfg.link.sio,
            local_pc: cfg.link.local_pc,
            remote_pc: cfg.link.remote_pc,
            dropped: 0,
            time: BitTime::default(),
            config,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send_down(&self, queue: &mut MessageQueue, msg: SapMsgInner) {
        queue.push_back(SapMsg {
            sap: Sap::L2Sap,
            src: MtpEntity::Mtp3,
            dest: MtpEntity::Mtp2,
            time: self.time,
            msg,
        });
    }

    fn send_up(&self, queue: &mut MessageQueue, ind: L3Ind) {
        tracing::debug!(link = %self.name, "indication {}", ind);
        queue.push_back(SapMsg {
            sap: Sap::L3Sap,
            src: MtpEntity::Mtp3,
            dest: MtpEntity::User,
            time: self.time,
            msg: SapMsgInner::L3Ind(ind),
        });
    }

    fn rx_l3sap_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        match message.msg {
            SapMsgInner::L3TransferReq(prim) => {
                if prim.slc > 0x0f {
                    tracing::warn!(link = %self.name, "slc {} truncated to 4 bits", prim.slc);
                }
                let label = RoutingLabel { dcp: self.remote_pc, ocp: self.local_pc, slc: prim.slc & 0x0f };
                let mut sif = Vec::with_capacity(label.to_bytes().len() + prim.data.len());
                sif.extend_from_slice(&label.to_bytes());
                sif.extend_from_slice(&prim.data);
                tracing::debug!(link = %self.name, "-> {} len={}", label, prim.data.len());
                self.send_down(queue, SapMsgInner::L2DataReq(L2DataReq { sio: self.sio, sif }));
            }
            SapMsgInner::L3ControlReq(prim) => {
                self.send_down(queue, SapMsgInner::L2ControlReq(L2ControlReq { prim: prim.prim }));
            }
            other => tracing::warn!(link = %self.name, "unexpected primitive on L3-SAP: {}", other),
        }
    }

    fn rx_l2sap_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        let SapMsgInner::L2Ind(ind) = message.msg else {
            tracing::warn!(link = %self.name, "unexpected primitive on L2-SAP: {}", message.msg);
            return;
        };

        match ind {
            L2Ind::Data { sio, sif } => self.receive(queue, sio, sif),
            L2Ind::InService => {
                self.config.state_write().link_in_service = true;
                self.send_up(queue, L3Ind::InService);
            }
            L2Ind::OutOfService(cause) => {
                {
                    let mut state = self.config.state_write();
                    state.link_in_service = false;
                    state.remote_processor_outage = false;
                }
                self.send_up(queue, L3Ind::OutOfService(cause));
            }
            L2Ind::RemoteProcessorOutage => {
                self.config.state_write().remote_processor_outage = true;
                self.send_up(queue, L3Ind::RemoteProcessorOutage);
            }
            L2Ind::RemoteProcessorRecovered => {
                self.config.state_write().remote_processor_outage = false;
                self.send_up(queue, L3Ind::RemoteProcessorRecovered);
            }
        }
    }

    /// Checks an accepted MSU and hands its payload to the user
    fn receive(&mut self, queue: &mut MessageQueue, sio: Sio, sif: Vec<u8>) {
        if sio & 0x0f == 0 {
            tracing::debug!(link = %self.name, "network management message dropped, sio={:02x}", sio);
            self.dropped += 1;
            return;
        }
        if sio != self.sio {
            tracing::warn!(link = %self.name, "unexpected sio {:02x}, dropped", sio);
            self.dropped += 1;
            return;
        }
        let (label, data) = match RoutingLabel::split_sif(&sif) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(link = %self.name, "no routing label: {}", e);
                self.dropped += 1;
                return;
            }
        };
        if label.dcp != self.local_pc || label.ocp != self.remote_pc {
            tracing::warn!(link = %self.name, "<- {} not for us, dropped", label);
            self.dropped += 1;
            return;
        }

        tracing::debug!(link = %self.name, "<- {} len={}", label, data.len());
        let ind = L3Ind::Transfer { sio, slc: label.slc, data: data.to_vec() };
        self.send_up(queue, ind);
    }
}

impl MtpEntityTrait for Mtp3 {
    fn entity(&self) -> MtpEntity {
        MtpEntity::Mtp3
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?} from {:?}", message.sap, message.src);

        match message.sap {
            Sap::L2Sap => self.rx_l2sap_prim(queue, message),
            Sap::L3Sap => self.rx_l3sap_prim(queue, message),
            _ => tracing::warn!(link = %self.name, "unexpected {} on {:?}", message.msg, message.sap),
        }
    }

    fn tick_start(&mut self, _queue: &mut MessageQueue, time: BitTime) {
        self.time = time;
    }
}

#[cfg(test)]
mod tests {
    use mtp_core::debug;
    use mtp_saps::l2::{Mtp2Prim, OutOfServiceCause};
    use mtp_saps::l3::{L3ControlReq, L3TransferReq};

    use super::*;

    fn setup() -> (SharedConfig, Mtp3, MessageQueue) {
        let config = SharedConfig::new("l3", 64000, PointCode::from_raw(0x0201), PointCode::from_raw(0x0102));
        let mtp3 = Mtp3::new(config.clone());
        (config, mtp3, MessageQueue::new())
    }

    fn from_user(msg: SapMsgInner) -> SapMsg {
        SapMsg { sap: Sap::L3Sap, src: MtpEntity::User, dest: MtpEntity::Mtp3, time: BitTime::default(), msg }
    }

    fn from_link(ind: L2Ind) -> SapMsg {
        SapMsg { sap: Sap::L2Sap, src: MtpEntity::Mtp2, dest: MtpEntity::Mtp3, time: BitTime::default(), msg: SapMsgInner::L2Ind(ind) }
    }

    fn label_bytes(dcp: u64, ocp: u64, slc: u8) -> [u8; 4] {
        RoutingLabel { dcp: PointCode::from_raw(dcp), ocp: PointCode::from_raw(ocp), slc }.to_bytes()
    }

    #[test]
    fn test_transfer_adds_label() {
        debug::setup_logging_verbose();
        let (_config, mut mtp3, mut queue) = setup();
        mtp3.rx_prim(&mut queue, from_user(SapMsgInner::L3TransferReq(L3TransferReq { slc: 3, data: vec![0xaa, 0xbb] })));

        let msg = queue.pop_front().unwrap();
        assert_eq!(msg.dest, MtpEntity::Mtp2);
        let SapMsgInner::L2DataReq(req) = msg.msg else { panic!() };
        assert_eq!(req.sio, 0xcd);
        let mut expected = label_bytes(0x0102, 0x0201, 3).to_vec();
        expected.extend_from_slice(&[0xaa, 0xbb]);
        assert_eq!(req.sif, expected);
    }

    #[test]
    fn test_control_passes_through() {
        debug::setup_logging_verbose();
        let (_config, mut mtp3, mut queue) = setup();
        mtp3.rx_prim(&mut queue, from_user(SapMsgInner::L3ControlReq(L3ControlReq { prim: Mtp2Prim::Start })));
        let SapMsgInner::L2ControlReq(req) = queue.pop_front().unwrap().msg else { panic!() };
        assert_eq!(req.prim, Mtp2Prim::Start);
    }

    #[test]
    fn test_receive_filters() {
        debug::setup_logging_verbose();
        let (_config, mut mtp3, mut queue) = setup();

        let mut good = label_bytes(0x0201, 0x0102, 7).to_vec();
        good.extend_from_slice(&[1, 2, 3]);
        mtp3.rx_prim(&mut queue, from_link(L2Ind::Data { sio: 0xcd, sif: good.clone() }));
        let msg = queue.pop_front().unwrap();
        assert_eq!(msg.dest, MtpEntity::User);
        let SapMsgInner::L3Ind(ind) = msg.msg else { panic!() };
        assert_eq!(ind, L3Ind::Transfer { sio: 0xcd, slc: 7, data: vec![1, 2, 3] });

        // Management, foreign SIO, swapped point codes, short SIF
        mtp3.rx_prim(&mut queue, from_link(L2Ind::Data { sio: 0xc0, sif: good.clone() }));
        mtp3.rx_prim(&mut queue, from_link(L2Ind::Data { sio: 0xce, sif: good.clone() }));
        let mut wrong = label_bytes(0x0102, 0x0201, 7).to_vec();
        wrong.push(1);
        mtp3.rx_prim(&mut queue, from_link(L2Ind::Data { sio: 0xcd, sif: wrong }));
        mtp3.rx_prim(&mut queue, from_link(L2Ind::Data { sio: 0xcd, sif: vec![1, 2, 3] }));
        assert!(queue.is_empty());
        assert_eq!(mtp3.dropped(), 4);
    }

    #[test]
    fn test_status_updates_state() {
        debug::setup_logging_verbose();
        let (config, mut mtp3, mut queue) = setup();

        mtp3.rx_prim(&mut queue, from_link(L2Ind::InService));
        assert!(config.state_read().link_in_service);
        mtp3.rx_prim(&mut queue, from_link(L2Ind::RemoteProcessorOutage));
        assert!(config.state_read().remote_processor_outage);
        mtp3.rx_prim(&mut queue, from_link(L2Ind::OutOfService(OutOfServiceCause::LinkFailureRemote)));
        assert!(!config.state_read().link_in_service);
        assert!(!config.state_read().remote_processor_outage);

        let inds: Vec<L3Ind> = std::iter::from_fn(|| queue.pop_front())
            .map(|m| match m.msg {
                SapMsgInner::L3Ind(ind) => ind,
                _ => panic!(),
            })
            .collect();
        assert_eq!(
            inds,
            vec![
                L3Ind::InService,
                L3Ind::RemoteProcessorOutage,
                L3Ind::OutOfService(OutOfServiceCause::LinkFailureRemote),
            ]
        );
    }
}

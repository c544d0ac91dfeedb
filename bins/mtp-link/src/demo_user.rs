use mtp_config::SharedConfig;
use mtp_core::mtp_entities::MtpEntity;
use mtp_core::{BitTime, PointCode, Sap};
use mtp_entities::{MessageQueue, MtpEntityTrait};
use mtp_pdus::mtp3::fields::routing_label::{ROUTING_LABEL_LEN, RoutingLabel};
use mtp_pdus::mtp3::pdus::user_message::UserMessage;
use mtp_saps::l2::Mtp2Prim;
use mtp_saps::l3::{L3ControlReq, L3Ind, L3TransferReq};
use mtp_saps::{SapMsg, SapMsgInner};

const OPCODE_KEEPALIVE: u8 = 0x01;
const OPCODE_KEEPALIVE_ACK: u8 = 0x02;

/// Seconds between keep-alive messages while the link is in service
const KEEPALIVE_INTERVAL_SECS: f64 = 10.0;
/// Seconds to wait before restarting a link that went out of service
const RESTART_DELAY_SECS: f64 = 2.0;

/// Minimal user of the transfer service: starts the link, restarts it after a failure,
/// exchanges keep-alive messages with the peer and logs everything it receives.
pub struct DemoUser {
    config: SharedConfig,
    name: String,
    time: BitTime,
    bit_rate: u32,
    local_pc: PointCode,
    remote_pc: PointCode,

    in_service: bool,
    /// Time at which a Start is (re)issued
    start_at: Option<BitTime>,
    next_keepalive: Option<BitTime>,
    next_ident: u8,

    sent: u64,
    received: u64,
}

impl DemoUser {
    pub fn new(config: SharedConfig) -> Self {
        let cfg = config.config();
        Self {
            name: cfg.link.name.clone(),
            bit_rate: cfg.link.bit_rate,
            local_pc: cfg.link.local_pc,
            remote_pc: cfg.link.remote_pc,
            time: BitTime::default(),
            in_service: false,
            start_at: Some(BitTime::default()),
            next_keepalive: None,
            next_ident: 0,
            sent: 0,
            received: 0,
            config,
        }
    }

    fn after_secs(&self, secs: f64) -> BitTime {
        self.time.add_bits(BitTime::bits_from_secs(secs, self.bit_rate))
    }

    fn send_down(&self, queue: &mut MessageQueue, msg: SapMsgInner) {
        queue.push_back(SapMsg {
            sap: Sap::L3Sap,
            src: MtpEntity::User,
            dest: MtpEntity::Mtp3,
            time: self.time,
            msg,
        });
    }

    /// Builds the message as it appears on the link, then hands everything behind
    /// the routing label down. Mtp3 puts an identical label back in front.
    fn send_message(&mut self, queue: &mut MessageQueue, ident: u8, opcode: u8, data: Vec<u8>) {
        let msg = UserMessage {
            label: RoutingLabel { dcp: self.remote_pc, ocp: self.local_pc, slc: 0 },
            ident,
            opcode,
            data,
        };
        tracing::info!(link = %self.name, "-> {}", msg);
        let sif = msg.to_sif();
        self.send_down(queue, SapMsgInner::L3TransferReq(L3TransferReq {
            slc: msg.label.slc,
            data: sif[ROUTING_LABEL_LEN..].to_vec(),
        }));
        self.sent += 1;
    }

    fn send_keepalive(&mut self, queue: &mut MessageQueue) {
        let ident = self.next_ident;
        self.next_ident = self.next_ident.wrapping_add(1);
        self.send_message(queue, ident, OPCODE_KEEPALIVE, b"ping".to_vec());
        self.next_keepalive = Some(self.after_secs(KEEPALIVE_INTERVAL_SECS));
    }

    fn rx_transfer(&mut self, queue: &mut MessageQueue, slc: u8, data: &[u8]) {
        self.received += 1;

        // Mtp3 only passes on messages addressed from the peer to us
        let label = RoutingLabel { dcp: self.local_pc, ocp: self.remote_pc, slc };
        let mut sif = Vec::with_capacity(ROUTING_LABEL_LEN + data.len());
        sif.extend_from_slice(&label.to_bytes());
        sif.extend_from_slice(data);

        let msg = match UserMessage::from_sif(&sif) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(link = %self.name, "<- undecodable user message: {}", e);
                return;
            }
        };
        tracing::info!(link = %self.name, "<- {}", msg);

        if msg.opcode == OPCODE_KEEPALIVE {
            self.send_message(queue, msg.ident, OPCODE_KEEPALIVE_ACK, msg.data);
        }
    }

    fn rx_ind(&mut self, queue: &mut MessageQueue, ind: L3Ind) {
        match ind {
            L3Ind::InService => {
                tracing::info!(link = %self.name, "link in service");
                self.in_service = true;
                self.start_at = None;
                self.send_keepalive(queue);
            }
            L3Ind::OutOfService(cause) => {
                tracing::warn!(link = %self.name, "link out of service: {} ({} sent, {} received), restarting in {}s",
                    cause, self.sent, self.received, RESTART_DELAY_SECS);
                self.in_service = false;
                self.next_keepalive = None;
                self.start_at = Some(self.after_secs(RESTART_DELAY_SECS));
            }
            L3Ind::RemoteProcessorOutage => {
                tracing::warn!(link = %self.name, "remote processor outage");
            }
            L3Ind::RemoteProcessorRecovered => {
                tracing::info!(link = %self.name, "remote processor recovered");
            }
            L3Ind::Transfer { slc, data, .. } => {
                self.rx_transfer(queue, slc, &data);
            }
        }
    }
}

impl MtpEntityTrait for DemoUser {
    fn entity(&self) -> MtpEntity {
        MtpEntity::User
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        match message.msg {
            SapMsgInner::L3Ind(ind) => self.rx_ind(queue, ind),
            other => tracing::warn!(link = %self.name, "unexpected primitive for user: {}", other),
        }
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, time: BitTime) {
        self.time = time;

        if let Some(start_at) = self.start_at {
            if start_at.is_reached(time) {
                tracing::info!(link = %self.name, "starting link");
                self.start_at = None;
                if self.config.config().link.emergency {
                    self.send_down(queue, SapMsgInner::L3ControlReq(L3ControlReq { prim: Mtp2Prim::Emergency }));
                }
                self.send_down(queue, SapMsgInner::L3ControlReq(L3ControlReq { prim: Mtp2Prim::Start }));
            }
        }

        if self.in_service {
            if let Some(next) = self.next_keepalive {
                if next.is_reached(time) {
                    self.send_keepalive(queue);
                }
            }
        }
    }
}

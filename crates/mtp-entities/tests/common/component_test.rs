use mtp_config::{SharedConfig, StackConfig, StackState};
use mtp_core::mtp_entities::MtpEntity;
use mtp_core::{BitTime, PointCode, Sap};
use mtp_entities::mtp2::Mtp2;
use mtp_entities::mtp3::Mtp3;
use mtp_entities::phy::Phy;
use mtp_entities::phy::components::bit_dev::BitDev;
use mtp_entities::phy::components::null_dev::NullDev;
use mtp_entities::{MessageRouter, MtpEntityTrait};
use mtp_saps::l2::Mtp2Prim;
use mtp_saps::l3::{L3ControlReq, L3Ind, L3TransferReq};
use mtp_saps::sapmsg::{SapMsg, SapMsgInner};

use super::sink::Sink;

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to the ComponentTest constructor
pub fn default_test_config(name: &str) -> StackConfig {
    let mut cfg = StackConfig::new(name, 64000, PointCode::from_raw(1), PointCode::from_raw(2));
    cfg.phy_io.block_bytes = 8;
    cfg
}

/// Config for the far end of `cfg`: point codes swapped
pub fn peer_config(cfg: &StackConfig, name: &str) -> StackConfig {
    let mut peer = cfg.clone();
    peer.link.name = name.to_string();
    peer.link.local_pc = cfg.link.remote_pc;
    peer.link.remote_pc = cfg.link.local_pc;
    peer
}

/// Infrastructure for testing link stacks
/// Quick setup of entities for end-to-end testing
/// Supports optional sinks for collecting messages for later inspection
pub struct ComponentTest {
    pub config: SharedConfig,
    pub router: MessageRouter,
    pub sinks: Vec<MtpEntity>,
    /// Indications collected from the User sink so far
    user_inds: Vec<L3Ind>,
}

impl ComponentTest {
    pub fn new(config: StackConfig) -> Self {
        let shared_config = SharedConfig::from_parts(config, StackState::default());
        let router = MessageRouter::new(shared_config.clone());

        Self {
            config: shared_config,
            router,
            sinks: vec![],
            user_inds: vec![],
        }
    }

    pub fn get_shared_config(&self) -> SharedConfig {
        self.config.clone()
    }

    /// Registers the requested entities. Phy gets a NullDev, use `register_phy` for other devices.
    pub fn populate_entities(&mut self, components: Vec<MtpEntity>, sinks: Vec<MtpEntity>) {
        for component in components.iter() {
            match component {
                MtpEntity::Phy => {
                    self.register_phy(NullDev::new());
                }
                MtpEntity::Mtp2 => {
                    let mtp2 = Mtp2::new(self.config.clone());
                    self.register_entity(mtp2);
                }
                MtpEntity::Mtp3 => {
                    let mtp3 = Mtp3::new(self.config.clone());
                    self.register_entity(mtp3);
                }
                _ => {
                    panic!("Component not implemented: {:?}", component);
                }
            }
        }

        for sink in sinks.iter() {
            assert!(!self.sinks.contains(sink), "Sink already exists: {:?}", sink);
            assert!(self.router.get_entity(*sink).is_none(), "Sink already registered as entity: {:?}", sink);

            self.sinks.push(*sink);
            self.register_entity(Sink::new(*sink));
        }
    }

    pub fn register_phy<D: BitDev + Send + 'static>(&mut self, dev: D) {
        let phy = Phy::new(self.config.clone(), dev);
        self.register_entity(phy);
    }

    pub fn register_entity<T: 'static + MtpEntityTrait>(&mut self, entity: T) {
        self.router.register_entity(Box::new(entity));
    }

    pub fn run_stack(&mut self, num_ticks: Option<usize>) {
        self.router.run_stack(num_ticks, None);
    }

    pub fn run_tick(&mut self) {
        self.router.run_tick();
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        self.router.submit_message(message);
    }

    pub fn deliver_all_messages(&mut self) {
        self.router.deliver_all_messages();
    }

    fn from_user(&self, msg: SapMsgInner) -> SapMsg {
        SapMsg {
            sap: Sap::L3Sap,
            src: MtpEntity::User,
            dest: MtpEntity::Mtp3,
            time: self.router.get_time(),
            msg,
        }
    }

    /// Link control request as the user would issue it
    pub fn send_control(&mut self, prim: Mtp2Prim) {
        let msg = self.from_user(SapMsgInner::L3ControlReq(L3ControlReq { prim }));
        self.submit_message(msg);
    }

    pub fn send_transfer(&mut self, slc: u8, data: Vec<u8>) {
        let msg = self.from_user(SapMsgInner::L3TransferReq(L3TransferReq { slc, data }));
        self.submit_message(msg);
    }

    pub fn now(&self) -> BitTime {
        self.router.get_time()
    }

    pub fn mtp2(&mut self) -> &mut Mtp2 {
        self.router
            .get_entity(MtpEntity::Mtp2)
            .and_then(|e| e.as_any_mut().downcast_mut::<Mtp2>())
            .expect("Mtp2 not registered")
    }

    pub fn dump_sinks(&mut self) -> Vec<SapMsg> {
        let mut msgs = vec![];
        for sink in self.sinks.iter() {
            if let Some(component) = self.router.get_entity(*sink) {
                if let Some(sink) = component.as_any_mut().downcast_mut::<Sink>() {
                    let mut sink_msgs = sink.take_msgqueue();
                    msgs.append(&mut sink_msgs);
                }
            }
        }
        msgs
    }

    /// All indications the User sink received since the start of the test
    pub fn user_indications(&mut self) -> &[L3Ind] {
        for msg in self.dump_sinks() {
            if let SapMsgInner::L3Ind(ind) = msg.msg {
                self.user_inds.push(ind);
            }
        }
        &self.user_inds
    }

    /// Payloads of all transfer indications received so far
    pub fn received_data(&mut self) -> Vec<Vec<u8>> {
        self.user_indications()
            .iter()
            .filter_map(|ind| match ind {
                L3Ind::Transfer { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Indications other than transfers received so far
    pub fn status_indications(&mut self) -> Vec<L3Ind> {
        self.user_indications()
            .iter()
            .filter(|ind| !matches!(ind, L3Ind::Transfer { .. }))
            .cloned()
            .collect()
    }
}

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mtp_config::SharedConfig;
use mtp_core::{BitTime, mtp_entities::MtpEntity};
use mtp_saps::SapMsg;

use crate::MtpEntityTrait;


#[derive(Default)]
pub enum MessagePrio {
    Immediate,
    #[default]
    Normal,
}

pub struct MessageQueue {
    messages: VecDeque<SapMsg>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, message: SapMsg) {
        self.messages.push_back(message);
    }

    pub fn push_prio(&mut self, message: SapMsg, prio: MessagePrio) {
        match prio {
            MessagePrio::Immediate => {
                self.messages.push_front(message);
            }
            MessagePrio::Normal => {
                self.messages.push_back(message);
            }
        }
    }

    pub fn pop_front(&mut self) -> Option<SapMsg> {
        self.messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub struct MessageRouter {
    config: SharedConfig,
    entities: HashMap<MtpEntity, Box<dyn MtpEntityTrait>>,
    msg_queue: MessageQueue,

    /// Link time of the current tick, in bit periods
    time: BitTime,
    /// Bit periods covered by one tick: eight per octet exchanged with the device
    bits_per_tick: u64,
    /// Set once an entity asked for the stack to halt
    halted: bool,
}


impl MessageRouter {
    pub fn new(config: SharedConfig) -> Self {
        let bits_per_tick = 8 * config.config().phy_io.block_bytes as u64;
        Self {
            entities: HashMap::new(),
            msg_queue: MessageQueue::new(),
            config,
            time: BitTime::default(),
            bits_per_tick,
            halted: false,
        }
    }

    pub fn set_time(&mut self, time: BitTime) {
        self.time = time;
    }

    pub fn get_time(&self) -> BitTime {
        self.time
    }

    pub fn get_config(&self) -> SharedConfig {
        self.config.clone()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn register_entity(&mut self, entity: Box<dyn MtpEntityTrait>) {
        let comp_type = entity.entity();
        tracing::debug!("register_entity {:?}", comp_type);
        self.entities.insert(comp_type, entity);
    }

    /// Returns a mut ref to a component of the requested type
    pub fn get_entity(&mut self, comp: MtpEntity) -> Option<&mut dyn MtpEntityTrait> {
        self.entities.get_mut(&comp).map(|entity| entity.as_mut())
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        tracing::debug!("submit_message {:?}: {:?} -> {:?}", message.get_sap(), message.get_source(), message.get_dest());
        self.msg_queue.push_back(message);
    }

    pub fn deliver_message(&mut self) {
        let Some(message) = self.msg_queue.pop_front() else {
            return;
        };

        tracing::trace!("deliver_message: got {:?}: {:?} -> {:?}: {}", message.get_sap(), message.get_source(), message.get_dest(), message.msg);

        let dest = *message.get_dest();
        if let Some(entity) = self.entities.get_mut(&dest) {
            entity.rx_prim(&mut self.msg_queue, message);
        } else {
            tracing::warn!("deliver_message: entity {:?} not found for {:?}: {:?} -> {:?}", dest, message.get_sap(), message.get_source(), message.get_dest());
        }
    }

    pub fn deliver_all_messages(&mut self) {
        while !self.msg_queue.is_empty() {
            self.deliver_message();
        }
    }

    pub fn get_msgqueue_len(&self) -> usize {
        self.msg_queue.len()
    }

    pub fn tick_start(&mut self) {
        tracing::trace!("--- tick {} ----------------------------", self.time);

        for entity in self.entities.values_mut() {
            entity.tick_start(&mut self.msg_queue, self.time);
        }
    }

    /// Executes all end-of-tick functions:
    /// - Mtp2 produces the octets for this tick and hands them to Phy
    /// - Phy exchanges them with the device, received octets travel back up
    /// - Remaining entities finish the tick
    pub fn tick_end(&mut self) {
        let mut halt = false;

        let target = MtpEntity::Mtp2;
        if let Some(entity) = self.entities.get_mut(&target) {
            halt |= entity.tick_end(&mut self.msg_queue, self.time);
        }
        self.deliver_all_messages();

        for entity in self.entities.values_mut() {
            if entity.entity() == MtpEntity::Mtp2 {
                continue;
            }
            halt |= entity.tick_end(&mut self.msg_queue, self.time);
        }
        self.deliver_all_messages();

        if halt && !self.halted {
            tracing::info!("stack halt requested at {}", self.time);
            self.halted = true;
        }

        self.time = self.time.add_bits(self.bits_per_tick);
    }

    /// Runs a single tick: tick_start, message delivery, tick_end
    pub fn run_tick(&mut self) {
        self.tick_start();
        self.deliver_all_messages();
        self.tick_end();
    }

    /// Runs the full stack either forever or for a specified number of ticks.
    /// Stops early when `running` is cleared or an entity requests a halt.
    pub fn run_stack(&mut self, num_ticks: Option<usize>, running: Option<Arc<AtomicBool>>) {
        let mut ticks: usize = 0;

        loop {
            self.run_tick();

            if self.halted {
                break;
            }
            if let Some(ref running) = running {
                if !running.load(Ordering::SeqCst) {
                    tracing::info!("stopping stack at {}", self.time);
                    break;
                }
            }

            ticks += 1;
            if let Some(num_ticks) = num_ticks {
                if ticks >= num_ticks {
                    break;
                }
            }
        }
    }
}

use mtp_core::mtp_entities::MtpEntity;
use mtp_entities::{MessageQueue, MtpEntityTrait};
use mtp_saps::sapmsg::SapMsg;

/// An entity sink for testing purposes
/// Collects all received SapMsg messages for later inspection
pub struct Sink {
    component: MtpEntity,
    msgqueue: Vec<SapMsg>,
}

impl Sink {
    pub fn new(component: MtpEntity) -> Self {
        Self {
            component,
            msgqueue: vec![],
        }
    }

    pub fn take_msgqueue(&mut self) -> Vec<SapMsg> {
        std::mem::take(&mut self.msgqueue)
    }
}

impl MtpEntityTrait for Sink {
    fn entity(&self) -> MtpEntity {
        self.component
    }

    fn rx_prim(&mut self, _queue: &mut MessageQueue, message: SapMsg) {
        tracing::debug!("rx_prim: {:?}", message);
        self.msgqueue.push(message);
    }
}

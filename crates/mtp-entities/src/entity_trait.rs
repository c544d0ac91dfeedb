use as_any::AsAny;
use mtp_core::{BitTime, mtp_entities::MtpEntity};
use mtp_saps::SapMsg;
use crate::MessageQueue;

/// Trait for the entities of the link stack
/// Used by MessageRouter for passing messages between entities
pub trait MtpEntityTrait: Send + AsAny {
    /// Returns the entity type identifier
    fn entity(&self) -> MtpEntity;

    /// Handle incoming SAP primitive
    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg);

    /// Called at the start of each tick, with the link time of the tick
    fn tick_start(&mut self, _queue: &mut MessageQueue, _time: BitTime) { }

    /// Called at the end of each tick. Returning true asks the router to halt the stack.
    fn tick_end(&mut self, _queue: &mut MessageQueue, _time: BitTime) -> bool { false }
}

pub mod entity_trait;
pub mod messagerouter;
pub mod mtp2;
pub mod mtp3;
pub mod phy;

// Re-export commonly used items from router
pub use entity_trait::MtpEntityTrait;
pub use messagerouter::{MessagePrio, MessageQueue, MessageRouter};

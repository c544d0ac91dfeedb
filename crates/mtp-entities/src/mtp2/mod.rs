pub mod components;
pub mod mtp2_entity;
pub mod mtp2_error;
pub mod mtp2_link;
pub mod state_machine;

pub use mtp2_entity::Mtp2;
pub use mtp2_error::Mtp2Error;
pub use mtp2_link::Mtp2Link;
pub use state_machine::Mtp2State;

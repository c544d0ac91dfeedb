//! Primitives exchanged between the entities of the link stack
//!
//! - `ph`: octet blocks between the bit pump and the signalling link functions
//! - `l2`: link control and message transfer between Mtp2 and Mtp3
//! - `l3`: MTP-TRANSFER and link status between Mtp3 and its user

pub mod l2;
pub mod l3;
pub mod ph;
pub mod sapmsg;

pub use sapmsg::*;

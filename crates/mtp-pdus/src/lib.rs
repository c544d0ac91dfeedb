//! Signal unit and message layouts of the MTP link stack
//!
//! - `mtp2`: signal unit header, link status codes, complete frames with check bits
//! - `mtp3`: routing label and the user message sub-header

pub mod mtp2;
pub mod mtp3;

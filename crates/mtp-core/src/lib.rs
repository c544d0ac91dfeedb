//! Core utilities for the MTP link stack
//!
//! This crate provides fundamental types and utilities used across the stack:
//! - BitBuffer for LSB-first, octet-oriented PDU manipulation
//! - BitTime, the logical bit clock that drives all protocol timers
//! - Point codes and signalling link codes
//! - CRC-16 as used by the signal unit check bits
//! - Common macros and debug utilities

pub mod bit_time;
pub mod bitbuffer;
pub mod crc16;
pub mod debug;
pub mod mtp_common;
pub mod mtp_entities;
pub mod pdu_parse_error;
pub mod point_code;

// Re-export commonly used items
pub use bit_time::BitTime;
pub use bitbuffer::BitBuffer;
pub use mtp_common::*;
pub use pdu_parse_error::PduParseErr;
pub use point_code::*;

/// Service indicator octet as carried in front of every MSU
pub type Sio = u8;

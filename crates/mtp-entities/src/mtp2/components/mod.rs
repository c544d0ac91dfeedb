pub mod deframer;
pub mod error_monitor;
pub mod framer;
pub mod retransmit;
pub mod tap;
pub mod timers;

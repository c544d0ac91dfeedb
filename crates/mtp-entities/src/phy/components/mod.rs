pub mod bit_dev;
pub mod file_dev;
pub mod loopback_dev;
pub mod null_dev;

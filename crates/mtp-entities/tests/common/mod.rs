#![allow(dead_code)]

pub mod component_test;
pub mod link_pair;
pub mod noisy_dev;
pub mod sink;

pub use component_test::{ComponentTest, default_test_config, peer_config};
pub use link_pair::LinkPair;

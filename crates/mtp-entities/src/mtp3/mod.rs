pub mod mtp3_entity;

pub use mtp3_entity::Mtp3;

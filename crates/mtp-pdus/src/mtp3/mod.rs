pub mod fields;
pub mod pdus;

pub mod signal_unit;

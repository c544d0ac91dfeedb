pub mod routing_label;

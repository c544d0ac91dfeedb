pub mod link_status;

pub mod su_header;

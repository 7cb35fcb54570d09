pub mod blocklist;
pub mod common;
pub mod config;
pub mod stats;
pub mod timer;

//! hostedit - add, remove, list and search entries in the system hosts file.

pub mod address;
pub mod backup;
pub mod batch;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod hosts;
pub mod installer;
pub mod platform;

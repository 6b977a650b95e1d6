//! Command implementations

pub mod freeze;
pub mod generate;

//! Command implementations

pub mod batch;
pub mod profile;
pub mod trace;

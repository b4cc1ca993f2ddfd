//! Command implementations.

pub mod analyze;
pub mod backend;
pub mod config;
pub mod fuse;

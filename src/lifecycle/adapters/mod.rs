//! Adapter implementations for lifecycle ports.

pub mod logging;
pub mod memory;

//! Shared utilities for draftkeep.
//!
//! This crate provides common utilities used across the draftkeep workspace:
//! - Logging setup with tracing
//! - RAII-based timing for command handlers

pub mod log;
pub mod timing;

pub use log::{LogConfig, LogLevel};
pub use timing::TimingGuard;

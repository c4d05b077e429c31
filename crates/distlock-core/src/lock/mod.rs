//! Distributed Lock Implementation
//!
//! This module provides:
//! - Lock record model and its storage bins
//! - Lock acquire API, single-shot and blocking
//! - Lease keepalive and release

mod lease;
mod model;
mod service;

pub use lease::*;
pub use model::*;
pub use service::*;

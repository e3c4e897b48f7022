//! Input handling and the per-frame driver for the driving demo
//!
//! This crate provides:
//! - An input aggregator folding keys and on-screen buttons into control flags
//! - A rate-limited telemetry publisher
//! - The drive session that owns the car state and steps it each frame

pub mod input;
pub mod session;
pub mod telemetry;

pub use input::*;
pub use session::*;
pub use telemetry::*;

//! Shared state, parameters and model traits for the driving demo.

pub mod params;
pub mod traits;

pub use params::{Arena, DriveParams, ParamsError};
pub use traits::*;

//! Rolling resistance
//!
//! Constant-magnitude (Coulomb-like) resistance opposing the direction of
//! travel. Unlike a stiction model there is no dead zone at zero velocity:
//! a car at rest is treated as moving forward, so a small forward push is
//! always opposed and the sign never flips on `-0.0`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingResistance {
    /// Deceleration magnitude (internal units / s²)
    pub magnitude: f64,
}

impl RollingResistance {
    pub fn new(magnitude: f64) -> Self {
        Self { magnitude }
    }

    /// Acceleration contributed by resistance at the given velocity.
    pub fn compute(&self, velocity: f64) -> f64 {
        -self.magnitude * travel_sign(velocity)
    }
}

/// +1 for forward travel and for rest (including `-0.0`), -1 for reverse.
pub fn travel_sign(velocity: f64) -> f64 {
    if velocity < 0.0 { -1.0 } else { 1.0 }
}

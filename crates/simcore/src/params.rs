//! Drive parameters
//!
//! Every tunable constant of the kinematic car model, plus the arena the car
//! is confined to. Parameters are validated once at load time; the stepper
//! assumes a validated set.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("margin {margin} leaves no drivable area in a {width}x{height} arena")]
    ArenaTooSmall { width: f64, height: f64, margin: f64 },
    #[error("snap_accel ({snap_accel}) must exceed rolling_resistance ({rolling_resistance}) or coasting never settles")]
    SnapNeverSettles {
        snap_accel: f64,
        rolling_resistance: f64,
    },
    #[error("failed to parse drive parameters: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Drivable rectangle in scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    /// Inset from every wall; the car center never enters it.
    pub margin: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Arena {
            width: 960.0,
            height: 600.0,
            margin: 40.0,
        }
    }
}

impl Arena {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn min_x(&self) -> f64 {
        self.margin
    }

    pub fn max_x(&self) -> f64 {
        self.width - self.margin
    }

    pub fn min_y(&self) -> f64 {
        self.margin
    }

    pub fn max_y(&self) -> f64 {
        self.height - self.margin
    }

    /// Hard stop at the walls: no bounce, no sliding.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.clamp(self.min_x(), self.max_x()),
            y.clamp(self.min_y(), self.max_y()),
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x()..=self.max_x()).contains(&x) && (self.min_y()..=self.max_y()).contains(&y)
    }
}

/// Constants of the kinematic car model.
///
/// Velocities are in internal units per second; `pixels_per_unit` converts
/// them to scene pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    pub arena: Arena,
    /// Forward speed cap
    pub max_speed: f64,
    /// Reverse speed cap (non-positive)
    pub max_reverse_speed: f64,
    /// Forward acceleration while throttle is held
    pub throttle_accel: f64,
    /// Reverse acceleration as a fraction of `throttle_accel`
    pub reverse_factor: f64,
    /// Deceleration while braking with positive velocity
    pub brake_force: f64,
    /// Constant-magnitude deceleration opposing motion
    pub rolling_resistance: f64,
    /// Exponential steering approach rate (1/s)
    pub steering_smoothing: f64,
    /// Yaw rate at full steering and full speed (rad/s)
    pub turn_rate: f64,
    pub pixels_per_unit: f64,
    /// Below this speed a coasting car is stopped outright
    pub snap_speed: f64,
    /// ...provided the net acceleration is also below this
    pub snap_accel: f64,
    pub initial_heading: f64,
    /// Internal speed units to km/h
    pub speed_display_factor: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        DriveParams {
            arena: Arena::default(),
            max_speed: 14.0,
            max_reverse_speed: -5.0,
            throttle_accel: 7.0,
            reverse_factor: 0.6,
            brake_force: 18.0,
            rolling_resistance: 1.5,
            steering_smoothing: 8.0,
            turn_rate: 2.2,
            pixels_per_unit: 24.0,
            snap_speed: 0.25,
            snap_accel: 2.0,
            // screen y grows downward, so this faces up
            initial_heading: -FRAC_PI_2,
            speed_display_factor: 3.6,
        }
    }
}

impl DriveParams {
    pub fn from_json(text: &str) -> Result<Self, ParamsError> {
        let params: DriveParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let fields = [
            ("arena.width", self.arena.width),
            ("arena.height", self.arena.height),
            ("arena.margin", self.arena.margin),
            ("max_speed", self.max_speed),
            ("max_reverse_speed", self.max_reverse_speed),
            ("throttle_accel", self.throttle_accel),
            ("reverse_factor", self.reverse_factor),
            ("brake_force", self.brake_force),
            ("rolling_resistance", self.rolling_resistance),
            ("steering_smoothing", self.steering_smoothing),
            ("turn_rate", self.turn_rate),
            ("pixels_per_unit", self.pixels_per_unit),
            ("snap_speed", self.snap_speed),
            ("snap_accel", self.snap_accel),
            ("initial_heading", self.initial_heading),
            ("speed_display_factor", self.speed_display_factor),
        ];
        if let Some((field, value)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParamsError::NonFinite { field, value });
        }

        check(self.max_speed > 0.0, "max_speed", self.max_speed, "> 0")?;
        check(self.max_reverse_speed <= 0.0, "max_reverse_speed", self.max_reverse_speed, "<= 0")?;
        check(self.throttle_accel >= 0.0, "throttle_accel", self.throttle_accel, ">= 0")?;
        check(self.reverse_factor >= 0.0, "reverse_factor", self.reverse_factor, ">= 0")?;
        check(self.brake_force >= 0.0, "brake_force", self.brake_force, ">= 0")?;
        check(self.rolling_resistance >= 0.0, "rolling_resistance", self.rolling_resistance, ">= 0")?;
        check(self.steering_smoothing >= 0.0, "steering_smoothing", self.steering_smoothing, ">= 0")?;
        check(self.pixels_per_unit > 0.0, "pixels_per_unit", self.pixels_per_unit, "> 0")?;
        check(self.snap_speed >= 0.0, "snap_speed", self.snap_speed, ">= 0")?;
        check(self.speed_display_factor > 0.0, "speed_display_factor", self.speed_display_factor, "> 0")?;
        check(self.arena.margin >= 0.0, "arena.margin", self.arena.margin, ">= 0")?;

        let arena = self.arena;
        if arena.max_x() < arena.min_x() || arena.max_y() < arena.min_y() {
            return Err(ParamsError::ArenaTooSmall {
                width: arena.width,
                height: arena.height,
                margin: arena.margin,
            });
        }
        if self.snap_accel <= self.rolling_resistance {
            return Err(ParamsError::SnapNeverSettles {
                snap_accel: self.snap_accel,
                rolling_resistance: self.rolling_resistance,
            });
        }
        Ok(())
    }
}

fn check(ok: bool, field: &'static str, value: f64, expected: &'static str) -> Result<(), ParamsError> {
    if ok {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange { field, value, expected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(DriveParams::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params = DriveParams::from_json(r#"{ "max_speed": 20.0, "arena": { "width": 1200.0 } }"#).unwrap();
        assert_eq!(params.max_speed, 20.0);
        assert_eq!(params.arena.width, 1200.0);
        assert_eq!(params.arena.height, Arena::default().height);
        assert_eq!(params.throttle_accel, DriveParams::default().throttle_accel);
    }

    #[test]
    fn test_rejects_positive_reverse_cap() {
        let params = DriveParams { max_reverse_speed: 1.0, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange { field: "max_reverse_speed", .. })
        ));
    }

    #[test]
    fn test_rejects_margin_larger_than_arena() {
        let params = DriveParams {
            arena: Arena { width: 100.0, height: 600.0, margin: 60.0 },
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(ParamsError::ArenaTooSmall { .. })));
    }

    #[test]
    fn test_rejects_snap_threshold_below_resistance() {
        let params = DriveParams { snap_accel: 1.0, rolling_resistance: 1.5, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamsError::SnapNeverSettles { .. })));
    }

    #[test]
    fn test_rejects_non_finite() {
        let params = DriveParams { turn_rate: f64::NAN, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamsError::NonFinite { field: "turn_rate", .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(DriveParams::from_json("{ max_speed: }"), Err(ParamsError::Parse(_))));
    }

    #[test]
    fn test_arena_clamp_is_hard_stop() {
        let arena = Arena::default();
        assert_eq!(arena.clamp(-50.0, 10_000.0), (arena.min_x(), arena.max_y()));
        assert_eq!(arena.clamp(300.0, 200.0), (300.0, 200.0));
        assert!(arena.contains(arena.min_x(), arena.max_y()));
        assert!(!arena.contains(0.0, 200.0));
    }
}

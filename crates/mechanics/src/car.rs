use log::trace;
use nalgebra::Vector2;
use simcore::{CarState, ControlFlags, DriveParams, SimContext, StepResult, VehicleModel};

use crate::resistance::{RollingResistance, travel_sign};
use crate::steering::{smooth_steering, steering_target};

/// Kinematic single-track car: steering, longitudinal drive/brake, rolling
/// resistance and forward-Euler pose integration inside a walled arena.
///
/// Stateless; everything that evolves lives in [`CarState`].
#[derive(Debug, Clone)]
pub struct CarModel {
    pub params: DriveParams,
    resistance: RollingResistance,
}

impl CarModel {
    /// `params` are expected to have passed [`DriveParams::validate`].
    pub fn new(params: DriveParams) -> Self {
        CarModel {
            resistance: RollingResistance::new(params.rolling_resistance),
            params,
        }
    }

    /// Net acceleration from the pedals, before resistance.
    /// Throttle, reverse and brake are independent and stack.
    fn pedal_acceleration(&self, velocity: f64, controls: &ControlFlags) -> f64 {
        let p = &self.params;
        let mut acceleration = 0.0;
        if controls.throttle {
            acceleration += p.throttle_accel;
        }
        if controls.reverse {
            acceleration -= p.reverse_factor * p.throttle_accel;
        }
        if controls.brake {
            // Braking only bites on forward motion; at rest or in reverse it
            // pulls backward as gently as the throttle pushes forward.
            acceleration -= if velocity > 0.0 { p.brake_force } else { p.throttle_accel };
        }
        acceleration
    }

    /// Advance `state` by `dt` seconds. Total for any `dt >= 0`; with `dt == 0`
    /// an in-bounds state comes back unchanged.
    pub fn step(&self, state: &CarState, dt: f64, controls: &ControlFlags) -> StepResult {
        let p = &self.params;
        let mut next = *state;

        next.steering = smooth_steering(state.steering, steering_target(controls), p.steering_smoothing, dt);

        let acceleration = self.pedal_acceleration(state.velocity, controls) + self.resistance.compute(state.velocity);

        next.velocity = (state.velocity + acceleration * dt).clamp(p.max_reverse_speed, p.max_speed);

        // Resistance alone can stop the car but never carries it through
        // rest, whatever the frame length.
        let pedals_idle = !controls.throttle && !controls.reverse && !controls.brake;
        if pedals_idle && dt > 0.0 && travel_sign(next.velocity) != travel_sign(state.velocity) {
            trace!("resistance stopped the car from {:.4}", state.velocity);
            next.velocity = 0.0;
        }

        let coasting = !controls.throttle && !controls.reverse;
        if coasting
            && dt > 0.0
            && next.velocity.abs() < p.snap_speed
            && acceleration.abs() < p.snap_accel
        {
            trace!("snap to rest from {:.4}", next.velocity);
            next.velocity = 0.0;
        }

        // Turn authority comes from the speed entering the step, so a car
        // that starts rolling this step has not yet turned: no pivoting in place.
        let turn_intensity = (state.velocity.abs() / p.max_speed).min(1.0);
        next.heading += next.steering * p.turn_rate * dt * turn_intensity;

        let forward = Vector2::new(next.heading.cos(), next.heading.sin());
        let travel = forward * (next.velocity * dt * p.pixels_per_unit);
        (next.x, next.y) = p.arena.clamp(state.x + travel.x, state.y + travel.y);

        StepResult {
            state: next,
            acceleration,
        }
    }
}

impl VehicleModel for CarModel {
    fn params(&self) -> &DriveParams {
        &self.params
    }

    fn step_vehicle(&self, ctx: SimContext, state: &CarState, controls: &ControlFlags) -> StepResult {
        self.step(state, ctx.dt, controls)
    }
}

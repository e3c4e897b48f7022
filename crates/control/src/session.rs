//! Drive session
//!
//! Owns the live [`CarState`] and threads it through the vehicle model once
//! per frame. Frame timestamps come from the caller (seconds on any monotonic
//! clock); the session turns them into step durations.

use log::info;
use mechanics::CarModel;
use simcore::{CarState, ControlFlags, SimContext, Telemetry, VehicleModel};
use std::time::Duration;

use crate::telemetry::TelemetryPublisher;

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub state: CarState,
    pub dt: f64,
    pub acceleration: f64,
    /// Present only on ticks where the publisher was due.
    pub telemetry: Option<Telemetry>,
}

#[derive(Debug, Clone)]
pub struct DriveSession<M: VehicleModel = CarModel> {
    model: M,
    state: CarState,
    last_frame: Option<f64>,
    last_acceleration: f64,
    sim_time: f64,
    publisher: TelemetryPublisher,
}

impl<M: VehicleModel> DriveSession<M> {
    pub fn new(model: M, publish_interval: Duration) -> Self {
        DriveSession {
            state: model.initial_state(),
            model,
            last_frame: None,
            last_acceleration: 0.0,
            sim_time: 0.0,
            publisher: TelemetryPublisher::new(publish_interval),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn state(&self) -> &CarState {
        &self.state
    }

    pub fn last_acceleration(&self) -> f64 {
        self.last_acceleration
    }

    /// Simulated seconds since start or the last reset.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn telemetry(&self) -> Option<Telemetry> {
        self.publisher.latest()
    }

    /// Advance to the frame stamped `now`. The first tick after construction,
    /// reset or [`Self::suspend`] steps with `dt = 0`. A clock that runs
    /// backwards also yields `dt = 0`.
    pub fn tick(&mut self, now: f64, controls: &ControlFlags) -> Frame {
        let dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);

        let ctx = SimContext { dt };
        let result = self.model.step_vehicle(ctx, &self.state, controls);
        self.state = result.state;
        self.last_acceleration = result.acceleration;
        self.sim_time += dt;

        let (state, acceleration, params) = (self.state, self.last_acceleration, self.model.params());
        let telemetry = self
            .publisher
            .offer(now, || Telemetry::from_state(&state, acceleration, params));

        Frame {
            state: self.state,
            dt,
            acceleration: self.last_acceleration,
            telemetry,
        }
    }

    /// Forget the frame clock (e.g. while paused) so the next tick does not
    /// integrate the time spent away.
    pub fn suspend(&mut self) {
        self.last_frame = None;
    }

    /// Back to the initial pose with fresh time bookkeeping. Control flags
    /// live with the input aggregator and are untouched.
    pub fn reset(&mut self) {
        info!("session reset");
        self.state = self.model.initial_state();
        self.last_frame = None;
        self.last_acceleration = 0.0;
        self.sim_time = 0.0;
        self.publisher.rearm();
    }
}

impl DriveSession<CarModel> {
    pub fn with_car(model: CarModel) -> Self {
        Self::new(model, crate::telemetry::DEFAULT_PUBLISH_INTERVAL)
    }
}

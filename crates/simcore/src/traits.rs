use serde::{Deserialize, Serialize};

use crate::params::DriveParams;

// Vehicle State
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub x: f64,
    pub y: f64,
    pub velocity: f64, // along heading, negative = reverse
    pub heading: f64,  // rad, never normalized here
    pub steering: f64, // smoothed deflection in [-1, 1]
}

impl CarState {
    /// Resting pose at the arena center.
    pub fn initial(params: &DriveParams) -> Self {
        let (x, y) = params.arena.center();
        CarState {
            x,
            y,
            velocity: 0.0,
            heading: params.initial_heading,
            steering: 0.0,
        }
    }
}

// Control Traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Throttle,
    Brake,
    Left,
    Right,
    Reverse,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Throttle,
        Control::Brake,
        Control::Left,
        Control::Right,
        Control::Reverse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::Throttle => "throttle",
            Control::Brake => "brake",
            Control::Left => "left",
            Control::Right => "right",
            Control::Reverse => "reverse",
        }
    }

    pub fn from_name(name: &str) -> Option<Control> {
        Control::ALL.into_iter().find(|c| c.name() == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub throttle: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl ControlFlags {
    pub fn get(&self, control: Control) -> bool {
        match control {
            Control::Throttle => self.throttle,
            Control::Brake => self.brake,
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Reverse => self.reverse,
        }
    }

    pub fn set(&mut self, control: Control, active: bool) {
        let slot = match control {
            Control::Throttle => &mut self.throttle,
            Control::Brake => &mut self.brake,
            Control::Left => &mut self.left,
            Control::Right => &mut self.right,
            Control::Reverse => &mut self.reverse,
        };
        *slot = active;
    }

    pub fn with(mut self, control: Control) -> Self {
        self.set(control, true);
        self
    }

    pub fn clear(&mut self) {
        *self = ControlFlags::default();
    }

    pub fn any(&self) -> bool {
        Control::ALL.into_iter().any(|c| self.get(c))
    }
}

// Telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    /// |velocity| in display units (km/h with the default factor).
    pub speed: f64,
    /// Heading in [0, 360).
    pub heading_deg: f64,
    /// Net acceleration of the most recent step, internal units.
    pub acceleration: f64,
}

impl Telemetry {
    pub fn from_state(state: &CarState, acceleration: f64, params: &DriveParams) -> Self {
        Telemetry {
            speed: state.velocity.abs() * params.speed_display_factor,
            heading_deg: display_heading_deg(state.heading),
            acceleration,
        }
    }
}

pub fn display_heading_deg(heading: f64) -> f64 {
    let deg = heading.to_degrees().rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if deg >= 360.0 { 0.0 } else { deg }
}

// General Traits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub state: CarState,
    pub acceleration: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    /// Step length (s)
    pub dt: f64,
}

pub trait VehicleModel {
    fn params(&self) -> &DriveParams;

    fn initial_state(&self) -> CarState {
        CarState::initial(self.params())
    }

    fn step_vehicle(&self, ctx: SimContext, state: &CarState, controls: &ControlFlags) -> StepResult;
}

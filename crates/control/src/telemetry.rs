//! Rate-limited telemetry publishing
//!
//! Simulation runs every frame; the readout only needs a few updates per
//! second. The publisher enforces a minimum wall-clock interval between
//! publishes and only builds the telemetry when it is actually due.

use simcore::Telemetry;
use std::time::Duration;

pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct TelemetryPublisher {
    min_interval: f64,
    last_publish: Option<f64>,
    latest: Option<Telemetry>,
}

impl Default for TelemetryPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_INTERVAL)
    }
}

impl TelemetryPublisher {
    pub fn new(min_interval: Duration) -> Self {
        TelemetryPublisher {
            min_interval: min_interval.as_secs_f64(),
            last_publish: None,
            latest: None,
        }
    }

    /// A clock that jumped backwards counts as due, like a fresh start.
    pub fn is_due(&self, now: f64) -> bool {
        match self.last_publish {
            None => true,
            Some(last) => now < last || now - last >= self.min_interval,
        }
    }

    /// Publishes `make()` if the interval has elapsed since the last publish.
    pub fn offer(&mut self, now: f64, make: impl FnOnce() -> Telemetry) -> Option<Telemetry> {
        if !self.is_due(now) {
            return None;
        }
        let telemetry = make();
        self.last_publish = Some(now);
        self.latest = Some(telemetry);
        Some(telemetry)
    }

    /// Most recently published value.
    pub fn latest(&self) -> Option<Telemetry> {
        self.latest
    }

    /// Makes the next offer publish regardless of the interval.
    pub fn rearm(&mut self) {
        self.last_publish = None;
    }
}

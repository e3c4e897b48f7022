use simcore::ControlFlags;

/// -1 for left alone, +1 for right alone. Both or neither centers the wheel.
pub fn steering_target(controls: &ControlFlags) -> f64 {
    match (controls.left, controls.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Exponential approach toward `target`. The blend factor saturates at 1 so a
/// long frame lands on the target instead of overshooting it.
pub fn smooth_steering(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    let blend = (rate * dt).min(1.0);
    (current + (target - current) * blend).clamp(-1.0, 1.0)
}

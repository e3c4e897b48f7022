//! Randomized sweeps over states, timesteps and control combinations.

use mechanics::CarModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simcore::{CarState, Control, ControlFlags, DriveParams};

const SWEEPS: usize = 5_000;

fn random_controls(rng: &mut StdRng) -> ControlFlags {
    let mut flags = ControlFlags::default();
    for control in Control::ALL {
        flags.set(control, rng.gen_bool(0.5));
    }
    flags
}

fn random_state(rng: &mut StdRng, params: &DriveParams) -> CarState {
    let arena = params.arena;
    CarState {
        x: rng.gen_range(arena.min_x()..=arena.max_x()),
        y: rng.gen_range(arena.min_y()..=arena.max_y()),
        velocity: rng.gen_range(params.max_reverse_speed..=params.max_speed),
        heading: rng.gen_range(-20.0..20.0),
        steering: rng.gen_range(-1.0..=1.0),
    }
}

fn random_dt(rng: &mut StdRng) -> f64 {
    match rng.gen_range(0..4) {
        0 => 0.0,
        1 => rng.gen_range(0.0..0.05),
        2 => rng.gen_range(0.05..2.0),
        _ => rng.gen_range(2.0..600.0), // a backgrounded tab
    }
}

#[test]
fn test_state_stays_within_bounds_for_any_dt() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..SWEEPS {
        let state = random_state(&mut rng, &params);
        let controls = random_controls(&mut rng);
        let dt = random_dt(&mut rng);
        let next = model.step(&state, dt, &controls).state;

        assert!(
            (params.max_reverse_speed..=params.max_speed).contains(&next.velocity),
            "velocity {} escaped after dt={dt} from {state:?}",
            next.velocity
        );
        assert!((-1.0..=1.0).contains(&next.steering), "steering {}", next.steering);
        assert!(params.arena.contains(next.x, next.y), "position ({}, {})", next.x, next.y);
    }
}

#[test]
fn test_out_of_range_positions_are_pulled_inside() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..SWEEPS {
        let state = CarState {
            x: rng.gen_range(-5_000.0..5_000.0),
            y: rng.gen_range(-5_000.0..5_000.0),
            ..random_state(&mut rng, &params)
        };
        let controls = random_controls(&mut rng);
        let next = model.step(&state, random_dt(&mut rng), &controls).state;
        assert!(params.arena.contains(next.x, next.y));
    }
}

#[test]
fn test_zero_dt_leaves_state_untouched() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..SWEEPS {
        let state = random_state(&mut rng, &params);
        let controls = random_controls(&mut rng);
        assert_eq!(model.step(&state, 0.0, &controls).state, state);
    }
}

#[test]
fn test_stepping_is_deterministic() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..500 {
        let state = random_state(&mut rng, &params);
        let controls = random_controls(&mut rng);
        let dt = random_dt(&mut rng);
        assert_eq!(model.step(&state, dt, &controls), model.step(&state, dt, &controls));
    }
}

#[test]
fn test_one_second_of_throttle_from_rest() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let throttle = ControlFlags::default().with(Control::Throttle);
    let mut state = CarState::initial(&params);

    for _ in 0..60 {
        let next = model.step(&state, 1.0 / 60.0, &throttle).state;
        assert!(next.velocity > state.velocity);
        assert!(next.velocity <= params.max_speed);
        state = next;
    }
    let expected = (params.throttle_accel - params.rolling_resistance).min(params.max_speed);
    assert!((state.velocity - expected).abs() < 1e-9);
}

#[test]
fn test_long_throttle_saturates_at_max_speed() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let throttle = ControlFlags::default().with(Control::Throttle);
    let mut state = CarState {
        heading: 0.0,
        ..CarState::initial(&params)
    };

    for _ in 0..600 {
        state = model.step(&state, 1.0 / 60.0, &throttle).state;
        assert!(state.velocity <= params.max_speed);
    }
    assert_eq!(state.velocity, params.max_speed);
}

#[test]
fn test_coasting_settles_to_exact_rest() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(13);

    for _ in 0..200 {
        let mut state = CarState {
            velocity: rng.gen_range(params.max_reverse_speed..=params.max_speed),
            ..CarState::initial(&params)
        };
        let dt = rng.gen_range(0.005..0.1);
        for _ in 0..((30.0 / dt) as usize) {
            state = model.step(&state, dt, &ControlFlags::default()).state;
        }
        assert_eq!(state.velocity, 0.0, "dt={dt}");
    }
}

#[test]
fn test_idle_car_never_creeps_at_low_frame_rates() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(21);
    let start = CarState::initial(&params);

    for _ in 0..200 {
        let dt = rng.gen_range(0.1..5.0);
        let mut state = start;
        for _ in 0..50 {
            state = model.step(&state, dt, &ControlFlags::default()).state;
        }
        assert_eq!(state, start, "dt={dt}");
    }
}

#[test]
fn test_coasting_settles_at_slow_frames() {
    let params = DriveParams::default();
    let model = CarModel::new(params);
    let mut rng = StdRng::seed_from_u64(34);

    for _ in 0..200 {
        let mut state = CarState {
            velocity: rng.gen_range(params.max_reverse_speed..=params.max_speed),
            ..CarState::initial(&params)
        };
        let dt = rng.gen_range(0.1..1.0);
        for _ in 0..((30.0 / dt) as usize) {
            state = model.step(&state, dt, &ControlFlags::default()).state;
        }
        assert_eq!(state.velocity, 0.0, "dt={dt}");
    }
}

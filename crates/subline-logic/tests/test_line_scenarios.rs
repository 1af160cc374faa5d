//! Integration tests for whole-line scenarios.
//!
//! Exercises: LineConfig → LineState → boarding/station placement
//! → tick loop (friction, integration, exchange, projection)
//!
//! All tests are pure logic with seeded generators, no rendering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use subline_logic::color::RiderColor::{self, *};
use subline_logic::config::LineConfig;
use subline_logic::engine::{tick, LineEngine};
use subline_logic::exchange::{add_rider, create_station, Placement};
use subline_logic::projection::{car_occupied_cells, render_colors};
use subline_logic::state::{LineState, Station};

const FRAME: f64 = 1.0 / 60.0;

// ── Helpers ────────────────────────────────────────────────────────────

fn stations_overlap(a: &Station, b: &Station, len: usize) -> bool {
    let (ra, rb) = (a.cells(len), b.cells(len));
    ra.start() <= rb.end() && rb.start() <= ra.end()
}

fn assert_station_invariants(s: &LineState, context: &str) {
    for (i, a) in s.stations.iter().enumerate() {
        for b in &s.stations[i + 1..] {
            assert_ne!(a.dropoff, b.dropoff, "{context}: two {} stations", a.dropoff.name());
            assert!(
                !stations_overlap(a, b, s.station_length),
                "{context}: {a:?} overlaps {b:?}"
            );
        }
    }
    for &seat in &s.seats {
        if seat.is_rider() {
            assert!(
                s.station_for(seat).is_some(),
                "{context}: {} seated without a station",
                seat.name()
            );
        }
    }
}

/// Fill every seat starting from one green station at 35.
fn filled_line(seed: u64) -> (LineState, ChaCha8Rng) {
    let config = LineConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut s = LineState::new(&config).unwrap();
    assert_eq!(
        create_station(&mut s, Green, Some(35), &mut rng),
        Placement::Placed(35)
    );

    let mut attempts = 0;
    while s.first_empty_seat().is_some() {
        add_rider(&mut s, &[], None, &mut rng);
        attempts += 1;
        assert!(attempts < 100, "seed {seed}: seats never filled");
    }
    (s, rng)
}

// ── End-to-end ─────────────────────────────────────────────────────────

#[test]
fn filling_seats_gives_one_station_per_color() {
    for seed in 0..40 {
        let (s, _) = filled_line(seed);
        assert_eq!(s.occupied_seats(), 4);
        assert_eq!(s.stations[0], Station::new(35, Green));
        assert_station_invariants(&s, &format!("seed {seed}"));
    }
}

#[test]
fn car_coasting_to_rest_over_station_drops_riders() {
    let config = LineConfig::default();
    for seed in 0..40 {
        let (mut s, mut rng) = filled_line(seed);
        s.seats[0] = Green;
        let every_color_has_station = s
            .rider_pool
            .iter()
            .all(|&c| s.station_for(c).is_some());

        // Coast west into the green station, 22..=35.
        s.car_position = 34.9;
        s.car_velocity = 0.1;
        let mut dropped = Vec::new();
        let mut ticks = 0;
        loop {
            let report = tick(&mut s, &config, Some(FRAME), &mut rng);
            dropped.extend(report.dropped);
            ticks += 1;
            if s.car_velocity == 0.0 || ticks > 100 {
                break;
            }
        }
        assert_eq!(s.car_velocity, 0.0);
        assert_eq!(dropped.first(), Some(&Green), "seed {seed}");
        assert!(s.seats[0].is_rider(), "seed {seed}: seat 0 refilled");

        if every_color_has_station {
            assert_ne!(s.seats[0], Green, "seed {seed}");
            let car = car_occupied_cells(&s);
            assert!(car.values().all(|&c| c != Green), "seed {seed}: {:?}", s.seats);
            let colors = render_colors(&s);
            for cell in car.keys() {
                assert_ne!(colors[*cell], Green);
            }
        }
        assert_station_invariants(&s, &format!("seed {seed} after exchange"));
    }
}

// ── Physics properties ─────────────────────────────────────────────────

#[test]
fn one_long_tick_matches_two_short_ticks() {
    let config = LineConfig {
        friction: 0.0,
        ..Default::default()
    };
    for v in [0.5, -0.5, 1.25, 2.0] {
        let mut a = LineState::new(&config).unwrap();
        a.car_position = 70.0;
        a.car_velocity = v;
        let mut b = a.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        tick(&mut a, &config, Some(2.0 * FRAME), &mut rng);
        tick(&mut b, &config, Some(FRAME), &mut rng);
        tick(&mut b, &config, Some(FRAME), &mut rng);

        assert_eq!(a.car_position, b.car_position, "v={v}");
        assert_eq!(a.car_position, 70.0 + 2.0 * v);
    }
}

#[test]
fn friction_brings_engine_to_rest() {
    let mut engine = LineEngine::new(LineConfig::default()).unwrap();
    // 0.6 at 0.005 per tick stops within about 120 ticks
    for _ in 0..130 {
        engine.step(Some(FRAME));
    }
    assert_eq!(engine.state().car_velocity, 0.0);
    let parked = engine.state().car_position;
    engine.step(Some(10.0 * FRAME));
    assert_eq!(engine.state().car_position, parked);
}

// ── Determinism ────────────────────────────────────────────────────────

fn scripted_run(seed: u64) -> LineState {
    let config = LineConfig {
        seed,
        ..Default::default()
    };
    let mut engine = LineEngine::new(config).unwrap();
    let mut script = StdRng::seed_from_u64(7);
    for frame in 0..3000 {
        if script.gen_bool(0.05) {
            let key = if script.gen_bool(0.5) { "a" } else { "l" };
            engine.press_key(key);
        }
        engine.update(frame as f64 * FRAME);
    }
    engine.state().clone()
}

#[test]
fn same_seed_same_run() {
    assert_eq!(scripted_run(42), scripted_run(42));
    assert_eq!(scripted_run(1234), scripted_run(1234));
}

// ── Long-run invariants ────────────────────────────────────────────────

#[test]
fn invariants_hold_over_long_random_run() {
    for seed in [1, 2, 3] {
        let config = LineConfig {
            seed,
            ..Default::default()
        };
        let mut engine = LineEngine::new(config.clone()).unwrap();
        let mut script = StdRng::seed_from_u64(seed + 100);
        let mut station_count = engine.state().stations.len();

        for frame in 0..10_000u32 {
            // Bursts of key presses, then long coasts so the car stops.
            if frame % 600 < 10 && script.gen_bool(0.5) {
                let key = if script.gen_bool(0.5) { "f" } else { "j" };
                engine.press_key(key);
            }
            let report = engine.step(Some(FRAME));

            let s = engine.state();
            assert!(s.car_velocity.abs() <= config.max_speed);
            assert!(s.car_position >= 0.0 && s.car_position <= s.track_length as f64);
            assert_eq!(s.seats.len(), 4);
            assert!(s.stations.len() >= station_count, "stations never removed");
            station_count = s.stations.len();
            assert_eq!(report.colors.len(), s.track_length);
            assert!(!report.colors.contains(&RiderColor::EmptySeat) || s.occupied_seats() < 4);
        }
        assert_station_invariants(engine.state(), &format!("seed {seed}"));
    }
}

//! Subline Headless Simulation Harness
//!
//! Drives the line logic without a window or keyboard and checks its
//! invariants along the way. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p subline-simtest
//!   cargo run -p subline-simtest -- --verbose
//!   cargo run -p subline-simtest -- --seed 7 --frames 20000 --keys "aaaa....llll"
//!   cargo run -p subline-simtest -- --config my_line.json --json

use std::process;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use subline_logic::color::RiderColor;
use subline_logic::config::{validate_config, LineConfig};
use subline_logic::engine::{tick, LineEngine};
use subline_logic::exchange::{create_station, Placement};
use subline_logic::physics::{apply_friction, integrate_position};
use subline_logic::state::{LineState, Station};

// ── Default line (same JSON shipped with the harness) ───────────────────
const DEFAULT_CONFIG_JSON: &str = include_str!("../data/line_config.json");

const USAGE: &str = "usage: subline-simtest [--verbose] [--json] [--seed N] [--frames N] \
[--config PATH] [--keys SCRIPT] [--key-interval N]";

// ── Command line ────────────────────────────────────────────────────────

struct Options {
    verbose: bool,
    json: bool,
    seed: Option<u64>,
    frames: u32,
    config_path: Option<String>,
    /// One key per slot; '.' means no press.
    keys: String,
    /// Frames between key slots.
    key_interval: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbose: false,
            json: false,
            seed: None,
            frames: 6000,
            config_path: None,
            keys: "aaaa......".repeat(4) + "llllll....",
            key_interval: 45,
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--seed" => options.seed = Some(parse_value(&arg, args.next())?),
            "--frames" => options.frames = parse_value(&arg, args.next())?,
            "--config" => options.config_path = Some(require_value(&arg, args.next())?),
            "--keys" => options.keys = require_value(&arg, args.next())?,
            "--key-interval" => {
                options.key_interval = parse_value(&arg, args.next())?;
                if options.key_interval == 0 {
                    return Err("--key-interval must be positive".into());
                }
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(options)
}

fn require_value(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let raw = require_value(flag, value)?;
    raw.parse()
        .map_err(|_| format!("{} got invalid value '{}'", flag, raw))
}

fn load_config(options: &Options) -> Result<LineConfig, String> {
    let json = match &options.config_path {
        Some(path) => {
            log::info!("loading line config from {}", path);
            std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config '{}': {}", path, e))?
        }
        None => DEFAULT_CONFIG_JSON.to_string(),
    };
    let mut config: LineConfig =
        serde_json::from_str(&json).map_err(|e| format!("config parse error: {}", e))?;
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    Ok(config)
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    frames: u32,
    dropoffs: usize,
    final_position: f64,
    final_velocity: f64,
    seats: Vec<RiderColor>,
    stations: Vec<Station>,
    passed: usize,
    failed: usize,
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .try_init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    let config = match load_config(&options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    println!("=== Subline Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Config validation
    let config_ok = validate_line_config(&config, &mut results);
    if !config_ok {
        report(&results, options.verbose);
        process::exit(1);
    }

    // 2. Physics properties
    results.extend(validate_physics(&config));

    // 3. Station placement sweep
    results.extend(validate_station_placement(&config));

    // 4. Scripted drive
    let (drive_results, outcome) = validate_drive(&config, &options);
    results.extend(drive_results);

    // 5. Determinism
    if let Some(outcome) = &outcome {
        results.extend(validate_determinism(&config, &options, &outcome.state));
    }

    // ── Summary ──
    let (passed, failed) = report(&results, options.verbose);

    if let Some(outcome) = outcome.as_ref().filter(|_| options.json) {
        let summary = RunSummary {
            seed: config.seed,
            frames: options.frames,
            dropoffs: outcome.dropoffs,
            final_position: outcome.state.car_position,
            final_velocity: outcome.state.car_velocity,
            seats: outcome.state.seats.clone(),
            stations: outcome.state.stations.clone(),
            passed,
            failed,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: cannot encode summary: {}", e),
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

fn report(results: &[TestResult], verbose: bool) -> (usize, usize) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    (passed, failed)
}

/// One character per track cell.
fn track_line(colors: &[RiderColor]) -> String {
    colors
        .iter()
        .map(|c| match c {
            RiderColor::EmptyTrack => '.',
            RiderColor::EmptySeat => '_',
            RiderColor::Purple => 'P',
            RiderColor::Green => 'G',
            RiderColor::Gold => 'Y',
            RiderColor::Blue => 'B',
        })
        .collect()
}

fn stations_overlap(stations: &[Station], station_length: usize) -> bool {
    stations.iter().enumerate().any(|(i, a)| {
        stations[i + 1..].iter().any(|b| {
            let (ra, rb) = (a.cells(station_length), b.cells(station_length));
            ra.start() <= rb.end() && rb.start() <= ra.end()
        })
    })
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_line_config(config: &LineConfig, results: &mut Vec<TestResult>) -> bool {
    println!("--- Config ---");
    let errors = validate_config(config);
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "{} cells, {} seats, {} rider kinds, seed {}",
                config.track_length,
                config.seat_count,
                config.rider_pool.len(),
                config.seed
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });
    errors.is_empty()
}

// ── 2. Physics ──────────────────────────────────────────────────────────

fn validate_physics(config: &LineConfig) -> Vec<TestResult> {
    println!("--- Physics ---");
    let mut results = Vec::new();
    let Ok(base) = LineState::new(config) else {
        return results;
    };

    // Friction never overshoots zero
    if config.friction == 0.0 {
        results.push(TestResult {
            name: "physics_friction_monotonic".into(),
            passed: true,
            detail: "friction disabled, skipped".into(),
        });
    } else {
        check_friction(config, &base, &mut results);
    }

    // Wraparound lands exactly on the asymmetric bounds
    let len = config.track_length as f64;
    let mut high = base.clone();
    high.car_velocity = 0.0;
    high.car_position = len + 0.5;
    integrate_position(&mut high, Some(config.frame_rate), config.frame_rate);
    let mut low = base.clone();
    low.car_velocity = 0.0;
    low.car_position = -0.5;
    integrate_position(&mut low, Some(config.frame_rate), config.frame_rate);
    results.push(TestResult {
        name: "physics_wraparound".into(),
        passed: high.car_position == 0.0 && low.car_position == len - 1.0,
        detail: format!(
            "len+0.5 → {}, -0.5 → {}",
            high.car_position, low.car_position
        ),
    });

    // Slow host ticks cover the same ground
    let frictionless = LineConfig {
        friction: 0.0,
        ..config.clone()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut once = base.clone();
    once.car_position = len / 2.0;
    once.car_velocity = config.max_speed / 2.0;
    let mut twice = once.clone();
    tick(&mut once, &frictionless, Some(2.0 * config.frame_rate), &mut rng);
    tick(&mut twice, &frictionless, Some(config.frame_rate), &mut rng);
    tick(&mut twice, &frictionless, Some(config.frame_rate), &mut rng);
    results.push(TestResult {
        name: "physics_frame_rate_independent".into(),
        passed: (once.car_position - twice.car_position).abs() < 1e-9,
        detail: format!(
            "one 2-frame tick → {:.3}, two 1-frame ticks → {:.3}",
            once.car_position, twice.car_position
        ),
    });

    results
}

fn check_friction(config: &LineConfig, base: &LineState, results: &mut Vec<TestResult>) {
    let mut s = base.clone();
    s.car_velocity = config.max_speed;
    let mut monotonic = true;
    let mut ticks = 0u32;
    while s.car_velocity != 0.0 && ticks < 1_000_000 {
        let before = s.car_velocity;
        apply_friction(&mut s, config.friction);
        monotonic &= s.car_velocity >= 0.0 && s.car_velocity < before;
        ticks += 1;
    }
    results.push(TestResult {
        name: "physics_friction_monotonic".into(),
        passed: monotonic && s.car_velocity == 0.0,
        detail: format!("max speed to rest in {} ticks", ticks),
    });
}

// ── 3. Station placement ────────────────────────────────────────────────

fn validate_station_placement(config: &LineConfig) -> Vec<TestResult> {
    println!("--- Station Placement ---");
    let mut results = Vec::new();
    let Ok(base) = LineState::new(config) else {
        return results;
    };

    let sweeps = 200u64;
    let mut overlaps = 0;
    let mut duplicates = 0;
    let mut no_room = 0;
    let mut placed = 0;
    for seed in 0..sweeps {
        let mut s = base.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for &color in &config.rider_pool {
            match create_station(&mut s, color, None, &mut rng) {
                Placement::Placed(_) => placed += 1,
                Placement::NoRoom => no_room += 1,
            }
        }
        if stations_overlap(&s.stations, s.station_length) {
            overlaps += 1;
        }
        let mut colors: Vec<RiderColor> = s.stations.iter().map(|st| st.dropoff).collect();
        colors.sort();
        colors.dedup();
        if colors.len() != s.stations.len() {
            duplicates += 1;
        }
    }

    results.push(TestResult {
        name: "stations_never_overlap".into(),
        passed: overlaps == 0,
        detail: format!("{} sweeps, {} with overlap", sweeps, overlaps),
    });
    results.push(TestResult {
        name: "stations_one_per_color".into(),
        passed: duplicates == 0,
        detail: format!("{} sweeps, {} with duplicate colors", sweeps, duplicates),
    });
    results.push(TestResult {
        name: "stations_fallback_rate".into(),
        passed: placed > 0,
        detail: format!("{} placed, {} fell back for lack of room", placed, no_room),
    });

    results
}

// ── 4. Scripted drive ───────────────────────────────────────────────────

struct DriveOutcome {
    state: LineState,
    dropoffs: usize,
    violations: Vec<String>,
    /// Script keys with no binding; pressing them does nothing.
    unbound_keys: Vec<char>,
}

fn drive(
    config: &LineConfig,
    options: &Options,
    print_track: bool,
) -> Result<DriveOutcome, String> {
    let mut engine = LineEngine::new(config.clone()).map_err(|e| e.to_string())?;
    let keys: Vec<char> = options.keys.chars().collect();
    let mut unbound_keys: Vec<char> = keys
        .iter()
        .copied()
        .filter(|&k| k != '.' && engine.bindings().direction_for(&k.to_string()).is_none())
        .collect();
    unbound_keys.sort_unstable();
    unbound_keys.dedup();
    let mut dropoffs = 0;
    let mut violations = Vec::new();
    let mut station_count = engine.state().stations.len();

    for frame in 0..options.frames {
        if frame % options.key_interval == 0 {
            let slot = (frame / options.key_interval) as usize;
            if let Some(&key) = keys.get(slot) {
                if key != '.' {
                    engine.press_key(&key.to_string());
                }
            }
        }

        let report = engine.update(frame as f64 * config.frame_rate);
        dropoffs += report.dropped.len();

        let s = engine.state();
        if s.car_velocity.abs() > config.max_speed {
            violations.push(format!("frame {}: velocity {}", frame, s.car_velocity));
        }
        if s.car_position < 0.0 || s.car_position > s.track_length as f64 {
            violations.push(format!("frame {}: position {}", frame, s.car_position));
        }
        if s.stations.len() < station_count {
            violations.push(format!("frame {}: station removed", frame));
        }
        station_count = s.stations.len();
        if let Some(orphan) = s
            .seats
            .iter()
            .find(|c| c.is_rider() && s.station_for(**c).is_none())
        {
            violations.push(format!("frame {}: {} has no station", frame, orphan.name()));
        }

        if print_track && (frame % 60 == 0 || !report.dropped.is_empty()) {
            println!(
                "  {:>6} {} v={:+.3}",
                frame,
                track_line(&report.colors),
                s.car_velocity
            );
        }
    }

    if stations_overlap(&engine.state().stations, engine.state().station_length) {
        violations.push("stations overlap at end of run".into());
    }
    for v in &violations {
        log::warn!("{}", v);
    }
    if print_track {
        println!("  {:>6} {} (final)", options.frames, track_line(&engine.colors()));
    }

    Ok(DriveOutcome {
        state: engine.state().clone(),
        dropoffs,
        violations,
        unbound_keys,
    })
}

fn validate_drive(
    config: &LineConfig,
    options: &Options,
) -> (Vec<TestResult>, Option<DriveOutcome>) {
    println!("--- Scripted Drive ---");
    let mut results = Vec::new();

    let outcome = match drive(config, options, options.verbose) {
        Ok(o) => o,
        Err(e) => {
            results.push(TestResult {
                name: "drive_start".into(),
                passed: false,
                detail: e,
            });
            return (results, None);
        }
    };

    results.push(TestResult {
        name: "drive_invariants".into(),
        passed: outcome.violations.is_empty(),
        detail: match outcome.violations.first() {
            None => format!("{} frames clean", options.frames),
            Some(v) => format!("{} violations, first: {}", outcome.violations.len(), v),
        },
    });
    results.push(TestResult {
        name: "drive_stations_unique".into(),
        passed: {
            let s = &outcome.state.stations;
            s.iter()
                .enumerate()
                .all(|(i, a)| s[i + 1..].iter().all(|b| b.dropoff != a.dropoff))
        },
        detail: format!("{} stations on the line", outcome.state.stations.len()),
    });
    results.push(TestResult {
        name: "drive_keys_bound".into(),
        passed: outcome.unbound_keys.is_empty(),
        detail: if outcome.unbound_keys.is_empty() {
            format!("{} key slots", options.keys.chars().count())
        } else {
            format!("unbound keys in script: {:?}", outcome.unbound_keys)
        },
    });
    results.push(TestResult {
        name: "drive_dropoffs".into(),
        passed: true,
        detail: format!("{} dropoffs in {} frames", outcome.dropoffs, options.frames),
    });

    (results, Some(outcome))
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(
    config: &LineConfig,
    options: &Options,
    first: &LineState,
) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let replay = drive(config, options, false);
    results.push(TestResult {
        name: "determinism_replay".into(),
        passed: matches!(&replay, Ok(o) if &o.state == first),
        detail: format!("seed {} replayed over {} frames", config.seed, options.frames),
    });

    results
}

//! Pure simulation logic for Subline.
//!
//! A single car with a handful of seats loops around a one-dimensional
//! track, dropping riders off at stations of their color and picking up new
//! ones. This crate holds everything that is independent of windows,
//! keyboards and drawing: functions take plain data and an explicit random
//! generator, so every run can be replayed from its seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`color`] | Rider colors, empty-seat/empty-track sentinels, directions |
//! | [`config`] | Tuning constants and validation |
//! | [`engine`] | Tick orchestration and the frame-by-frame host driver |
//! | [`exchange`] | Station placement, boarding and dropoff |
//! | [`input`] | Key sets mapped to nudge directions |
//! | [`physics`] | Friction, frame-normalized integration, wraparound |
//! | [`projection`] | Car and stations flattened into per-cell colors |
//! | [`rng`] | Seeded ChaCha8 generator |
//! | [`state`] | Track, car, seats and stations |
//!
//! ```
//! use subline_logic::config::LineConfig;
//! use subline_logic::engine::LineEngine;
//!
//! let mut engine = LineEngine::new(LineConfig::default()).unwrap();
//! let report = engine.update(0.0);
//! assert_eq!(report.colors.len(), 150);
//! ```

pub mod color;
pub mod config;
pub mod engine;
pub mod exchange;
pub mod input;
pub mod physics;
pub mod projection;
pub mod rng;
pub mod state;

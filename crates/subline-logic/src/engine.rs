//! Tick orchestration and the host-facing engine.
//!
//! Every tick runs the same four stages in a fixed order: friction,
//! integration, rider exchange, projection. [`tick`] is the pure version
//! that takes the state, elapsed time and generator explicitly.
//! [`LineEngine`] owns all three for hosts that just want to call
//! `update(now)` once per frame and forward key presses.

use rand::Rng;

use crate::color::{Direction, RiderColor};
use crate::config::{check_config, ConfigError, LineConfig};
use crate::exchange::{add_rider, exchange_riders};
use crate::input::KeyBindings;
use crate::physics::{apply_friction, integrate_position, nudge};
use crate::projection::render_colors;
use crate::rng::SimRng;
use crate::state::LineState;

/// What one tick did, plus the colors to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Frames integrated this tick.
    pub frames: i64,
    /// Colors that got off.
    pub dropped: Vec<RiderColor>,
    /// One color per track cell.
    pub colors: Vec<RiderColor>,
}

/// Advance the line by one tick.
///
/// `elapsed` is wall-clock seconds since the previous tick, or `None` for
/// the very first one.
pub fn tick<R: Rng + ?Sized>(
    state: &mut LineState,
    config: &LineConfig,
    elapsed: Option<f64>,
    rng: &mut R,
) -> TickReport {
    apply_friction(state, config.friction);
    let frames = integrate_position(state, elapsed, config.frame_rate);
    let dropped = exchange_riders(state, config.dropoff_max_velocity, rng);
    let colors = render_colors(state);

    TickReport {
        frames,
        dropped,
        colors,
    }
}

/// A line plus everything needed to drive it frame by frame.
pub struct LineEngine {
    config: LineConfig,
    state: LineState,
    rng: SimRng,
    bindings: KeyBindings,
    /// Host timestamp of the previous update, in seconds.
    last_update: Option<f64>,
    frame_count: u64,
}

impl LineEngine {
    /// Validate `config`, build the line and seat the first rider, whose
    /// station goes at `first_station_position`.
    pub fn new(config: LineConfig) -> Result<Self, ConfigError> {
        check_config(&config)?;
        let mut state = LineState::new(&config)?;
        let mut rng = SimRng::from_seed_u64(config.seed);

        add_rider(&mut state, &[], Some(config.first_station_position), &mut rng);
        log::info!(
            "line ready: {} cells, {} seats, seed {}",
            state.track_length,
            state.seats.len(),
            config.seed
        );

        Ok(Self {
            config,
            state,
            rng,
            bindings: KeyBindings::default(),
            last_update: None,
            frame_count: 0,
        })
    }

    /// Replace the default key bindings.
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Tick using a host timestamp in seconds. Elapsed time is measured from
    /// the previous call; the first call counts as one frame.
    pub fn update(&mut self, now_seconds: f64) -> TickReport {
        let elapsed = self.last_update.map(|prev| now_seconds - prev);
        self.last_update = Some(now_seconds);
        self.step(elapsed)
    }

    /// Tick with an explicit elapsed time.
    pub fn step(&mut self, elapsed: Option<f64>) -> TickReport {
        let report = tick(&mut self.state, &self.config, elapsed, &mut self.rng);
        self.frame_count += 1;
        for color in &report.dropped {
            log::info!("frame {}: {} riders dropped off", self.frame_count, color.name());
        }
        report
    }

    pub fn nudge(&mut self, direction: Direction) {
        nudge(
            &mut self.state,
            direction,
            self.config.move_delta,
            self.config.max_speed,
        );
    }

    /// Nudge for a bound key. Returns the direction applied, if any.
    pub fn press_key(&mut self, key: &str) -> Option<Direction> {
        let direction = self.bindings.direction_for(key)?;
        self.nudge(direction);
        Some(direction)
    }

    pub fn state(&self) -> &LineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LineState {
        &mut self.state
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Ticks run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Colors for the current state without ticking.
    pub fn colors(&self) -> Vec<RiderColor> {
        render_colors(&self.state)
    }
}

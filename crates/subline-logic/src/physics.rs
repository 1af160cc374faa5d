//! Car physics — friction, frame-normalized integration, wraparound.
//!
//! Velocity is measured in cells per frame. Elapsed wall-clock time is
//! converted into whole frames before integration, so the car covers the
//! same distance whether the host ticks at the target rate or slower.

use crate::color::Direction;
use crate::state::LineState;

/// Slow the car by `friction`, stopping it outright once it would cross zero.
pub fn apply_friction(state: &mut LineState, friction: f64) {
    let v = state.car_velocity;
    if v.abs() > friction {
        state.car_velocity = v - friction * v.signum();
    } else {
        state.car_velocity = 0.0;
    }
}

/// Whole frames represented by `elapsed` seconds. `None` means there is no
/// previous tick, which counts as one frame.
pub fn frames_elapsed(elapsed: Option<f64>, frame_rate: f64) -> i64 {
    match elapsed {
        None => 1,
        Some(dt) => ((dt / frame_rate).round_ties_even() as i64).max(0),
    }
}

/// Advance the car and wrap it back onto the track. Returns the number of
/// frames integrated.
///
/// Wraparound is asymmetric: below zero lands on `track_length - 1`, above
/// `track_length` lands on `0`, and exactly `track_length` is left alone.
pub fn integrate_position(state: &mut LineState, elapsed: Option<f64>, frame_rate: f64) -> i64 {
    let frames = frames_elapsed(elapsed, frame_rate);
    state.car_position += state.car_velocity * frames as f64;
    wrap_position(state);
    frames
}

fn wrap_position(state: &mut LineState) {
    let track_length = state.track_length as f64;
    if state.car_position < 0.0 {
        state.car_position = track_length - 1.0;
    } else if state.car_position > track_length {
        state.car_position = 0.0;
    }
}

/// Add `delta` to the velocity, bounded to `[-max_speed, max_speed]`.
pub fn apply_velocity_delta(state: &mut LineState, delta: f64, max_speed: f64) {
    state.car_velocity = (state.car_velocity + delta).clamp(-max_speed, max_speed);
}

/// One key press worth of acceleration in `direction`.
pub fn nudge(state: &mut LineState, direction: Direction, move_delta: f64, max_speed: f64) {
    apply_velocity_delta(state, direction.sign() * move_delta, max_speed);
}

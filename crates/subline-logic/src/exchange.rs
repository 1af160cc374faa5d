//! Station placement, boarding and dropoff.
//!
//! Every rider kind on board has exactly one station. New
//! stations are placed at random among positions that keep a buffer of
//! `max(station_length, car_length)` cells from every existing station.
//! When the car sits still with any part of it over a station whose color
//! is on board, those riders get off and one to four new riders board.
//!
//! All random choices draw from the generator passed in.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::RiderColor;
use crate::projection::{car_occupied_cells, station_occupied_cells};
use crate::state::{LineState, Station};

/// Outcome of a station placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A station was appended at this west position.
    Placed(i64),
    /// No legal position was left; the color's seats were reassigned instead.
    NoRoom,
}

/// West positions where a new station keeps its buffer from every existing
/// station, ascending.
pub fn valid_station_west_positions(state: &LineState) -> Vec<i64> {
    let buffer = state.station_buffer() as i64;
    let track_length = state.track_length as i64;

    (buffer..track_length - buffer)
        .filter(|pos| {
            state.stations.iter().all(|s| {
                let excluded = s.west_position - 2 * buffer + 1..=s.west_position + buffer;
                !excluded.contains(pos)
            })
        })
        .collect()
}

/// Add a station for `color`, at `override_position` if given, otherwise at
/// a random valid position.
///
/// When no valid position is left, every seat holding `color` is emptied
/// and one replacement rider boards, drawn only from colors that already
/// have a station. No station is added in that case, and the replacement
/// never needs one, so the fallback does not recurse.
pub fn create_station<R: Rng + ?Sized>(
    state: &mut LineState,
    color: RiderColor,
    override_position: Option<i64>,
    rng: &mut R,
) -> Placement {
    let position = match override_position {
        Some(pos) => pos,
        None => match valid_station_west_positions(state).choose(rng) {
            Some(&pos) => pos,
            None => {
                log::warn!(
                    "no room for a {} station; reassigning {} seat(s)",
                    color.name(),
                    state.seats.iter().filter(|&&s| s == color).count()
                );
                // A stationless color would land right back here.
                let excluded: Vec<RiderColor> = state
                    .rider_pool
                    .iter()
                    .copied()
                    .filter(|&c| c == color || state.station_for(c).is_none())
                    .collect();
                state.clear_seats(color);
                add_rider(state, &excluded, None, rng);
                return Placement::NoRoom;
            }
        },
    };

    log::debug!("{} station placed at {}", color.name(), position);
    state.stations.push(Station::new(position, color));
    Placement::Placed(position)
}

/// Board one random rider into the lowest empty seat.
///
/// The rider is drawn uniformly from the pool minus `excluded`. If its color
/// has no station yet, one is created (at `override_position` if given).
/// Returns the color that boarded, or `None` when every seat is taken.
///
/// `excluded` must leave at least one pool color; if it does not, nothing
/// boards.
pub fn add_rider<R: Rng + ?Sized>(
    state: &mut LineState,
    excluded: &[RiderColor],
    override_position: Option<i64>,
    rng: &mut R,
) -> Option<RiderColor> {
    let seat = state.first_empty_seat()?;

    let eligible: Vec<RiderColor> = state
        .rider_pool
        .iter()
        .copied()
        .filter(|c| !excluded.contains(c))
        .collect();
    let Some(&rider) = eligible.choose(rng) else {
        log::warn!("every pool color excluded; seat {seat} stays empty");
        return None;
    };

    state.seats[seat] = rider;
    log::trace!("{} rider boarded seat {}", rider.name(), seat);

    if state.station_for(rider).is_none() {
        create_station(state, rider, override_position, rng);
    }
    Some(rider)
}

/// Seated colors whose station has at least one cell under the car. Any
/// car cell counts, whatever seat covers it, empty ones included.
pub fn aligned_dropoff_colors(state: &LineState) -> BTreeSet<RiderColor> {
    let car = car_occupied_cells(state);
    station_occupied_cells(state)
        .into_iter()
        .filter(|&(cell, _)| cell >= 0 && car.contains_key(&(cell as usize)))
        .map(|(_, color)| color)
        .filter(|&color| state.is_seated(color))
        .collect()
}

/// Number of replacement riders after a dropoff: 1–4, weighted toward 1.
pub fn roll_replacements<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    (rng.gen_range(1..=7i32) - 3).max(1) as u32
}

/// Drop off riders at aligned stations and board replacements, if the car
/// is slower than `dropoff_max_velocity`. Returns the colors dropped off.
///
/// Replacements for one color never include that color, but may include a
/// color dropped off earlier in the same call.
pub fn exchange_riders<R: Rng + ?Sized>(
    state: &mut LineState,
    dropoff_max_velocity: f64,
    rng: &mut R,
) -> Vec<RiderColor> {
    if state.car_velocity.abs() >= dropoff_max_velocity {
        return Vec::new();
    }

    let dropped: Vec<RiderColor> = aligned_dropoff_colors(state).into_iter().collect();
    for &color in &dropped {
        let cleared = state.clear_seats(color);
        let replacements = roll_replacements(rng);
        log::debug!(
            "{} {} rider(s) off, {} boarding",
            cleared,
            color.name(),
            replacements
        );
        for _ in 0..replacements {
            add_rider(state, &[color], None, rng);
        }
    }
    dropped
}

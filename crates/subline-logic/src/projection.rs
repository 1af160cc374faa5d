//! Projection of the line onto a flat row of track cells.
//!
//! The car is laid out seat by seat, westmost seat first, each seat a block
//! of `seat_width` cells ending at its anchor. Stations cover
//! `station_length` cells ending at their west position. The renderer gets
//! one color per track cell, car over station over bare track.

use std::collections::BTreeMap;

use crate::color::RiderColor;
use crate::state::LineState;

/// Track cell the car's west edge rounds to. Half-way positions round to
/// even.
pub fn car_anchor(state: &LineState) -> i64 {
    state.car_position.round_ties_even() as i64
}

/// Bring a cell index back onto the loop. Car cells are never more than one
/// track length out of range.
fn wrap_cell(cell: i64, track_length: i64) -> usize {
    if cell >= track_length {
        (cell - track_length) as usize
    } else if cell < 0 {
        (cell + track_length) as usize
    } else {
        cell as usize
    }
}

/// Cells covered by the car, keyed by wrapped cell index.
pub fn car_occupied_cells(state: &LineState) -> BTreeMap<usize, RiderColor> {
    let track_length = state.track_length as i64;
    let width = state.seat_width as i64;
    let west = car_anchor(state);

    let mut cells = BTreeMap::new();
    for (n, &rider) in state.seats.iter().enumerate() {
        let anchor = west - n as i64 * width;
        for cell in anchor - width + 1..=anchor {
            cells.insert(wrap_cell(cell, track_length), rider);
        }
    }
    cells
}

/// Cells covered by stations, keyed by unwrapped cell index. Later stations
/// overwrite earlier ones.
pub fn station_occupied_cells(state: &LineState) -> BTreeMap<i64, RiderColor> {
    let mut cells = BTreeMap::new();
    for station in &state.stations {
        for cell in station.cells(state.station_length) {
            cells.insert(cell, station.dropoff);
        }
    }
    cells
}

/// One color per track cell.
pub fn render_colors(state: &LineState) -> Vec<RiderColor> {
    let car = car_occupied_cells(state);
    let stations = station_occupied_cells(state);

    (0..state.track_length)
        .map(|n| {
            car.get(&n)
                .or_else(|| stations.get(&(n as i64)))
                .copied()
                .unwrap_or(RiderColor::EmptyTrack)
        })
        .collect()
}

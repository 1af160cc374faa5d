//! Line state: the single mutable aggregate for one track and its car.
//!
//! A `LineState` is threaded through one tick at a time. The physics step
//! and exchange engine mutate it; projection only reads it.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::color::{Direction, RiderColor};
use crate::config::{check_config, ConfigError, LineConfig};

/// A fixed block of track where riders of one color get off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Westmost cell; the station extends east from here.
    pub west_position: i64,
    pub dropoff: RiderColor,
}

impl Station {
    pub fn new(west_position: i64, dropoff: RiderColor) -> Self {
        Self {
            west_position,
            dropoff,
        }
    }

    /// Cells covered by a station of the given width. Not wrapped.
    pub fn cells(&self, station_length: usize) -> RangeInclusive<i64> {
        self.west_position - station_length as i64 + 1..=self.west_position
    }
}

/// Track, car and stations for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineState {
    pub track_length: usize,
    /// West edge of the car, continuous.
    pub car_position: f64,
    /// Cells per frame; positive is west.
    pub car_velocity: f64,
    pub car_length: usize,
    /// Seat order decides which cell block each seat occupies.
    pub seats: Vec<RiderColor>,
    pub seat_width: usize,
    pub station_length: usize,
    pub rider_pool: Vec<RiderColor>,
    pub stations: Vec<Station>,
}

impl LineState {
    /// Build a line with every seat empty, the car at cell 0 and the
    /// configured starting velocity.
    pub fn new(config: &LineConfig) -> Result<Self, ConfigError> {
        Self::with_seats(config, vec![RiderColor::EmptySeat; config.seat_count])
    }

    /// Build a line with the given seat occupants. The seat count is taken
    /// from `seats` rather than the config.
    pub fn with_seats(config: &LineConfig, seats: Vec<RiderColor>) -> Result<Self, ConfigError> {
        let config = LineConfig {
            seat_count: seats.len(),
            ..config.clone()
        };
        check_config(&config)?;
        if let Some(&bad) = seats.iter().find(|&&s| s == RiderColor::EmptyTrack) {
            return Err(ConfigError::InvalidSeat(bad));
        }

        Ok(Self {
            track_length: config.track_length,
            car_position: 0.0,
            car_velocity: config.starting_velocity,
            car_length: config.car_length,
            seat_width: config.car_length / seats.len(),
            seats,
            station_length: config.station_length,
            rider_pool: config.rider_pool,
            stations: Vec::new(),
        })
    }

    /// Exclusion distance used when placing stations.
    pub fn station_buffer(&self) -> usize {
        self.station_length.max(self.car_length)
    }

    /// Index of the lowest empty seat.
    pub fn first_empty_seat(&self) -> Option<usize> {
        self.seats.iter().position(|&s| s == RiderColor::EmptySeat)
    }

    pub fn is_seated(&self, color: RiderColor) -> bool {
        self.seats.contains(&color)
    }

    pub fn station_for(&self, color: RiderColor) -> Option<&Station> {
        self.stations.iter().find(|s| s.dropoff == color)
    }

    /// Empty every seat holding `color`. Returns how many were cleared.
    pub fn clear_seats(&mut self, color: RiderColor) -> usize {
        let mut cleared = 0;
        for seat in self.seats.iter_mut().filter(|s| **s == color) {
            *seat = RiderColor::EmptySeat;
            cleared += 1;
        }
        cleared
    }

    /// Number of seats holding a rider.
    pub fn occupied_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.is_rider()).count()
    }

    pub fn direction(&self) -> Option<Direction> {
        Direction::of_velocity(self.car_velocity)
    }
}

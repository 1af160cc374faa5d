//! Line configuration and validation.
//!
//! Every tuning constant of the simulation lives in [`LineConfig`]. Hosts
//! either take the defaults or load a config from JSON, then validate it
//! before building a line. Validation reports every problem at once, so a
//! config screen or harness can show all of them together.
//!
//! ```
//! use subline_logic::config::{validate_config, LineConfig};
//!
//! let config = LineConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{Direction, RiderColor};
use crate::rng::DEFAULT_SEED;

/// Tuning constants for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Number of discrete cells on the closed loop.
    pub track_length: usize,
    /// Cell width of the car.
    pub car_length: usize,
    /// Number of seats in the car.
    pub seat_count: usize,
    /// Cell width of every station.
    pub station_length: usize,
    /// Rider kinds that may board.
    pub rider_pool: Vec<RiderColor>,
    /// Signed car velocity at startup, in cells per frame.
    pub starting_velocity: f64,
    /// Velocity change for one key press.
    pub move_delta: f64,
    /// Velocity magnitude bound.
    pub max_speed: f64,
    /// Velocity lost per tick.
    pub friction: f64,
    /// Riders only exchange when the car is slower than this.
    pub dropoff_max_velocity: f64,
    /// Target seconds per frame; elapsed time is measured in these units.
    pub frame_rate: f64,
    /// West position of the station seeded at startup.
    pub first_station_position: i64,
    /// Seed for the simulation RNG.
    pub seed: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            track_length: 150,
            car_length: 12,
            seat_count: 4,
            station_length: 14,
            rider_pool: RiderColor::RIDERS.to_vec(),
            starting_velocity: Direction::East.sign() * 0.6,
            move_delta: 0.4,
            max_speed: 2.0,
            friction: 0.005,
            dropoff_max_velocity: 0.02,
            frame_rate: 1.0 / 60.0,
            first_station_position: 35,
            seed: DEFAULT_SEED,
        }
    }
}

impl LineConfig {
    /// Exclusion distance used when placing stations.
    pub fn station_buffer(&self) -> usize {
        self.station_length.max(self.car_length)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Track too short to hold a single station candidate (length, minimum).
    TrackTooShort(usize, usize),
    /// The car needs at least one seat.
    NoSeats,
    /// Car narrower than its seat count (car length, seats).
    CarTooShortForSeats(usize, usize),
    /// A seat holding the empty-track sentinel.
    InvalidSeat(RiderColor),
    /// Station width of zero.
    ZeroStationLength,
    /// No rider kinds to board.
    EmptyRiderPool,
    /// A sentinel color in the rider pool.
    NonRiderInPool(RiderColor),
    /// Same rider kind listed twice.
    DuplicateRider(RiderColor),
    /// Frame rate must be positive.
    NonPositiveFrameRate(f64),
    /// Friction must not be negative.
    NegativeFriction(f64),
    /// Max speed must be positive.
    NonPositiveMaxSpeed(f64),
    /// Starting velocity beyond max speed.
    StartingVelocityOutOfRange(f64),
    /// Seeded station does not fit on the track.
    FirstStationOutOfRange(i64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TrackTooShort(len, min) => {
                write!(f, "track length {len} is too short, need more than {min}")
            }
            ConfigError::NoSeats => write!(f, "car must have at least one seat"),
            ConfigError::CarTooShortForSeats(len, seats) => {
                write!(f, "car length {len} cannot hold {seats} seats")
            }
            ConfigError::InvalidSeat(c) => write!(f, "seat cannot hold '{}'", c.name()),
            ConfigError::ZeroStationLength => write!(f, "station length must be positive"),
            ConfigError::EmptyRiderPool => write!(f, "rider pool is empty"),
            ConfigError::NonRiderInPool(c) => {
                write!(f, "rider pool contains non-rider color '{}'", c.name())
            }
            ConfigError::DuplicateRider(c) => {
                write!(f, "rider pool lists '{}' more than once", c.name())
            }
            ConfigError::NonPositiveFrameRate(r) => write!(f, "frame rate {r} must be positive"),
            ConfigError::NegativeFriction(v) => write!(f, "friction {v} must not be negative"),
            ConfigError::NonPositiveMaxSpeed(v) => write!(f, "max speed {v} must be positive"),
            ConfigError::StartingVelocityOutOfRange(v) => {
                write!(f, "starting velocity {v} exceeds max speed")
            }
            ConfigError::FirstStationOutOfRange(p) => {
                write!(f, "first station position {p} does not fit on the track")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a line configuration, returning all errors found.
pub fn validate_config(config: &LineConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    // At least one candidate in [buffer, track_length - buffer).
    let min_track = 2 * config.station_buffer();
    if config.track_length <= min_track {
        errors.push(ConfigError::TrackTooShort(config.track_length, min_track));
    }
    if config.seat_count == 0 {
        errors.push(ConfigError::NoSeats);
    } else if config.car_length < config.seat_count {
        errors.push(ConfigError::CarTooShortForSeats(
            config.car_length,
            config.seat_count,
        ));
    }
    if config.station_length == 0 {
        errors.push(ConfigError::ZeroStationLength);
    }

    if config.rider_pool.is_empty() {
        errors.push(ConfigError::EmptyRiderPool);
    }
    for (i, &color) in config.rider_pool.iter().enumerate() {
        if !color.is_rider() {
            errors.push(ConfigError::NonRiderInPool(color));
        } else if config.rider_pool[..i].contains(&color) {
            errors.push(ConfigError::DuplicateRider(color));
        }
    }

    if config.frame_rate.is_nan() || config.frame_rate <= 0.0 {
        errors.push(ConfigError::NonPositiveFrameRate(config.frame_rate));
    }
    if config.friction.is_nan() || config.friction < 0.0 {
        errors.push(ConfigError::NegativeFriction(config.friction));
    }
    if config.max_speed.is_nan() || config.max_speed <= 0.0 {
        errors.push(ConfigError::NonPositiveMaxSpeed(config.max_speed));
    } else if config.starting_velocity.abs() > config.max_speed {
        errors.push(ConfigError::StartingVelocityOutOfRange(
            config.starting_velocity,
        ));
    }

    let station_west = config.first_station_position;
    if station_west < config.station_length as i64 - 1 || station_west >= config.track_length as i64
    {
        errors.push(ConfigError::FirstStationOutOfRange(station_west));
    }

    errors
}

/// Validate and return the first error, for constructors that fail fast.
pub fn check_config(config: &LineConfig) -> Result<(), ConfigError> {
    match validate_config(config).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let errors = validate_config(&LineConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(check_config(&LineConfig::default()).is_ok());
    }

    #[test]
    fn default_matches_reference_line() {
        let c = LineConfig::default();
        assert_eq!(c.track_length, 150);
        assert_eq!(c.car_length, 12);
        assert_eq!(c.seat_count, 4);
        assert_eq!(c.station_length, 14);
        assert_eq!(c.station_buffer(), 14);
        assert!(c.starting_velocity < 0.0, "starts heading east");
    }

    #[test]
    fn short_track_rejected() {
        let c = LineConfig {
            track_length: 28,
            ..Default::default()
        };
        assert_eq!(
            check_config(&c),
            Err(ConfigError::TrackTooShort(28, 28))
        );
        let c = LineConfig {
            track_length: 29,
            first_station_position: 20,
            ..Default::default()
        };
        assert!(validate_config(&c).is_empty());
    }

    #[test]
    fn bad_pool_rejected() {
        let c = LineConfig {
            rider_pool: vec![],
            ..Default::default()
        };
        assert!(validate_config(&c).contains(&ConfigError::EmptyRiderPool));

        let c = LineConfig {
            rider_pool: vec![RiderColor::Gold, RiderColor::EmptySeat, RiderColor::Gold],
            ..Default::default()
        };
        let errors = validate_config(&c);
        assert!(errors.contains(&ConfigError::NonRiderInPool(RiderColor::EmptySeat)));
        assert!(errors.contains(&ConfigError::DuplicateRider(RiderColor::Gold)));
    }

    #[test]
    fn collects_multiple_errors() {
        let c = LineConfig {
            seat_count: 0,
            frame_rate: 0.0,
            friction: -1.0,
            max_speed: 0.0,
            ..Default::default()
        };
        let errors = validate_config(&c);
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.contains(&ConfigError::NoSeats));
        assert!(errors.contains(&ConfigError::NonPositiveFrameRate(0.0)));
        assert!(errors.contains(&ConfigError::NegativeFriction(-1.0)));
        assert!(errors.contains(&ConfigError::NonPositiveMaxSpeed(0.0)));
    }

    #[test]
    fn car_needs_room_for_seats() {
        let c = LineConfig {
            car_length: 3,
            ..Default::default()
        };
        assert!(validate_config(&c).contains(&ConfigError::CarTooShortForSeats(3, 4)));
    }

    #[test]
    fn starting_velocity_bounded() {
        let c = LineConfig {
            starting_velocity: 2.5,
            ..Default::default()
        };
        assert_eq!(
            check_config(&c),
            Err(ConfigError::StartingVelocityOutOfRange(2.5))
        );
    }

    #[test]
    fn first_station_must_fit() {
        for pos in [-1, 12, 150] {
            let c = LineConfig {
                first_station_position: pos,
                ..Default::default()
            };
            assert_eq!(
                check_config(&c),
                Err(ConfigError::FirstStationOutOfRange(pos)),
                "pos={pos}"
            );
        }
    }

    #[test]
    fn error_messages_are_readable() {
        let msg = ConfigError::TrackTooShort(20, 28).to_string();
        assert!(msg.contains("20") && msg.contains("28"), "{msg}");
        let msg = ConfigError::NonRiderInPool(RiderColor::EmptyTrack).to_string();
        assert!(msg.contains("empty track"), "{msg}");
    }

    #[test]
    fn json_round_trip_and_partial_fill() {
        let c = LineConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: LineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let partial: LineConfig = serde_json::from_str(r#"{"track_length": 200, "seed": 7}"#).unwrap();
        assert_eq!(partial.track_length, 200);
        assert_eq!(partial.seed, 7);
        assert_eq!(partial.car_length, 12);
    }
}

//! Rider colors and travel directions.
//!
//! The track is drawn as a flat row of cells, each holding one `RiderColor`.
//! Two sentinels mark an empty seat inside the car and bare track outside it;
//! the remaining variants are rider kinds that can board and disembark.

use serde::{Deserialize, Serialize};

/// Symbolic color of a single track cell or seat.
///
/// Ordering follows declaration order so that sets of colors iterate
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiderColor {
    /// A seat in the car with nobody in it.
    EmptySeat,
    /// A track cell covered by neither the car nor a station.
    EmptyTrack,
    Purple,
    Green,
    Gold,
    Blue,
}

impl RiderColor {
    /// Every rider kind, in the default pool order.
    pub const RIDERS: [RiderColor; 4] = [
        RiderColor::Green,
        RiderColor::Purple,
        RiderColor::Gold,
        RiderColor::Blue,
    ];

    /// True for rider kinds, false for the two sentinels.
    pub fn is_rider(self) -> bool {
        !matches!(self, RiderColor::EmptySeat | RiderColor::EmptyTrack)
    }

    /// Human-readable name, used in logs and harness output.
    pub fn name(self) -> &'static str {
        match self {
            RiderColor::EmptySeat => "empty seat",
            RiderColor::EmptyTrack => "empty track",
            RiderColor::Purple => "purple",
            RiderColor::Green => "green",
            RiderColor::Gold => "gold",
            RiderColor::Blue => "blue",
        }
    }
}

/// Travel direction along the loop. The discriminant is the velocity sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    West = 1,
    East = -1,
}

impl Direction {
    /// Velocity sign for this direction (+1.0 or -1.0).
    pub fn sign(self) -> f64 {
        self as i8 as f64
    }

    /// Direction a car with this velocity is travelling in, `None` at rest.
    pub fn of_velocity(velocity: f64) -> Option<Direction> {
        if velocity > 0.0 {
            Some(Direction::West)
        } else if velocity < 0.0 {
            Some(Direction::East)
        } else {
            None
        }
    }
}

//! Map coordinates and compass directions.
//!
//! Coordinates follow the usual roguelike convention: `x` grows east, `y`
//! grows south and `z` is the map level (negative values are underground).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A 3D integer tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Tripoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tripoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The same point with a different z-level.
    pub fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }

    /// Chebyshev distance including the vertical axis.
    pub fn square_dist(self, other: Tripoint) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Chebyshev distance ignoring the vertical axis.
    pub fn square_dist_2d(self, other: Tripoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// All points in the square of `radius` around this one, on the same level.
    pub fn points_in_radius(self, radius: i32) -> impl Iterator<Item = Tripoint> {
        let center = self;
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius).map(move |dx| Tripoint::new(center.x + dx, center.y + dy, center.z))
        })
    }

    /// Bearing from `self` to `target` in degrees, clockwise from north.
    pub fn bearing_to(self, target: Tripoint) -> f32 {
        let dx = (target.x - self.x) as f32;
        let dy = (target.y - self.y) as f32;
        let degrees = dy.atan2(dx).to_degrees() + 90.0;
        degrees.rem_euclid(360.0)
    }
}

impl Add for Tripoint {
    type Output = Tripoint;

    fn add(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Tripoint {
    type Output = Tripoint;

    fn sub(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Tripoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Direction of one point as seen from another, used in player messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Above,
    Below,
    Here,
}

impl Compass {
    /// Direction from `from` towards `to`.
    ///
    /// Horizontal offsets win over vertical ones; a purely vertical offset
    /// reads as above/below.
    pub fn between(from: Tripoint, to: Tripoint) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return match (to.z - from.z).signum() {
                1 => Compass::Above,
                -1 => Compass::Below,
                _ => Compass::Here,
            };
        }
        let sector = ((from.bearing_to(to) + 22.5) / 45.0).floor() as i32;
        match sector.rem_euclid(8) {
            0 => Compass::North,
            1 => Compass::NorthEast,
            2 => Compass::East,
            3 => Compass::SouthEast,
            4 => Compass::South,
            5 => Compass::SouthWest,
            6 => Compass::West,
            _ => Compass::NorthWest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Compass::North => "north",
            Compass::NorthEast => "northeast",
            Compass::East => "east",
            Compass::SouthEast => "southeast",
            Compass::South => "south",
            Compass::SouthWest => "southwest",
            Compass::West => "west",
            Compass::NorthWest => "northwest",
            Compass::Above => "above",
            Compass::Below => "below",
            Compass::Here => "center",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

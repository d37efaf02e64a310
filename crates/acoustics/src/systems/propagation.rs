//! Sound Propagation
//!
//! Wavefront flood fill turning one [`SoundEvent`] into a [`SoundField`].
//! Each tile remembers how far the wavefront travelled to reach it and from
//! which octant it arrived; sound may only continue forwards, cannot wrap
//! around wall corners, and loses volume per step according to a
//! logarithmic distance table plus the absorption of the tile it enters.

use std::collections::VecDeque;

use sound_events::{SoundEvent, MAXIMUM_VOLUME_ATMOSPHERE, MINIMUM_INTEREST};

use crate::components::field::SoundField;
use crate::components::grid::Grid;
use crate::systems::absorption::{absorption_constants::WALL, AbsorptionCache};

/// Constants for the flood fill
pub mod propagation_constants {
    /// Loss in hundredths of a dB for stepping from distance `n - 1` to `n`.
    ///
    /// Roughly `2000 * log10(n / (n - 1))`; distance 1 is the source itself.
    pub const DISTANCE_LOSS: [i32; 121] = [
        0, 1500, 602, 352, 250, 194, 158, 134, 116, 102, 92, 83, 76, 70, 64, 60, 56, 53, 50, 47, 45,
        42, 40, 39, 37, 35, 34, 33, 32, 30, 29, 28, 28, 27, 26, 25, 24, 24, 23, 23, 22, 21, 21, 20,
        20, 20, 19, 19, 18, 18, 18, 17, 17, 17, 16, 16, 16, 15, 15, 15, 15, 14, 14, 14, 14, 13, 13,
        13, 13, 13, 12, 12, 12, 12, 12, 12, 12, 11, 11, 11, 11, 11, 11, 11, 10, 10, 10, 10, 10, 10,
        10, 10, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 7, 7, 7,
        7,
    ];

    /// Direction marker of the source tile
    pub const CENTER: u8 = 8;
}

use propagation_constants::*;

/// Neighbour offsets, clockwise from north-west. Odd octants are cardinal.
pub const OCTANTS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Steps between two octants going the short way round.
pub fn octant_distance(a: u8, b: u8) -> u8 {
    if a >= CENTER || b >= CENTER {
        return 4;
    }
    let d = (i16::from(a) - i16::from(b)).rem_euclid(8) as u8;
    d.min(8 - d)
}

/// Loss lookup for stepping into distance `step`.
pub fn distance_loss(step: i32) -> i32 {
    let index = step.clamp(0, DISTANCE_LOSS.len() as i32 - 1);
    DISTANCE_LOSS[index as usize]
}

/// Extra distance charged for turning away from the incoming direction.
fn turn_penalty(incoming: u8, outgoing: u8) -> i32 {
    match octant_distance(incoming, outgoing) {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    }
}

/// Scratch state of one flood fill
struct Wavefront<'a> {
    absorption: &'a AbsorptionCache,
    volume: Grid<i16>,
    distance: Grid<u16>,
    direction: Grid<u8>,
    queue: VecDeque<(i32, i32)>,
}

impl<'a> Wavefront<'a> {
    fn new(absorption: &'a AbsorptionCache) -> Self {
        let grid = absorption.values();
        let (width, height) = (grid.width(), grid.height());
        Self {
            absorption,
            volume: Grid::new(width, height, 0),
            distance: Grid::new(width, height, 0),
            direction: Grid::new(width, height, CENTER),
            queue: VecDeque::new(),
        }
    }

    fn seed(&mut self, x: i32, y: i32, source: i32) {
        self.volume.set(x, y, source as i16);
        self.distance.set(x, y, 1);
        self.direction.set(x, y, CENTER);

        for (octant, (dx, dy)) in OCTANTS.iter().enumerate() {
            let (nx, ny) = (x + dx, y + dy);
            let Some(absorb) = self.absorption.at(nx, ny) else {
                continue;
            };
            let volume = (source - distance_loss(2) - absorb).max(0);
            self.volume.set(nx, ny, volume as i16);
            self.distance.set(nx, ny, 2);
            self.direction.set(nx, ny, octant as u8);
            if volume > 0 {
                self.queue.push_back((nx, ny));
            }
        }
    }

    /// Octants the wavefront may continue into from `(x, y)`.
    fn open_octants(&self, x: i32, y: i32, incoming: u8) -> [bool; 8] {
        let mut open = [true; 8];
        if incoming < CENTER {
            for back in 3..=5 {
                open[usize::from((incoming + back) % 8)] = false;
            }
        }
        // Sound cannot slip diagonally past the corner of a wall
        if self.absorption.at(x, y).unwrap_or(0) < i32::from(WALL) {
            for cardinal in [1usize, 3, 5, 7] {
                let (dx, dy) = OCTANTS[cardinal];
                if self.absorption.at(x + dx, y + dy).unwrap_or(0) >= i32::from(WALL) {
                    open[(cardinal + 7) % 8] = false;
                    open[(cardinal + 1) % 8] = false;
                }
            }
        }
        open
    }

    fn spread_from(&mut self, x: i32, y: i32) {
        let current = i32::from(self.volume.value_or_default(x, y));
        let dist = i32::from(self.distance.value_or_default(x, y));
        let incoming = self.direction.get(x, y).copied().unwrap_or(CENTER);
        let open = self.open_octants(x, y, incoming);

        for (octant, (dx, dy)) in OCTANTS.iter().enumerate() {
            if !open[octant] {
                continue;
            }
            let (nx, ny) = (x + dx, y + dy);
            let Some(absorb) = self.absorption.at(nx, ny) else {
                continue;
            };
            let octant = octant as u8;
            let loss = absorb + distance_loss(dist + 1 - turn_penalty(incoming, octant));
            let candidate = current - loss;
            let existing = i32::from(self.volume.value_or_default(nx, ny));

            if candidate > existing {
                self.volume.set(nx, ny, candidate as i16);
                self.distance.set(nx, ny, (dist + 1) as u16);
                self.direction.set(nx, ny, octant);
                if candidate > MINIMUM_INTEREST {
                    self.queue.push_back((nx, ny));
                }
            } else if candidate == existing && candidate > 0 && octant % 2 == 1 {
                // Equal volumes one octant apart: the cardinal direction wins
                let previous = self.direction.get(nx, ny).copied().unwrap_or(CENTER);
                if octant_distance(previous, octant) == 1 {
                    self.direction.set(nx, ny, octant);
                }
            }
        }
    }
}

/// Flood fill `event` over the level described by `absorption`.
///
/// Returns `None` when the origin is off the level. The result depends only
/// on the event and the absorption values.
pub fn propagate(event: &SoundEvent, absorption: &AbsorptionCache) -> Option<SoundField> {
    let (ox, oy) = (event.origin.x, event.origin.y);
    if !absorption.values().in_bounds(ox, oy) {
        return None;
    }
    let source = event.volume.clamp(0, MAXIMUM_VOLUME_ATMOSPHERE);

    let mut wave = Wavefront::new(absorption);
    wave.seed(ox, oy, source);
    while let Some((x, y)) = wave.queue.pop_front() {
        wave.spread_from(x, y);
    }

    Some(SoundField::new(event.clone(), wave.volume))
}

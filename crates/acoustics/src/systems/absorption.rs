//! Absorption Cache
//!
//! Per-level grid of how much sound each tile soaks up, in hundredths of a dB.
//! Rebuilt incrementally: only submaps marked dirty since the last build are
//! recomputed, and a season change invalidates everything.

use bevy_ecs::prelude::*;
use tracing::debug;

use sound_events::Season;

use crate::components::grid::Grid;
use crate::components::map::{LandUse, LocalMap, Tile, SUBMAP_SIZE};
use crate::systems::ambient::Weather;

/// Absorption tiers
pub mod absorption_constants {
    /// Hard ground, asphalt, concrete
    pub const OPEN_FIELD: i16 = 0;
    /// Tent walls, sandbags, vehicle boards, partial walls
    pub const BARRIER: i16 = 500;
    pub const THICK_BARRIER: i16 = 2000;
    /// A roofed, properly joined wall
    pub const WALL: i16 = 4000;

    /// Snow cover in winter, applied everywhere
    pub const SNOW_BONUS: i16 = 128;
    pub const SNOW_BONUS_HORDE: i16 = 42;
}

use absorption_constants::*;

/// Attenuation of the bare terrain, before any structures are considered.
///
/// `horde_signal` selects the coarser values used for long-range horde
/// signalling, which averages over much larger areas.
pub fn terrain_sound_attenuation(land_use: LandUse, season: Season, horde_signal: bool) -> i16 {
    let snow = match (season.has_snow_cover(), horde_signal) {
        (false, _) => 0,
        (true, true) => SNOW_BONUS_HORDE,
        (true, false) => SNOW_BONUS,
    };
    let cover = match land_use {
        LandUse::Field => 0,
        // Bare branches in autumn carry sound further
        LandUse::Forest => match (season, horde_signal) {
            (Season::Autumn, true) => 20,
            (Season::Autumn, false) => 9,
            (_, true) => 26,
            (_, false) => 20,
        },
        LandUse::LightVegetation => {
            if horde_signal {
                12
            } else {
                6
            }
        }
        LandUse::Urban => {
            if horde_signal {
                12
            } else {
                0
            }
        }
    };
    snow + cover
}

/// Per-level absorption values plus the per-submap dirty mask.
#[derive(Debug, Clone)]
pub struct AbsorptionCache {
    values: Grid<i16>,
    dirty: Grid<bool>,
    built_for: Option<Season>,
}

impl AbsorptionCache {
    /// An empty cache with every submap dirty.
    pub fn new(submaps: usize) -> Self {
        let size = submaps * SUBMAP_SIZE as usize;
        Self {
            values: Grid::new(size, size, OPEN_FIELD),
            dirty: Grid::new(submaps, submaps, true),
            built_for: None,
        }
    }

    pub fn values(&self) -> &Grid<i16> {
        &self.values
    }

    /// Absorption at `(x, y)`, or `None` off the map.
    pub fn at(&self, x: i32, y: i32) -> Option<i32> {
        self.values.get(x, y).map(|v| i32::from(*v))
    }

    pub fn mark_dirty(&mut self, sx: i32, sy: i32) {
        self.dirty.set(sx, sy, true);
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    pub fn is_dirty(&self, sx: i32, sy: i32) -> bool {
        self.dirty.value_or_default(sx, sy)
    }

    pub fn any_dirty(&self) -> bool {
        self.dirty.iter().any(|(_, _, dirty)| *dirty)
    }

    /// Recompute every dirty submap. Returns how many were rebuilt.
    pub fn rebuild(&mut self, tiles: &Grid<Tile>, land_use: &Grid<LandUse>, season: Season) -> usize {
        if tiles.width() == 0 || tiles.height() == 0 {
            return 0;
        }
        if self.built_for != Some(season) {
            self.mark_all_dirty();
        }

        let mut rebuilt = 0;
        for sy in 0..self.dirty.height() as i32 {
            for sx in 0..self.dirty.width() as i32 {
                if !self.is_dirty(sx, sy) {
                    continue;
                }
                let base = terrain_sound_attenuation(land_use.value_or_default(sx, sy), season, false);
                for ty in 0..SUBMAP_SIZE {
                    for tx in 0..SUBMAP_SIZE {
                        let x = sx * SUBMAP_SIZE + tx;
                        let y = sy * SUBMAP_SIZE + ty;
                        self.values.set(x, y, tile_absorption(tiles, x, y, base));
                    }
                }
                self.dirty.set(sx, sy, false);
                rebuilt += 1;
            }
        }
        self.built_for = Some(season);
        rebuilt
    }
}

/// Absorption of a single tile.
///
/// Roofed wall-like terrain only counts as a full wall when it joins up with
/// roofed neighbours: solid lines and corners absorb, lone pillars do not.
fn tile_absorption(tiles: &Grid<Tile>, x: i32, y: i32, base: i16) -> i16 {
    let Some(tile) = tiles.get(x, y) else {
        return base;
    };
    if tile.furniture.blocks_wind() || tile.vehicle.map_or(false, |part| part.obstructs()) {
        return base.max(BARRIER);
    }
    if !tile.terrain.is_wall_like() || !tile.roofed {
        return base;
    }
    let blocks_wind = tile.terrain.blocks_wind();

    let roof = |dx: i32, dy: i32| tiles.get(x + dx, y + dy).map_or(false, |t| t.roofed);
    let wall = |dx: i32, dy: i32| {
        tiles
            .get(x + dx, y + dy)
            .map_or(false, |t| t.roofed && t.terrain.is_wall_like())
    };

    let north = wall(0, -1) && (roof(-1, -1) || roof(1, -1));
    let south = wall(0, 1) && (roof(-1, 1) || roof(1, 1));
    let west = wall(-1, 0) && (roof(-1, -1) || roof(-1, 1));
    let east = wall(1, 0) && (roof(1, -1) || roof(1, 1));
    let buddies = [north, south, west, east].iter().filter(|b| **b).count();

    let full = if blocks_wind { WALL } else { THICK_BARRIER };
    let reduced = if blocks_wind { THICK_BARRIER } else { BARRIER };

    match buddies {
        0 | 1 => {
            if blocks_wind {
                BARRIER
            } else {
                OPEN_FIELD
            }
        }
        2 => {
            let contiguous = if west && east {
                (roof(-1, -1) && roof(0, -1) && roof(1, -1)) || (roof(-1, 1) && roof(0, 1) && roof(1, 1))
            } else if north && south {
                (roof(-1, -1) && roof(-1, 0) && roof(-1, 1)) || (roof(1, -1) && roof(1, 0) && roof(1, 1))
            } else {
                false
            };
            if contiguous {
                full
            } else {
                reduced
            }
        }
        _ => full,
    }
}

/// System: Rebuild dirty absorption submaps on every loaded level
pub fn refresh_absorption(mut map: ResMut<LocalMap>, weather: Res<Weather>) {
    let rebuilt = map.refresh_absorption(weather.season);
    if rebuilt > 0 {
        debug!(rebuilt, season = %weather.season, "Rebuilt absorption submaps");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::map::{Furniture, LocalMap, Terrain, VehiclePart};
    use sound_events::Tripoint;

    /// Map with a roofed 5x5 room, walls on the rim, centred on (6, 6)
    fn room_map() -> LocalMap {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        for y in 4..=8 {
            for x in 4..=8 {
                let p = Tripoint::new(x, y, 0);
                map.set_roof(p, true);
                let rim = x == 4 || x == 8 || y == 4 || y == 8;
                map.set_terrain(p, if rim { Terrain::Wall } else { Terrain::Floor });
            }
        }
        map
    }

    fn absorption(map: &LocalMap, x: i32, y: i32) -> i32 {
        map.level(0).and_then(|l| l.absorption.at(x, y)).unwrap_or(-1)
    }

    #[test]
    fn test_terrain_attenuation() {
        assert_eq!(terrain_sound_attenuation(LandUse::Field, Season::Summer, false), 0);
        assert_eq!(terrain_sound_attenuation(LandUse::Field, Season::Winter, false), 128);
        assert_eq!(terrain_sound_attenuation(LandUse::Forest, Season::Autumn, false), 9);
        assert_eq!(terrain_sound_attenuation(LandUse::Forest, Season::Spring, true), 26);
        assert_eq!(terrain_sound_attenuation(LandUse::Forest, Season::Winter, false), 148);
        assert_eq!(terrain_sound_attenuation(LandUse::LightVegetation, Season::Summer, true), 12);
        assert_eq!(terrain_sound_attenuation(LandUse::Urban, Season::Winter, true), 54);
    }

    #[test]
    fn test_straight_wall_with_roof_is_full_wall() {
        let mut map = room_map();
        map.refresh_absorption(Season::Summer);
        // Middle of the north wall: west/east buddies, roofed row inside
        assert_eq!(absorption(&map, 6, 4), WALL as i32);
        // Corner: one south and one east buddy, not in line
        assert_eq!(absorption(&map, 4, 4), THICK_BARRIER as i32);
        // Floor inside the room
        assert_eq!(absorption(&map, 6, 6), OPEN_FIELD as i32);
    }

    #[test]
    fn test_unroofed_wall_keeps_base() {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        map.set_land_use(Tripoint::new(0, 0, 0), LandUse::Forest);
        for x in 2..=6 {
            map.set_terrain(Tripoint::new(x, 3, 0), Terrain::Wall);
        }
        map.refresh_absorption(Season::Summer);
        assert_eq!(absorption(&map, 4, 3), 20);
    }

    #[test]
    fn test_lone_pillar_is_light_barrier() {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        let p = Tripoint::new(5, 5, 0);
        map.set_terrain(p, Terrain::Wall);
        map.set_roof(p, true);
        map.set_terrain(Tripoint::new(6, 6, 0), Terrain::Fence);
        map.set_roof(Tripoint::new(6, 6, 0), true);
        map.refresh_absorption(Season::Summer);
        assert_eq!(absorption(&map, 5, 5), BARRIER as i32);
        assert_eq!(absorption(&map, 6, 6), OPEN_FIELD as i32);
    }

    #[test]
    fn test_connect_only_line_is_thick_barrier() {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        for x in 2..=6 {
            for y in 3..=4 {
                map.set_roof(Tripoint::new(x, y, 0), true);
            }
            map.set_terrain(Tripoint::new(x, 3, 0), Terrain::Fence);
        }
        map.refresh_absorption(Season::Summer);
        assert_eq!(absorption(&map, 4, 3), THICK_BARRIER as i32);
    }

    #[test]
    fn test_furniture_and_vehicles_are_barriers() {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        map.set_furniture(Tripoint::new(1, 1, 0), Furniture::Sandbags);
        map.set_furniture(Tripoint::new(2, 1, 0), Furniture::Table);
        map.set_vehicle(Tripoint::new(3, 1, 0), Some(VehiclePart::FullBoard));
        map.set_vehicle(Tripoint::new(4, 1, 0), Some(VehiclePart::Door { open: true }));
        map.refresh_absorption(Season::Summer);
        assert_eq!(absorption(&map, 1, 1), BARRIER as i32);
        assert_eq!(absorption(&map, 2, 1), OPEN_FIELD as i32);
        assert_eq!(absorption(&map, 3, 1), BARRIER as i32);
        assert_eq!(absorption(&map, 4, 1), OPEN_FIELD as i32);
    }

    #[test]
    fn test_rebuild_is_incremental_and_idempotent() {
        let mut map = LocalMap::new(3, Tripoint::default());
        map.add_level(0);
        assert_eq!(map.refresh_absorption(Season::Summer), 9);
        let before = map.level(0).map(|l| l.absorption.values().clone());

        // Nothing dirty: nothing rebuilt, same values
        assert_eq!(map.refresh_absorption(Season::Summer), 0);
        map.mark_dirty(Tripoint::new(18, 18, 0));
        assert_eq!(map.refresh_absorption(Season::Summer), 1);
        let after = map.level(0).map(|l| l.absorption.values().clone());
        assert_eq!(before, after);

        // A new season invalidates everything
        assert_eq!(map.refresh_absorption(Season::Winter), 9);
        assert_eq!(absorption(&map, 18, 18), SNOW_BONUS as i32);
    }

    #[test]
    fn test_empty_level_is_noop() {
        let mut map = LocalMap::new(0, Tripoint::default());
        map.add_level(0);
        assert_eq!(map.refresh_absorption(Season::Summer), 0);
    }
}

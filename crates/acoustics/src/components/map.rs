//! Local Map Components
//!
//! The loaded part of the world: per-level tile grids, land use per submap
//! and the absorption cache each level keeps for sound propagation.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use sound_events::{Season, Tripoint};

use super::grid::Grid;
use crate::systems::absorption::AbsorptionCache;

/// Tiles along one side of a submap
pub const SUBMAP_SIZE: i32 = 12;

/// Base terrain of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Open,
    Floor,
    Wall,
    Window,
    ClosedDoor,
    OpenDoor,
    Fence,
}

impl Terrain {
    /// Air cannot pass through this terrain.
    pub fn blocks_wind(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Window | Terrain::ClosedDoor)
    }

    /// Terrain drawn as part of a wall line.
    pub fn connects_to_wall(self) -> bool {
        matches!(
            self,
            Terrain::Wall | Terrain::Window | Terrain::ClosedDoor | Terrain::OpenDoor | Terrain::Fence
        )
    }

    /// Either property makes a tile a candidate for wall absorption.
    pub fn is_wall_like(self) -> bool {
        self.blocks_wind() || self.connects_to_wall()
    }
}

/// Furniture placed on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Furniture {
    #[default]
    None,
    Table,
    Sandbags,
    TentWall,
}

impl Furniture {
    pub fn blocks_wind(self) -> bool {
        matches!(self, Furniture::Sandbags | Furniture::TentWall)
    }
}

/// The vehicle part occupying a tile, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehiclePart {
    Frame,
    FullBoard,
    Door { open: bool },
}

impl VehiclePart {
    /// Full boards and closed doors seal the tile.
    pub fn obstructs(self) -> bool {
        matches!(self, VehiclePart::FullBoard | VehiclePart::Door { open: false })
    }
}

/// A single map tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub furniture: Furniture,
    pub vehicle: Option<VehiclePart>,
    /// The tile has a roof (or a floor above it)
    pub roofed: bool,
}

impl Tile {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            ..Default::default()
        }
    }

    pub fn roofed(mut self) -> Self {
        self.roofed = true;
        self
    }
}

/// Overmap land use of a submap, used for terrain attenuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    #[default]
    Field,
    Forest,
    LightVegetation,
    Urban,
}

/// One z-level of the local map
#[derive(Debug, Clone)]
pub struct MapLevel {
    pub tiles: Grid<Tile>,
    /// Land use per submap
    pub land_use: Grid<LandUse>,
    pub absorption: AbsorptionCache,
}

impl MapLevel {
    pub fn new(submaps: usize) -> Self {
        let size = submaps * SUBMAP_SIZE as usize;
        Self {
            tiles: Grid::new(size, size, Tile::default()),
            land_use: Grid::new(submaps, submaps, LandUse::default()),
            absorption: AbsorptionCache::new(submaps),
        }
    }

    /// Tiles along one side of the level
    pub fn size(&self) -> usize {
        self.tiles.width()
    }

    pub fn land_use_at(&self, x: i32, y: i32) -> LandUse {
        self.land_use
            .get(x.div_euclid(SUBMAP_SIZE), y.div_euclid(SUBMAP_SIZE))
            .copied()
            .unwrap_or_default()
    }

    /// Mark the submaps whose absorption may depend on `(x, y)` as dirty.
    ///
    /// Absorption reads a 3x3 neighbourhood, so tiles on a submap edge also
    /// dirty the adjacent submap.
    pub fn mark_dirty(&mut self, x: i32, y: i32) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (tx, ty) = (x + dx, y + dy);
                if self.tiles.in_bounds(tx, ty) {
                    self.absorption
                        .mark_dirty(tx.div_euclid(SUBMAP_SIZE), ty.div_euclid(SUBMAP_SIZE));
                }
            }
        }
    }
}

/// Resource holding every loaded map level
#[derive(Resource, Debug, Clone)]
pub struct LocalMap {
    submaps: usize,
    /// Absolute submap coordinate of the local map's north-west corner
    abs_sub_origin: Tripoint,
    levels: BTreeMap<i32, MapLevel>,
}

impl LocalMap {
    pub fn new(submaps: usize, abs_sub_origin: Tripoint) -> Self {
        Self {
            submaps,
            abs_sub_origin,
            levels: BTreeMap::new(),
        }
    }

    /// Load an empty level at `z`, replacing any existing one.
    pub fn add_level(&mut self, z: i32) -> &mut MapLevel {
        let level = MapLevel::new(self.submaps);
        match self.levels.entry(z) {
            Entry::Occupied(mut slot) => {
                slot.insert(level);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(level),
        }
    }

    pub fn level(&self, z: i32) -> Option<&MapLevel> {
        self.levels.get(&z)
    }

    pub fn level_mut(&mut self, z: i32) -> Option<&mut MapLevel> {
        self.levels.get_mut(&z)
    }

    pub fn levels_mut(&mut self) -> impl Iterator<Item = (&i32, &mut MapLevel)> {
        self.levels.iter_mut()
    }

    /// Tiles along one side of every level
    pub fn size(&self) -> usize {
        self.submaps * SUBMAP_SIZE as usize
    }

    pub fn submaps(&self) -> usize {
        self.submaps
    }

    pub fn abs_sub_origin(&self) -> Tripoint {
        self.abs_sub_origin
    }

    pub fn in_bounds(&self, p: Tripoint) -> bool {
        self.level(p.z)
            .map(|level| level.tiles.in_bounds(p.x, p.y))
            .unwrap_or(false)
    }

    pub fn tile(&self, p: Tripoint) -> Option<&Tile> {
        self.level(p.z).and_then(|level| level.tiles.get(p.x, p.y))
    }

    fn update_tile(&mut self, p: Tripoint, update: impl FnOnce(&mut Tile)) -> bool {
        let Some(level) = self.levels.get_mut(&p.z) else {
            return false;
        };
        let Some(tile) = level.tiles.get_mut(p.x, p.y) else {
            return false;
        };
        update(tile);
        level.mark_dirty(p.x, p.y);
        true
    }

    pub fn set_terrain(&mut self, p: Tripoint, terrain: Terrain) -> bool {
        self.update_tile(p, |tile| tile.terrain = terrain)
    }

    pub fn set_furniture(&mut self, p: Tripoint, furniture: Furniture) -> bool {
        self.update_tile(p, |tile| tile.furniture = furniture)
    }

    pub fn set_vehicle(&mut self, p: Tripoint, part: Option<VehiclePart>) -> bool {
        self.update_tile(p, |tile| tile.vehicle = part)
    }

    pub fn set_roof(&mut self, p: Tripoint, roofed: bool) -> bool {
        self.update_tile(p, |tile| tile.roofed = roofed)
    }

    /// Set the land use of the submap containing `p`.
    pub fn set_land_use(&mut self, p: Tripoint, land_use: LandUse) -> bool {
        let Some(level) = self.levels.get_mut(&p.z) else {
            return false;
        };
        let (sx, sy) = (p.x.div_euclid(SUBMAP_SIZE), p.y.div_euclid(SUBMAP_SIZE));
        if level.land_use.set(sx, sy, land_use) {
            level.absorption.mark_dirty(sx, sy);
            true
        } else {
            false
        }
    }

    pub fn land_use_at(&self, p: Tripoint) -> LandUse {
        self.level(p.z)
            .map(|level| level.land_use_at(p.x, p.y))
            .unwrap_or_default()
    }

    /// Mark absorption around `p` as stale after an outside change.
    pub fn mark_dirty(&mut self, p: Tripoint) {
        if let Some(level) = self.levels.get_mut(&p.z) {
            level.mark_dirty(p.x, p.y);
        }
    }

    /// Mark every submap of every level as stale.
    pub fn invalidate_all(&mut self) {
        for level in self.levels.values_mut() {
            level.absorption.mark_all_dirty();
        }
    }

    /// Underground or under a roof.
    pub fn is_sheltered(&self, p: Tripoint) -> bool {
        p.z < 0 || self.tile(p).map(|tile| tile.roofed).unwrap_or(false)
    }

    /// Absolute submap coordinate containing the local point `p`.
    pub fn absolute_submap(&self, p: Tripoint) -> Tripoint {
        Tripoint::new(
            self.abs_sub_origin.x + p.x.div_euclid(SUBMAP_SIZE),
            self.abs_sub_origin.y + p.y.div_euclid(SUBMAP_SIZE),
            p.z,
        )
    }

    /// Rebuild the dirty parts of every level's absorption cache.
    ///
    /// Returns the number of submaps rebuilt.
    pub fn refresh_absorption(&mut self, season: Season) -> usize {
        self.levels
            .values_mut()
            .map(|level| {
                level
                    .absorption
                    .rebuild(&level.tiles, &level.land_use, season)
            })
            .sum()
    }
}

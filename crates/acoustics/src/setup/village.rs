//! Village Map
//!
//! A small demo settlement: a roofed farmhouse with a cellar, a fenced
//! yard, a tent, a parked van, and woods along the west edge.

use sound_events::Tripoint;

use crate::components::map::{Furniture, LandUse, LocalMap, Terrain, VehiclePart, SUBMAP_SIZE};

/// Smallest map that fits the village
pub const MIN_VILLAGE_SUBMAPS: usize = 2;

/// Absolute submap of the map's north-west corner
pub const VILLAGE_SUB_ORIGIN: Tripoint = Tripoint::new(140, 85, 0);

/// Corners of the farmhouse, walls included
pub const HOUSE_MIN: (i32, i32) = (14, 3);
pub const HOUSE_MAX: (i32, i32) = (21, 9);

/// Create the village on a map `submaps` submaps across.
pub fn create_village_map(submaps: usize) -> LocalMap {
    let submaps = submaps.max(MIN_VILLAGE_SUBMAPS);
    let size = (submaps as i32) * SUBMAP_SIZE;
    let mut map = LocalMap::new(submaps, VILLAGE_SUB_ORIGIN);
    map.add_level(0);
    map.add_level(-1);

    lay_out_land_use(&mut map, size);
    build_house(&mut map);
    build_cellar(&mut map);
    build_fence(&mut map, size);

    // A tent in the yard and a van on the road
    for x in 4..=6 {
        map.set_furniture(Tripoint::new(x, 14, 0), Furniture::TentWall);
    }
    let van_x = size - 4;
    for x in van_x..van_x + 3 {
        map.set_vehicle(Tripoint::new(x, SUBMAP_SIZE, 0), Some(VehiclePart::FullBoard));
    }

    map
}

fn lay_out_land_use(map: &mut LocalMap, size: i32) {
    for y in 0..size {
        for x in 0..size {
            let land_use = if x < SUBMAP_SIZE / 2 {
                LandUse::Forest
            } else if y < SUBMAP_SIZE {
                LandUse::Urban
            } else if y >= size - SUBMAP_SIZE / 2 {
                LandUse::LightVegetation
            } else {
                LandUse::Field
            };
            map.set_land_use(Tripoint::new(x, y, 0), land_use);
        }
    }
}

fn build_house(map: &mut LocalMap) {
    let (x0, y0) = HOUSE_MIN;
    let (x1, y1) = HOUSE_MAX;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Tripoint::new(x, y, 0);
            let edge = x == x0 || x == x1 || y == y0 || y == y1;
            map.set_terrain(p, if edge { Terrain::Wall } else { Terrain::Floor });
            map.set_roof(p, true);
        }
    }
    map.set_terrain(Tripoint::new((x0 + x1) / 2, y1, 0), Terrain::ClosedDoor);
    map.set_terrain(Tripoint::new(x1, (y0 + y1) / 2, 0), Terrain::Window);
    map.set_furniture(Tripoint::new(x0 + 2, y0 + 2, 0), Furniture::Table);
}

fn build_cellar(map: &mut LocalMap) {
    let (x0, y0) = HOUSE_MIN;
    let (x1, y1) = HOUSE_MAX;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Tripoint::new(x, y, -1);
            let edge = x == x0 || x == x1 || y == y0 || y == y1;
            map.set_terrain(p, if edge { Terrain::Wall } else { Terrain::Floor });
            map.set_roof(p, true);
        }
    }
}

fn build_fence(map: &mut LocalMap, size: i32) {
    let y = SUBMAP_SIZE + 4;
    for x in SUBMAP_SIZE / 2..size.min(SUBMAP_SIZE * 2) {
        map.set_terrain(Tripoint::new(x, y, 0), Terrain::Fence);
    }
    map.set_furniture(Tripoint::new(SUBMAP_SIZE, y - 1, 0), Furniture::Sandbags);
}

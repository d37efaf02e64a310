//! Dense 2D grids
//!
//! Row-major storage shared by the absorption cache, sound fields and the
//! flood-fill scratch buffers.

use serde::{Deserialize, Serialize};

/// A fixed-size rectangular grid indexed by `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// Reset every cell to `value`.
    pub fn fill(&mut self, value: T) {
        for cell in &mut self.cells {
            *cell = value.clone();
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when `(x, y)` lies inside the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Write `value` at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Iterate `(x, y, &value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i % width) as i32, (i / width) as i32, cell))
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Value at `(x, y)`, or the default when out of bounds.
    pub fn value_or_default(&self, x: i32, y: i32) -> T {
        self.get(x, y).copied().unwrap_or_default()
    }
}

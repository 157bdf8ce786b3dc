//! Fixed navigation grid over the square world

use glam::Vec2;

/// Integer cell index, always inside `[0, divisions)` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Column (world x)
    pub i: u32,
    /// Row (world z)
    pub j: u32,
}

/// Discretisation of the world into `divisions` x `divisions` cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavGrid {
    /// World side length, centred on the origin
    pub world_extent: f32,
    /// Cells per side
    pub divisions: u32,
    /// Cell size in world units
    pub cell_size: f32,
}

impl NavGrid {
    /// Create a grid covering `world_extent` with `divisions` cells per side
    #[must_use]
    pub fn new(world_extent: f32, divisions: u32) -> Self {
        Self {
            world_extent,
            divisions,
            cell_size: world_extent / divisions as f32,
        }
    }

    /// Convert world position to a grid cell, `None` outside the grid
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> Option<GridCell> {
        let half = self.world_extent * 0.5;
        let fi = ((pos.x + half) / self.world_extent * self.divisions as f32).floor();
        let fj = ((pos.y + half) / self.world_extent * self.divisions as f32).floor();
        let i = self.checked_axis(fi)?;
        let j = self.checked_axis(fj)?;
        Some(GridCell { i, j })
    }

    fn checked_axis(&self, f: f32) -> Option<u32> {
        if f.is_finite() && f >= 0.0 && f < self.divisions as f32 {
            Some(f as u32)
        } else {
            None
        }
    }

    /// Offset a cell, `None` if the result leaves the grid
    #[must_use]
    pub fn offset(&self, cell: GridCell, di: i32, dj: i32) -> Option<GridCell> {
        let i = cell.i.checked_add_signed(di)?;
        let j = cell.j.checked_add_signed(dj)?;
        (i < self.divisions && j < self.divisions).then_some(GridCell { i, j })
    }

    /// Convert a cell to the world position of its centre
    #[must_use]
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        let half = self.world_extent * 0.5;
        Vec2::new(
            (cell.i as f32 + 0.5) * self.cell_size - half,
            (cell.j as f32 + 0.5) * self.cell_size - half,
        )
    }

    /// Flat row-major index of a cell
    #[must_use]
    pub fn index(&self, cell: GridCell) -> usize {
        cell.j as usize * self.divisions as usize + cell.i as usize
    }

    /// Inverse of [`NavGrid::index`]
    #[must_use]
    pub fn cell_at(&self, index: usize) -> GridCell {
        let d = self.divisions as usize;
        GridCell {
            i: (index % d) as u32,
            j: (index / d) as u32,
        }
    }

    /// Total number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.divisions as usize * self.divisions as usize
    }
}

use bitvec::prelude::*;
use wfc_rules::{Direction, TileId};

/// Dense 3D array flattened as `x + z * dim_x + y * dim_x * dim_z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    pub dim_x: usize,
    pub dim_y: usize,
    pub dim_z: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every element set to `value`.
    pub fn filled(dim_x: usize, dim_y: usize, dim_z: usize, value: T) -> Self {
        Self {
            dim_x,
            dim_y,
            dim_z,
            data: vec![value; dim_x * dim_y * dim_z],
        }
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(dim_x: usize, dim_y: usize, dim_z: usize) -> Self {
        Self::filled(dim_x, dim_y, dim_z, T::default())
    }
}

impl<T> Grid<T> {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element at the given coordinates, or None if out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        self.index(x, y, z).and_then(|idx| self.data.get(idx))
    }

    /// Returns the element at the given coordinates mutably, or None if out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut T> {
        self.index(x, y, z).and_then(move |idx| self.data.get_mut(idx))
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Flat index of `(x, y, z)`, or None if out of bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.dim_x && y < self.dim_y && z < self.dim_z {
            Some(x + z * self.dim_x + y * self.dim_x * self.dim_z)
        } else {
            None
        }
    }

    /// Coordinates of a flat index. The index is not bounds checked.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let layer = self.dim_x * self.dim_z;
        let y = index / layer;
        let rest = index % layer;
        (rest % self.dim_x, y, rest / self.dim_x)
    }

    /// Coordinates shifted by `(dx, dy, dz)`, if still inside the grid.
    pub fn offset(
        &self,
        (x, y, z): (usize, usize, usize),
        (dx, dy, dz): (isize, isize, isize),
    ) -> Option<(usize, usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        let nz = z.checked_add_signed(dz)?;
        self.index(nx, ny, nz).map(|_| (nx, ny, nz))
    }

    /// Coordinates of the neighbor on the `dir` face, if inside the grid.
    pub fn neighbor(
        &self,
        coords: (usize, usize, usize),
        dir: Direction,
    ) -> Option<(usize, usize, usize)> {
        self.offset(coords, dir.offset())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

/// One grid position during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Remaining candidate tiles, one bit per tile id.
    pub options: BitVec,
    /// Terminal: the options are frozen to exactly one tile.
    pub collapsed: bool,
    /// Only read when the visitable overlay is enabled.
    pub visitable: bool,
    /// Never receives a tile.
    pub blocked: bool,
    /// Selection key; the option count unless `artificial_entropy` is set.
    pub entropy: usize,
    /// Entropy was forced by a fixed anchor and is left alone by propagation.
    pub artificial_entropy: bool,
}

impl Cell {
    /// A cell that may still become any of `num_tiles` tiles.
    pub fn new(num_tiles: usize) -> Self {
        Self {
            options: bitvec![1; num_tiles],
            collapsed: false,
            visitable: false,
            blocked: false,
            entropy: num_tiles,
            artificial_entropy: false,
        }
    }

    /// Freezes the cell to `tile`.
    pub fn collapse_to(&mut self, tile: TileId) {
        self.options.fill(false);
        if tile.0 < self.options.len() {
            self.options.set(tile.0, true);
        }
        self.collapsed = true;
        self.entropy = 1;
        self.artificial_entropy = false;
    }

    /// The chosen tile of a collapsed cell.
    pub fn tile(&self) -> Option<TileId> {
        if !self.collapsed {
            return None;
        }
        self.options.first_one().map(TileId)
    }

    /// Number of remaining options.
    #[inline]
    pub fn option_count(&self) -> usize {
        self.options.count_ones()
    }

    /// Replaces the option set and refreshes the entropy unless it is forced.
    pub fn set_options(&mut self, options: BitVec) {
        self.options = options;
        if !self.artificial_entropy {
            self.entropy = self.options.count_ones();
        }
    }

    /// Forces the selection key to `entropy` until the cell collapses.
    pub fn force_entropy(&mut self, entropy: usize) {
        self.entropy = entropy;
        self.artificial_entropy = true;
    }

    /// Uncollapsed and not blocked: still work to do here.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.collapsed && !self.blocked
    }
}

/// The generation grid.
pub type CellGrid = Grid<Cell>;

impl CellGrid {
    /// A grid of open cells for a catalog of `num_tiles` tiles.
    pub fn for_tiles(dim_x: usize, dim_y: usize, dim_z: usize, num_tiles: usize) -> Self {
        Self::filled(dim_x, dim_y, dim_z, Cell::new(num_tiles))
    }

    /// Number of collapsed cells.
    pub fn count_collapsed(&self) -> usize {
        self.data.iter().filter(|c| c.collapsed).count()
    }

    /// Number of cells that are expected to receive a tile.
    pub fn count_unblocked(&self) -> usize {
        self.data.iter().filter(|c| !c.blocked).count()
    }
}

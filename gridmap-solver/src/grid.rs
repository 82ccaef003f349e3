use crate::WfcError;
use gridmap_rules::Direction;

/// Row-major 2D grid, indexed by flat offset `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps existing row-major data.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::GridError` if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, WfcError> {
        if data.len() != width * height {
            return Err(WfcError::GridError(format!(
                "expected {} cells for a {width}x{height} grid, got {}",
                width * height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).and_then(move |idx| self.data.get_mut(idx))
    }

    /// Calculates the flat index for the given coordinates.
    /// Returns None if the coordinates are out of bounds.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Converts a flat index back to `(x, y)`.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Flat index of the in-bounds neighbor of `index` in `direction`.
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        let (x, y) = self.coords(index);
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.index(nx, ny)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.data
    }

    /// Iterates `((x, y), cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.coords(i), cell))
    }
}

/// The externally owned grid the solver writes its assignment into.
///
/// The solver only ever calls `set_type_id`; the usage-blocked flag is read-only.
pub trait CellGrid {
    /// Number of columns.
    fn width(&self) -> usize;
    /// Number of rows.
    fn height(&self) -> usize;
    /// Currently assigned type id, empty when unassigned.
    fn type_id(&self, x: usize, y: usize) -> &str;
    /// Overwrites the assigned type id.
    fn set_type_id(&mut self, x: usize, y: usize, type_id: String);
    /// Whether usage generation marked the cell as blocked.
    fn is_usage_blocked(&self, x: usize, y: usize) -> bool;
}

/// A host grid cell: the assigned tile type plus the usage-blocked flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub type_id: String,
    pub usage_blocked: bool,
}

/// Stand-alone host grid.
pub type TileGrid = Grid<Cell>;

impl TileGrid {
    /// Builds an unassigned grid from a row-major blocked mask.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::GridError` if the mask length does not match the dimensions.
    pub fn from_blocked_mask(width: usize, height: usize, mask: &[bool]) -> Result<Self, WfcError> {
        let cells = mask
            .iter()
            .map(|&usage_blocked| Cell {
                type_id: String::new(),
                usage_blocked,
            })
            .collect();
        Self::from_vec(width, height, cells)
    }

    /// Assigned type ids, one `Vec` per row.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        self.data
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|c| c.type_id.as_str()).collect())
            .collect()
    }
}

impl CellGrid for TileGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn type_id(&self, x: usize, y: usize) -> &str {
        self.get(x, y).map_or("", |c| c.type_id.as_str())
    }

    fn set_type_id(&mut self, x: usize, y: usize, type_id: String) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.type_id = type_id;
        }
    }

    fn is_usage_blocked(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|c| c.usage_blocked)
    }
}

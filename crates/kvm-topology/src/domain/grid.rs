//! Grid coordinate system.
//!
//! Screens are placed on an unbounded plane of integer cells.  Columns grow to
//! the right and rows grow downwards, so moving `Up` decrements the row.  The
//! plane ends only where `i32` does: a cell on that edge has no neighbor beyond
//! it.  The finite grid the user sees is a [`GridViewport`] that can be panned
//! or grown on demand.

use serde::{Deserialize, Serialize};

/// Default number of columns in the visible grid window.
pub const DEFAULT_COLUMNS: u32 = 5;

/// Default number of rows in the visible grid window.
pub const DEFAULT_ROWS: u32 = 3;

/// An integer (column, row) address on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub column: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns the cell one unit away in `direction`, or `None` if that would
    /// leave the `i32` range.
    pub fn step(self, direction: Direction) -> Option<Cell> {
        let (dc, dr) = direction.offset();
        Some(Cell {
            column: self.column.checked_add(dc)?,
            row: self.row.checked_add(dr)?,
        })
    }

    /// Key used to order cells row-major (top row first, then left to right).
    pub fn row_major_key(self) -> (i32, i32) {
        (self.row, self.column)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}

/// One of the four cardinal directions a neighbor can lie in.
///
/// `Left`/`Right`/`Up`/`Down` are west/east/north/south respectively; the
/// names follow the engine grammar, which uses `left`, `right`, `up`, `down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions in the order the engine configuration lists them.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector as `(delta_column, delta_row)`.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Keyword used for this direction in the engine configuration.
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Parses an engine keyword (`left`, `right`, `up`, `down`).
    pub fn from_keyword(keyword: &str) -> Option<Direction> {
        match keyword {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Index into per-direction arrays, following [`Direction::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Left => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The finite window of the grid shown to the user.
///
/// Placement never depends on the viewport; it only decides which cells the
/// editor draws and where "first free cell" searches start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridViewport {
    /// Top-left cell of the window.
    pub origin: Cell,
    pub columns: u32,
    pub rows: u32,
}

impl Default for GridViewport {
    fn default() -> Self {
        Self {
            origin: Cell::new(0, 0),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl GridViewport {
    pub fn new(origin: Cell, columns: u32, rows: u32) -> Self {
        Self {
            origin,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    /// Rightmost column inside the window.
    pub fn last_column(&self) -> i32 {
        last_of(self.origin.column, self.columns)
    }

    /// Bottom row inside the window.
    pub fn last_row(&self) -> i32 {
        last_of(self.origin.row, self.rows)
    }

    /// Returns `true` if `cell` is inside the window.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.column >= self.origin.column
            && cell.column <= self.last_column()
            && cell.row >= self.origin.row
            && cell.row <= self.last_row()
    }

    /// Shifts the window one cell in `direction` without resizing it.  Does
    /// nothing at the edge of the plane.
    pub fn pan(&mut self, direction: Direction) {
        if let Some(origin) = self.origin.step(direction) {
            self.origin = origin;
        }
    }

    /// Grows the window just enough to cover `cell`.  Never shrinks.
    pub fn expand_to_include(&mut self, cell: Cell) {
        let min_column = self.origin.column.min(cell.column);
        let min_row = self.origin.row.min(cell.row);
        let max_column = self.last_column().max(cell.column);
        let max_row = self.last_row().max(cell.row);

        self.origin = Cell::new(min_column, min_row);
        self.columns = span(min_column, max_column);
        self.rows = span(min_row, max_row);
    }

    /// Smallest window that covers every cell in `cells`, but never smaller
    /// than the default size.  An empty iterator yields the default window.
    pub fn fit<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut cells = cells.into_iter();
        let Some(first) = cells.next() else {
            return Self::default();
        };

        let mut viewport = Self::new(first, 1, 1);
        for cell in cells {
            viewport.expand_to_include(cell);
        }
        viewport.columns = viewport.columns.max(DEFAULT_COLUMNS);
        viewport.rows = viewport.rows.max(DEFAULT_ROWS);
        viewport
    }

    /// Iterates every cell in the window, top row first, left to right.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.origin.row..=self.last_row()).flat_map(move |row| {
            (self.origin.column..=self.last_column()).map(move |column| Cell::new(column, row))
        })
    }
}

/// Last coordinate of a run of `len` cells starting at `first`, clamped to the
/// edge of the plane.
fn last_of(first: i32, len: u32) -> i32 {
    let last = i64::from(first) + i64::from(len) - 1;
    i32::try_from(last).unwrap_or(i32::MAX)
}

/// Number of cells from `first` to `last` inclusive.
fn span(first: i32, last: i32) -> u32 {
    let len = i64::from(last) - i64::from(first) + 1;
    u32::try_from(len).unwrap_or(u32::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cell / Direction ──────────────────────────────────────────────────────

    #[test]
    fn test_step_right_increments_column() {
        assert_eq!(Cell::new(0, 0).step(Direction::Right), Some(Cell::new(1, 0)));
    }

    #[test]
    fn test_step_up_decrements_row() {
        assert_eq!(Cell::new(3, 2).step(Direction::Up), Some(Cell::new(3, 1)));
    }

    #[test]
    fn test_step_into_negative_coordinates_is_allowed() {
        assert_eq!(Cell::new(0, 0).step(Direction::Left), Some(Cell::new(-1, 0)));
        assert_eq!(Cell::new(0, 0).step(Direction::Up), Some(Cell::new(0, -1)));
    }

    #[test]
    fn test_step_then_opposite_returns_to_start() {
        let start = Cell::new(7, -4);
        for dir in Direction::ALL {
            let back = start.step(dir).and_then(|c| c.step(dir.opposite()));
            assert_eq!(back, Some(start));
        }
    }

    #[test]
    fn test_step_off_the_edge_of_the_plane_is_none() {
        assert_eq!(Cell::new(i32::MAX, 0).step(Direction::Right), None);
        assert_eq!(Cell::new(i32::MIN, 0).step(Direction::Left), None);
        assert_eq!(Cell::new(0, i32::MIN).step(Direction::Up), None);
        assert_eq!(Cell::new(0, i32::MAX).step(Direction::Down), None);
        assert_eq!(
            Cell::new(i32::MAX, 0).step(Direction::Left),
            Some(Cell::new(i32::MAX - 1, 0))
        );
    }

    #[test]
    fn test_direction_keywords_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_keyword(dir.keyword()), Some(dir));
        }
        assert_eq!(Direction::from_keyword("north"), None);
    }

    #[test]
    fn test_direction_index_follows_engine_order() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_row_major_key_orders_rows_before_columns() {
        let mut cells = vec![Cell::new(1, 1), Cell::new(5, 0), Cell::new(0, 1)];
        cells.sort_by_key(|c| c.row_major_key());
        assert_eq!(cells, vec![Cell::new(5, 0), Cell::new(0, 1), Cell::new(1, 1)]);
    }

    // ── GridViewport ──────────────────────────────────────────────────────────

    #[test]
    fn test_default_viewport_is_five_by_three() {
        let viewport = GridViewport::default();
        assert_eq!(viewport.columns, 5);
        assert_eq!(viewport.rows, 3);
        assert_eq!(viewport.cells().count(), 15);
    }

    #[test]
    fn test_contains_respects_window_bounds() {
        let viewport = GridViewport::default();
        assert!(viewport.contains(Cell::new(0, 0)));
        assert!(viewport.contains(Cell::new(4, 2)));
        assert!(!viewport.contains(Cell::new(5, 2)));
        assert!(!viewport.contains(Cell::new(-1, 0)));
    }

    #[test]
    fn test_pan_moves_origin_without_resizing() {
        let mut viewport = GridViewport::default();
        viewport.pan(Direction::Left);
        assert_eq!(viewport.origin, Cell::new(-1, 0));
        assert_eq!(viewport.columns, 5);
        assert!(viewport.contains(Cell::new(-1, 0)));
    }

    #[test]
    fn test_expand_to_include_grows_towards_negative_cell() {
        let mut viewport = GridViewport::default();
        viewport.expand_to_include(Cell::new(-2, -1));
        assert_eq!(viewport.origin, Cell::new(-2, -1));
        assert_eq!(viewport.columns, 7);
        assert_eq!(viewport.rows, 4);
    }

    #[test]
    fn test_expand_to_include_is_noop_for_visible_cell() {
        let mut viewport = GridViewport::default();
        viewport.expand_to_include(Cell::new(2, 1));
        assert_eq!(viewport, GridViewport::default());
    }

    #[test]
    fn test_fit_covers_all_cells_with_minimum_size() {
        let viewport = GridViewport::fit([Cell::new(10, 10), Cell::new(11, 10)]);
        assert_eq!(viewport.origin, Cell::new(10, 10));
        assert_eq!(viewport.columns, 5);
        assert_eq!(viewport.rows, 3);
    }

    #[test]
    fn test_viewport_at_edge_of_plane_does_not_overflow() {
        // Arrange
        let mut viewport = GridViewport::new(Cell::new(i32::MAX - 1, 0), 5, 3);

        // Act
        viewport.pan(Direction::Right);
        viewport.pan(Direction::Right);
        viewport.expand_to_include(Cell::new(i32::MIN, 0));

        // Assert
        assert_eq!(viewport.origin, Cell::new(i32::MIN, 0));
        assert_eq!(viewport.columns, u32::MAX);
        assert!(viewport.contains(Cell::new(0, 2)));
    }

    #[test]
    fn test_fit_of_no_cells_is_default() {
        assert_eq!(GridViewport::fit(Vec::new()), GridViewport::default());
    }

    #[test]
    fn test_cells_iterates_row_major() {
        let viewport = GridViewport::new(Cell::new(0, 0), 2, 2);
        let cells: Vec<_> = viewport.cells().collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1), Cell::new(1, 1)]
        );
    }
}

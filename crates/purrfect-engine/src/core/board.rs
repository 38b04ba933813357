use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BoardSizeError, PlacementError};

use super::{
    cell::{Cell, CellData, CellDataError, PieceColor, PieceId},
    piece::BombPiece,
    shape::PieceShape,
};

/// Rows and columns that are completely occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteLines {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl CompleteLines {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    /// Number of lines, counting a row and a column that cross as two.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len() + self.cols.len()
    }
}

/// The playing grid.
///
/// Dimensions are fixed at construction. Query coordinates are signed so that
/// callers can probe anchors hanging off the top or left edge; anything
/// outside `[0, rows) × [0, cols)` is rejected rather than clamped.
///
/// # Example
///
/// ```
/// use purrfect_engine::{Board, PieceColor, PieceId, PieceShape};
///
/// let mut board = Board::default();
/// let bar = PieceShape::from_ascii(&["####"]);
/// let color = PieceColor::from_hex(0xD84315);
///
/// assert!(board.can_place_piece(bar, 7, 0));
/// board.place_piece(bar, 7, 0, color, PieceId::new(1, 0));
/// board.place_piece(bar, 7, 4, color, PieceId::new(1, 1));
///
/// let lines = board.get_complete_lines();
/// assert_eq!(lines.rows, [7]);
/// assert_eq!(board.clear_lines(&lines.rows, &lines.cols), 1);
/// assert_eq!(board.occupied_count(), 0);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BoardSnapshot", try_from = "BoardSnapshot")]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(Self::DEFAULT_ROWS, Self::DEFAULT_COLS)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{} {{", self.rows, self.cols)?;
        for row in self.to_string().lines() {
            writeln!(f, "    {row}")?;
        }
        write!(f, "}}")
    }
}

impl Board {
    pub const DEFAULT_ROWS: usize = 8;
    pub const DEFAULT_COLS: usize = 8;
    pub const MAX_EDGE: usize = 64;

    pub fn new(rows: usize, cols: usize) -> Result<Self, BoardSizeError> {
        Self::check_size(rows, cols)?;
        Ok(Self::empty(rows, cols))
    }

    pub(crate) fn check_size(rows: usize, cols: usize) -> Result<(), BoardSizeError> {
        let valid = 1..=Self::MAX_EDGE;
        if valid.contains(&rows) && valid.contains(&cols) {
            Ok(())
        } else {
            Err(BoardSizeError {
                rows,
                cols,
                max: Self::MAX_EDGE,
            })
        }
    }

    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Builds a board from rows of `#` (occupied) and `.` (empty).
    ///
    /// Occupied cells get a neutral gray color and owner `00000000-0`.
    /// Intended for tests and debugging.
    ///
    /// # Panics
    ///
    /// Panics if the rows are empty, ragged, too large, or contain other
    /// characters.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut board = Self::new(height, width).expect("invalid board size");
        let color = PieceColor::from_hex(0x80_80_80);
        let owner = PieceId::new(0, 0);
        for (r, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), width, "row {r} has a different width");
            for (c, ch) in line.bytes().enumerate() {
                match ch {
                    b'#' => board.cells[r * width + c].fill(color, owner),
                    b'.' => {}
                    _ => panic!("invalid board character {:?}", char::from(ch)),
                }
            }
        }
        board
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: isize, col: isize) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|&r| r < self.rows)?;
        let col = usize::try_from(col).ok().filter(|&c| c < self.cols)?;
        Some(row * self.cols + col)
    }

    #[must_use]
    pub fn is_in_bounds(&self, row: isize, col: isize) -> bool {
        self.index(row, col).is_some()
    }

    /// Returns the cell at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, row: isize, col: isize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn cell_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.cols)
    }

    fn fits(&self, shape: PieceShape, row: usize, col: usize) -> bool {
        shape.cells().all(|(dr, dc)| {
            let (r, c) = (row + dr, col + dc);
            r < self.rows && c < self.cols && self.cells[r * self.cols + c].is_empty()
        })
    }

    /// Returns whether every occupied cell of `shape`, anchored with its top
    /// left at `(row, col)`, lands on an empty in-bounds cell.
    #[must_use]
    pub fn can_place_piece(&self, shape: PieceShape, row: isize, col: isize) -> bool {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return false;
        };
        self.fits(shape, row, col)
    }

    /// Fills the cells covered by `shape` at `(row, col)`.
    ///
    /// The caller must have checked [`can_place_piece`](Self::can_place_piece).
    /// Occupied cells are overwritten; cells that fall outside the grid are
    /// skipped, so the grid itself never grows or wraps.
    pub fn place_piece(
        &mut self,
        shape: PieceShape,
        row: isize,
        col: isize,
        color: PieceColor,
        owner: PieceId,
    ) {
        debug_assert!(
            self.can_place_piece(shape, row, col),
            "place_piece called on an invalid target ({row}, {col})"
        );
        for (dr, dc) in shape.cells() {
            let target = row
                .checked_add_unsigned(dr)
                .zip(col.checked_add_unsigned(dc))
                .and_then(|(r, c)| self.index(r, c));
            if let Some(i) = target {
                self.cells[i].fill(color, owner);
            }
        }
    }

    /// Checked variant of [`place_piece`](Self::place_piece).
    pub fn try_place_piece(
        &mut self,
        shape: PieceShape,
        row: isize,
        col: isize,
        color: PieceColor,
        owner: PieceId,
    ) -> Result<(), PlacementError> {
        if !self.can_place_piece(shape, row, col) {
            return Err(PlacementError::Blocked);
        }
        self.place_piece(shape, row, col, color, owner);
        Ok(())
    }

    fn is_row_complete(&self, row: usize) -> bool {
        self.cells[row * self.cols..][..self.cols]
            .iter()
            .all(|c| c.is_occupied())
    }

    fn is_col_complete(&self, col: usize) -> bool {
        (0..self.rows).all(|row| self.cells[row * self.cols + col].is_occupied())
    }

    /// Returns every fully occupied row and column, in ascending order.
    #[must_use]
    pub fn get_complete_lines(&self) -> CompleteLines {
        CompleteLines {
            rows: (0..self.rows).filter(|&r| self.is_row_complete(r)).collect(),
            cols: (0..self.cols).filter(|&c| self.is_col_complete(c)).collect(),
        }
    }

    /// Empties the listed rows and columns and returns the number of lines
    /// cleared.
    ///
    /// The count is per line, not per cell: a crossing row and column count as
    /// two. Indices outside the grid are ignored and not counted.
    pub fn clear_lines(&mut self, rows: &[usize], cols: &[usize]) -> usize {
        let mut cleared = 0;
        for &row in rows.iter().filter(|&&r| r < self.rows) {
            for cell in &mut self.cells[row * self.cols..][..self.cols] {
                cell.clear();
            }
            cleared += 1;
        }
        for &col in cols.iter().filter(|&&c| c < self.cols) {
            for row in 0..self.rows {
                self.cells[row * self.cols + col].clear();
            }
            cleared += 1;
        }
        cleared
    }

    /// Clears the occupied cells of the 3×3 block around the center and
    /// returns how many were cleared.
    pub fn explode_3x3(&mut self, center_row: isize, center_col: isize) -> usize {
        let mut cleared = 0;
        for (row, col) in BombPiece::blast_area(center_row, center_col) {
            let Some(i) = self.index(row, col) else {
                continue;
            };
            if self.cells[i].is_occupied() {
                self.cells[i].clear();
                cleared += 1;
            }
        }
        cleared
    }

    /// Returns whether the top row holds any block.
    ///
    /// This is a coarse signal kept for compatibility. It can disagree with
    /// [`PieceManager::has_playable_pieces`](crate::PieceManager::has_playable_pieces),
    /// which decides game over.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells[..self.cols].iter().any(|c| c.is_occupied())
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Iterates every anchor `(row, col)` where `shape` can be placed, in
    /// row-major order.
    pub fn valid_positions(&self, shape: PieceShape) -> impl Iterator<Item = (usize, usize)> {
        let max_row = (self.rows + 1).saturating_sub(shape.rows());
        let max_col = (self.cols + 1).saturating_sub(shape.cols());
        (0..max_row)
            .flat_map(move |r| (0..max_col).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.fits(shape, r, c))
    }

    #[must_use]
    pub fn has_valid_placement(&self, shape: PieceShape) -> bool {
        self.valid_positions(shape).next().is_some()
    }

    #[must_use]
    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot(
            self.cell_rows()
                .map(|row| row.iter().map(|c| c.to_data()).collect())
                .collect(),
        )
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BoardSnapshotError> {
        let grid = &snapshot.0;
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(BoardSnapshotError::Empty);
        }
        if rows > Self::MAX_EDGE || cols > Self::MAX_EDGE {
            return Err(BoardSnapshotError::TooLarge { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, line) in grid.iter().enumerate() {
            if line.len() != cols {
                return Err(BoardSnapshotError::Ragged { row: r });
            }
            for (c, data) in line.iter().enumerate() {
                let cell = Cell::try_from(data).map_err(|source| BoardSnapshotError::Cell {
                    row: r,
                    col: c,
                    source,
                })?;
                cells.push(cell);
            }
        }
        Ok(Self { rows, cols, cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cell_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                f.write_str(if cell.is_occupied() { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// Persisted board: one [`CellData`] per cell, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot(pub Vec<Vec<CellData>>);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardSnapshotError {
    #[display("board snapshot has no cells")]
    Empty,
    #[display("board snapshot row {row} has a different width")]
    Ragged { row: usize },
    #[display("board snapshot is {rows}x{cols}, larger than the maximum board")]
    TooLarge { rows: usize, cols: usize },
    #[display("invalid cell at ({row}, {col}): {source}")]
    Cell {
        row: usize,
        col: usize,
        source: CellDataError,
    },
}

impl From<Board> for BoardSnapshot {
    fn from(board: Board) -> Self {
        board.to_snapshot()
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = BoardSnapshotError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        Self::from_snapshot(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PieceColor = PieceColor::from_hex(0xFF_00_00);
    const DOT: PieceShape = PieceShape::from_ascii(&["#"]);
    const L: PieceShape = PieceShape::from_ascii(&["#.", "#.", "##"]);

    fn id(serial: u32) -> PieceId {
        PieceId::new(0x1234, serial)
    }

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert!(Board::new(8, 8).is_ok());
        assert!(Board::new(1, 64).is_ok());
        assert_eq!(
            Board::new(0, 8),
            Err(BoardSizeError {
                rows: 0,
                cols: 8,
                max: 64
            })
        );
        assert!(Board::new(8, 65).is_err());
    }

    #[test]
    fn test_out_of_bounds_access_is_rejected() {
        let board = Board::default();
        assert_eq!(board.cell(0, 0), Some(Cell::Empty));
        assert_eq!(board.cell(7, 7), Some(Cell::Empty));
        assert_eq!(board.cell(-1, 0), None);
        assert_eq!(board.cell(0, -1), None);
        assert_eq!(board.cell(8, 0), None);
        assert_eq!(board.cell(0, 8), None);
        assert!(!board.is_in_bounds(8, 8));
    }

    #[test]
    fn test_can_place_piece_bounds() {
        let board = Board::default();
        assert!(board.can_place_piece(L, 0, 0));
        assert!(board.can_place_piece(L, 5, 6));
        // bottom edge
        assert!(!board.can_place_piece(L, 6, 0));
        // right edge
        assert!(!board.can_place_piece(L, 0, 7));
        assert!(!board.can_place_piece(L, -1, 0));
        assert!(!board.can_place_piece(L, 0, -1));
        assert!(!board.can_place_piece(L, isize::MAX, 0));

        for row in -4..12 {
            for col in -4..12 {
                let inside = (0..=5).contains(&row) && (0..=6).contains(&col);
                assert_eq!(board.can_place_piece(L, row, col), inside, "({row}, {col})");
            }
        }
    }

    #[test]
    fn test_occupied_cell_rejects_placement() {
        let mut board = Board::default();
        board.place_piece(DOT, 3, 3, RED, id(0));
        assert!(!board.can_place_piece(DOT, 3, 3));
        assert!(board.can_place_piece(DOT, 3, 4));
        assert_eq!(
            board.try_place_piece(DOT, 3, 3, RED, id(1)),
            Err(PlacementError::Blocked)
        );
        assert_eq!(board.cell(3, 3).and_then(Cell::owner), Some(id(0)));
    }

    #[test]
    fn test_place_piece_readback() {
        let mut board = Board::default();
        board.place_piece(L, 2, 4, RED, id(5));
        for (dr, dc) in L.cells() {
            let cell = board.cell(2 + dr as isize, 4 + dc as isize).unwrap();
            assert!(cell.is_occupied());
            assert_eq!(cell.color(), Some(RED));
            assert_eq!(cell.owner(), Some(id(5)));
        }
        assert_eq!(board.occupied_count(), 4);
        assert_eq!(board.cell(2, 5), Some(Cell::Empty));
    }

    #[test]
    fn test_row_detection_exact() {
        let mut board = Board::default();
        for col in 0..7 {
            board.place_piece(DOT, 7, col, RED, id(0));
        }
        assert!(board.get_complete_lines().is_empty());

        board.place_piece(DOT, 7, 7, RED, id(1));
        let lines = board.get_complete_lines();
        assert_eq!(lines.rows, [7]);
        assert!(lines.cols.is_empty());
    }

    #[test]
    fn test_intersecting_clear_counts_two() {
        let mut board = Board::from_ascii(&[
            "...#....", //
            "...#....",
            "########",
            "...#....",
            "...#....",
            "...#....",
            "...#...#",
            "...#....",
        ]);
        let lines = board.get_complete_lines();
        assert_eq!(lines.rows, [2]);
        assert_eq!(lines.cols, [3]);
        assert_eq!(lines.len(), 2);

        assert_eq!(board.clear_lines(&lines.rows, &lines.cols), 2);
        assert_eq!(board.cell(2, 3), Some(Cell::Empty));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_clear_lines_ignores_out_of_range() {
        let mut board = Board::from_ascii(&["##", "#."]);
        assert_eq!(board.clear_lines(&[0, 5], &[9]), 1);
        assert_eq!(board.to_string(), "..\n#.");
    }

    #[test]
    fn test_explode_clips_to_board() {
        let mut board = Board::from_ascii(&["########"; 8]);
        assert_eq!(board.explode_3x3(0, 0), 4);
        assert_eq!(board.occupied_count(), 60);
        // already cleared
        assert_eq!(board.explode_3x3(0, 0), 0);
        assert_eq!(board.explode_3x3(4, 4), 9);
        assert_eq!(board.explode_3x3(7, 7), 4);
        assert_eq!(board.explode_3x3(-5, -5), 0);
        assert_eq!(board.explode_3x3(isize::MAX, 0), 0);
        assert_eq!(board.explode_3x3(0, isize::MIN), 0);
        assert_eq!(board.explode_3x3(isize::MIN, isize::MAX), 0);
        assert_eq!(board.occupied_count(), 64 - 4 - 9 - 4);
    }

    #[test]
    fn test_explode_counts_only_occupied_cells() {
        let mut board = Board::from_ascii(&[
            "#.#.", //
            ".#..",
            "#...",
            "....",
        ]);
        assert_eq!(board.explode_3x3(1, 1), 4);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_is_full_checks_top_row_only() {
        let mut board = Board::default();
        assert!(!board.is_full());
        board.place_piece(DOT, 7, 0, RED, id(0));
        assert!(!board.is_full());
        board.place_piece(DOT, 0, 5, RED, id(1));
        assert!(board.is_full());
        // still room below
        assert!(board.has_valid_placement(L));
    }

    #[test]
    fn test_valid_positions() {
        let board = Board::from_ascii(&[
            "...", //
            ".#.",
            "...",
        ]);
        let positions = board.valid_positions(DOT).collect::<Vec<_>>();
        assert_eq!(positions.len(), 8);
        assert!(!positions.contains(&(1, 1)));

        let square = PieceShape::square(2);
        assert!(!board.has_valid_placement(square));
        assert!(!board.has_valid_placement(PieceShape::square(4)));
        assert!(Board::default().has_valid_placement(PieceShape::square(4)));
    }

    #[test]
    fn test_full_board_has_no_valid_placement() {
        let board = Board::from_ascii(&["########"; 8]);
        assert!(!board.has_valid_placement(DOT));
        assert_eq!(board.valid_positions(L).count(), 0);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut board = Board::from_ascii(&["#.#", "###"]);
        board.clear();
        assert_eq!(board.occupied_count(), 0);
        assert_eq!((board.rows(), board.cols()), (2, 3));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut board = Board::new(4, 5).unwrap();
        board.place_piece(L, 1, 2, RED, id(9));

        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
        assert_eq!(restored.cell(3, 3).and_then(Cell::owner), Some(id(9)));
    }

    #[test]
    fn test_snapshot_rejects_invalid_grids() {
        assert_eq!(
            Board::from_snapshot(&BoardSnapshot(vec![])),
            Err(BoardSnapshotError::Empty)
        );

        let row = vec![CellData::default(); 3];
        let ragged = BoardSnapshot(vec![row.clone(), row[..2].to_vec()]);
        assert_eq!(
            Board::from_snapshot(&ragged),
            Err(BoardSnapshotError::Ragged { row: 1 })
        );

        let mut bad = vec![row.clone(), row];
        bad[1][2].occupied = true;
        assert_eq!(
            Board::from_snapshot(&BoardSnapshot(bad)),
            Err(BoardSnapshotError::Cell {
                row: 1,
                col: 2,
                source: CellDataError::Inconsistent,
            })
        );
    }
}

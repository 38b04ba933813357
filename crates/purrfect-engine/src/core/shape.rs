use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Occupancy mask of a piece within its bounding box.
///
/// Shapes are at most 4×4. Cell `(row, col)` is stored at bit `row * 4 + col`
/// of `mask`, so the bounding box is always `rows × cols` with at least one
/// occupied cell.
///
/// # Example
///
/// ```
/// use purrfect_engine::PieceShape;
///
/// let t = PieceShape::from_ascii(&["###", ".#."]);
/// assert_eq!((t.rows(), t.cols()), (2, 3));
/// assert!(t.is_occupied(1, 1));
/// assert!(!t.is_occupied(1, 0));
/// assert_eq!(t.area(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    rows: u8,
    cols: u8,
    mask: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("shape has no occupied cells")]
    Empty,
    #[display("shape is {rows}x{cols}, larger than 4x4")]
    TooLarge { rows: usize, cols: usize },
    #[display("shape rows have different lengths")]
    RaggedRows,
    #[display("invalid character at row {row}, column {col} (expected '#' or '.')")]
    InvalidCell { row: usize, col: usize },
}

impl PieceShape {
    pub const MAX_EDGE: usize = 4;

    /// Parses a shape from rows of `#` (occupied) and `.` (empty).
    #[expect(clippy::cast_possible_truncation)]
    pub const fn try_from_ascii(rows: &[&str]) -> Result<Self, ShapeError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(ShapeError::Empty);
        }
        let height = rows.len();
        let width = rows[0].len();
        if height > Self::MAX_EDGE || width > Self::MAX_EDGE {
            return Err(ShapeError::TooLarge {
                rows: height,
                cols: width,
            });
        }

        let mut mask = 0;
        let mut r = 0;
        while r < height {
            let bytes = rows[r].as_bytes();
            if bytes.len() != width {
                return Err(ShapeError::RaggedRows);
            }
            let mut c = 0;
            while c < width {
                match bytes[c] {
                    b'#' => mask |= 1 << (r * Self::MAX_EDGE + c),
                    b'.' => {}
                    _ => return Err(ShapeError::InvalidCell { row: r, col: c }),
                }
                c += 1;
            }
            r += 1;
        }
        if mask == 0 {
            return Err(ShapeError::Empty);
        }

        Ok(Self {
            rows: height as u8,
            cols: width as u8,
            mask,
        })
    }

    /// Parses a shape from ASCII rows, panicking on malformed input.
    ///
    /// Intended for constant tables and tests.
    #[must_use]
    pub const fn from_ascii(rows: &[&str]) -> Self {
        match Self::try_from_ascii(rows) {
            Ok(shape) => shape,
            Err(_) => panic!("invalid piece shape"),
        }
    }

    /// Fully occupied `size × size` square.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn square(size: usize) -> Self {
        assert!(size >= 1 && size <= Self::MAX_EDGE);
        let mut mask = 0;
        let mut r = 0;
        while r < size {
            let mut c = 0;
            while c < size {
                mask |= 1 << (r * Self::MAX_EDGE + c);
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: size as u8,
            cols: size as u8,
            mask,
        }
    }

    /// Returns the shape turned 90° clockwise.
    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        let rows = self.rows as usize;
        let cols = self.cols as usize;
        let mut mask = 0;
        // new (r, c) takes old (rows - 1 - c, r); new box is cols × rows
        let mut r = 0;
        while r < cols {
            let mut c = 0;
            while c < rows {
                if self.is_occupied(rows - 1 - c, r) {
                    mask |= 1 << (r * Self::MAX_EDGE + c);
                }
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            mask,
        }
    }

    #[must_use]
    pub const fn rows(self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(self) -> usize {
        self.cols as usize
    }

    /// Returns whether `(row, col)` is occupied. Out-of-box positions are empty.
    #[must_use]
    pub const fn is_occupied(self, row: usize, col: usize) -> bool {
        row < self.rows as usize
            && col < self.cols as usize
            && (self.mask & (1 << (row * Self::MAX_EDGE + col))) != 0
    }

    /// Iterates the occupied cells as `(row, col)` offsets in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols();
        (0..self.rows())
            .flat_map(move |r| (0..cols).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.is_occupied(r, c))
    }

    #[must_use]
    pub const fn area(self) -> usize {
        self.mask.count_ones() as usize
    }

    #[must_use]
    pub fn to_ascii(self) -> Vec<String> {
        (0..self.rows())
            .map(|r| {
                (0..self.cols())
                    .map(|c| if self.is_occupied(r, c) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for PieceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.to_ascii().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

impl Serialize for PieceShape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_ascii().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PieceShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        let rows = rows.iter().map(String::as_str).collect::<Vec<_>>();
        Self::try_from_ascii(&rows).map_err(serde::de::Error::custom)
    }
}

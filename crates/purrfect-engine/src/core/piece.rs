use std::ops::Deref;

use arrayvec::ArrayVec;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

use super::{
    cell::{PieceColor, PieceId},
    shape::PieceShape,
};

/// Family a catalog shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize)]
pub enum ShapeCategory {
    L,
    I,
    F,
    T,
    Square,
    Bomb,
}

/// Rotation of a catalog variant, serialized as degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid rotation {degrees}: expected 0, 90, 180 or 270")]
pub struct RotationError {
    degrees: u16,
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = RotationError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees).ok_or(RotationError { degrees })
    }
}

/// Immutable description of a placeable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceDefinition {
    pub category: ShapeCategory,
    pub shape: PieceShape,
    pub color: PieceColor,
    pub rotation: Rotation,
    /// Edge length for squares and bombs, 0 for tetromino variants.
    pub size: u8,
}

const ESPRESSO: PieceColor = PieceColor::from_hex(0x3E_27_23);
const BURNT_ORANGE: PieceColor = PieceColor::from_hex(0xD8_43_15);
const MOCHA: PieceColor = PieceColor::from_hex(0x6D_4C_41);
const CARAMEL: PieceColor = PieceColor::from_hex(0xA1_88_7F);
const LATTE: PieceColor = PieceColor::from_hex(0xBC_AA_A4);
const SADDLE_BROWN: PieceColor = PieceColor::from_hex(0x8B_45_13);

/// Generates the four clockwise rotations of a tetromino, starting at 0°.
const fn tetromino_rotations(
    category: ShapeCategory,
    color: PieceColor,
    base: PieceShape,
) -> [PieceDefinition; 4] {
    let mut defs = [PieceDefinition {
        category,
        shape: base,
        color,
        rotation: Rotation::Deg0,
        size: 0,
    }; 4];
    let mut i = 1;
    while i < 4 {
        defs[i].shape = defs[i - 1].shape.rotated_clockwise();
        defs[i].rotation = Rotation::ALL[i];
        i += 1;
    }
    defs
}

/// Every non-bomb piece that can appear in the panel.
///
/// Order: L, I, F and T tetrominoes at 0°/90°/180°/270°, then solid squares
/// of edge 1 to 4. Some rotations are visually identical (I at 0° and 180°)
/// but remain separate entries.
pub const PIECE_CATALOG: [PieceDefinition; 20] = {
    const L: [PieceDefinition; 4] = tetromino_rotations(
        ShapeCategory::L,
        ESPRESSO,
        PieceShape::from_ascii(&["#.", "#.", "##"]),
    );
    const I: [PieceDefinition; 4] = tetromino_rotations(
        ShapeCategory::I,
        BURNT_ORANGE,
        PieceShape::from_ascii(&["#", "#", "#", "#"]),
    );
    const F: [PieceDefinition; 4] = tetromino_rotations(
        ShapeCategory::F,
        MOCHA,
        PieceShape::from_ascii(&[".##", "##."]),
    );
    const T: [PieceDefinition; 4] = tetromino_rotations(
        ShapeCategory::T,
        CARAMEL,
        PieceShape::from_ascii(&["###", ".#."]),
    );
    const fn square(size: u8) -> PieceDefinition {
        PieceDefinition {
            category: ShapeCategory::Square,
            shape: PieceShape::square(size as usize),
            color: LATTE,
            rotation: Rotation::Deg0,
            size,
        }
    }
    [
        L[0], L[1], L[2], L[3],
        I[0], I[1], I[2], I[3],
        F[0], F[1], F[2], F[3],
        T[0], T[1], T[2], T[3],
        square(1), square(2), square(3), square(4),
    ]
};

/// Definition shared by every bomb (the yarn ball).
pub const BOMB_DEFINITION: PieceDefinition = PieceDefinition {
    category: ShapeCategory::Bomb,
    shape: PieceShape::from_ascii(&["#"]),
    color: SADDLE_BROWN,
    rotation: Rotation::Deg0,
    size: 1,
};

/// Index into [`PIECE_CATALOG`], valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogIndex(usize);

impl CatalogIndex {
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < PIECE_CATALOG.len() {
            Some(Self(index))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn definition(self) -> &'static PieceDefinition {
        let catalog: &'static [PieceDefinition] = &PIECE_CATALOG;
        &catalog[self.0]
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..PIECE_CATALOG.len()).map(Self)
    }
}

impl Distribution<CatalogIndex> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> CatalogIndex {
        CatalogIndex(rng.random_range(0..PIECE_CATALOG.len()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Catalog(CatalogIndex),
    Bomb,
}

impl PieceKind {
    #[must_use]
    pub const fn definition(self) -> &'static PieceDefinition {
        match self {
            PieceKind::Catalog(index) => index.definition(),
            PieceKind::Bomb => &BOMB_DEFINITION,
        }
    }
}

/// A placeable piece instance.
///
/// Pieces are immutable values: a panel slot is refilled with a new piece
/// rather than mutated.
///
/// # Example
///
/// ```
/// use purrfect_engine::{CatalogIndex, Piece, PieceId, PieceKind};
///
/// let index = CatalogIndex::new(19).unwrap();
/// let piece = Piece::new(PieceId::new(1, 0), PieceKind::Catalog(index));
/// assert_eq!((piece.width(), piece.height()), (4, 4));
/// assert!(!piece.is_bomb());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(id: PieceId, kind: PieceKind) -> Self {
        Self { id, kind }
    }

    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn definition(&self) -> &'static PieceDefinition {
        self.kind.definition()
    }

    #[must_use]
    pub const fn shape(&self) -> PieceShape {
        self.definition().shape
    }

    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.definition().color
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.shape().cols()
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.shape().rows()
    }

    #[must_use]
    pub const fn is_bomb(&self) -> bool {
        matches!(self.kind, PieceKind::Bomb)
    }

    #[must_use]
    pub const fn as_bomb(&self) -> Option<BombPiece> {
        if self.is_bomb() {
            Some(BombPiece(*self))
        } else {
            None
        }
    }
}

/// A 1×1 piece that clears a 3×3 area instead of occupying a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BombPiece(Piece);

impl BombPiece {
    #[must_use]
    pub const fn new(id: PieceId) -> Self {
        Self(Piece::new(id, PieceKind::Bomb))
    }

    #[must_use]
    pub const fn into_piece(self) -> Piece {
        self.0
    }

    /// The 3×3 block centered on `(center_row, center_col)` in row-major
    /// order. Coordinates are not clipped to any board; cells that fall
    /// outside the `isize` range are left out.
    #[must_use]
    pub fn blast_area(center_row: isize, center_col: isize) -> ArrayVec<(isize, isize), 9> {
        let mut cells = ArrayVec::new();
        for dr in -1..=1 {
            for dc in -1..=1 {
                if let (Some(row), Some(col)) =
                    (center_row.checked_add(dr), center_col.checked_add(dc))
                {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    #[must_use]
    pub fn explosion_cells(
        &self,
        center_row: isize,
        center_col: isize,
    ) -> ArrayVec<(isize, isize), 9> {
        Self::blast_area(center_row, center_col)
    }
}

impl Deref for BombPiece {
    type Target = Piece;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BombPiece> for Piece {
    fn from(bomb: BombPiece) -> Self {
        bomb.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(rows: &[&str]) -> PieceShape {
        PieceShape::from_ascii(rows)
    }

    #[test]
    fn test_catalog_shapes() {
        let expected: [(&[&str], ShapeCategory, Rotation); 16] = [
            (&["#.", "#.", "##"], ShapeCategory::L, Rotation::Deg0),
            (&["###", "#.."], ShapeCategory::L, Rotation::Deg90),
            (&["##", ".#", ".#"], ShapeCategory::L, Rotation::Deg180),
            (&["..#", "###"], ShapeCategory::L, Rotation::Deg270),
            (&["#", "#", "#", "#"], ShapeCategory::I, Rotation::Deg0),
            (&["####"], ShapeCategory::I, Rotation::Deg90),
            (&["#", "#", "#", "#"], ShapeCategory::I, Rotation::Deg180),
            (&["####"], ShapeCategory::I, Rotation::Deg270),
            (&[".##", "##."], ShapeCategory::F, Rotation::Deg0),
            (&["#.", "##", ".#"], ShapeCategory::F, Rotation::Deg90),
            (&[".##", "##."], ShapeCategory::F, Rotation::Deg180),
            (&["#.", "##", ".#"], ShapeCategory::F, Rotation::Deg270),
            (&["###", ".#."], ShapeCategory::T, Rotation::Deg0),
            (&[".#", "##", ".#"], ShapeCategory::T, Rotation::Deg90),
            (&[".#.", "###"], ShapeCategory::T, Rotation::Deg180),
            (&["#.", "##", "#."], ShapeCategory::T, Rotation::Deg270),
        ];
        for (i, (rows, category, rotation)) in expected.into_iter().enumerate() {
            let def = &PIECE_CATALOG[i];
            assert_eq!(def.shape, shape(rows), "catalog entry {i}");
            assert_eq!(def.category, category, "catalog entry {i}");
            assert_eq!(def.rotation, rotation, "catalog entry {i}");
            assert_eq!(def.size, 0, "catalog entry {i}");
            assert_eq!(def.shape.area(), 4, "catalog entry {i}");
        }

        for (size, def) in (1..=4).zip(&PIECE_CATALOG[16..]) {
            assert_eq!(def.category, ShapeCategory::Square);
            assert_eq!(def.shape, PieceShape::square(usize::from(size)));
            assert_eq!(def.size, size);
            assert_eq!(def.color, LATTE);
        }
    }

    #[test]
    fn test_catalog_colors() {
        let colors = [ESPRESSO, BURNT_ORANGE, MOCHA, CARAMEL];
        for (i, def) in PIECE_CATALOG[..16].iter().enumerate() {
            assert_eq!(def.color, colors[i / 4], "catalog entry {i}");
        }
        assert_eq!(ESPRESSO.to_string(), "#3E2723");
        assert_eq!(BOMB_DEFINITION.color.to_string(), "#8B4513");
    }

    #[test]
    fn test_catalog_index_bounds() {
        assert!(CatalogIndex::new(0).is_some());
        assert!(CatalogIndex::new(19).is_some());
        assert!(CatalogIndex::new(20).is_none());
        assert_eq!(CatalogIndex::all().count(), PIECE_CATALOG.len());
    }

    #[test]
    fn test_piece_accessors() {
        let id = PieceId::new(7, 1);
        let piece = Piece::new(id, PieceKind::Catalog(CatalogIndex(1)));
        assert_eq!(piece.id(), id);
        assert_eq!(piece.shape(), shape(&["###", "#.."]));
        assert_eq!(piece.width(), 3);
        assert_eq!(piece.height(), 2);
        assert_eq!(piece.color(), ESPRESSO);
        assert!(!piece.is_bomb());
        assert!(piece.as_bomb().is_none());
    }

    #[test]
    fn test_bomb_piece() {
        let bomb = BombPiece::new(PieceId::new(7, 2));
        assert!(bomb.is_bomb());
        assert_eq!(bomb.width(), 1);
        assert_eq!(bomb.height(), 1);
        assert_eq!(bomb.definition().size, 1);
        assert_eq!(bomb.into_piece().as_bomb(), Some(bomb));
    }

    #[test]
    fn test_blast_area_skips_overflowing_cells() {
        assert_eq!(
            BombPiece::blast_area(isize::MAX, isize::MAX).as_slice(),
            [
                (isize::MAX - 1, isize::MAX - 1),
                (isize::MAX - 1, isize::MAX),
                (isize::MAX, isize::MAX - 1),
                (isize::MAX, isize::MAX),
            ]
        );
        assert_eq!(BombPiece::blast_area(0, isize::MIN).len(), 6);
    }

    #[test]
    fn test_explosion_cells_are_unclipped_row_major() {
        let bomb = BombPiece::new(PieceId::new(0, 0));
        let cells = bomb.explosion_cells(0, 0);
        assert_eq!(
            cells.as_slice(),
            [
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 0),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ]
        );
    }

    #[test]
    fn test_rotation_serde() {
        assert_eq!(serde_json::to_string(&Rotation::Deg270).unwrap(), "270");
        assert_eq!(
            serde_json::from_str::<Rotation>("90").unwrap(),
            Rotation::Deg90
        );
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display color of a piece, stored as 24-bit RGB.
///
/// Colors travel through snapshots as `"#RRGGBB"` strings.
///
/// ```
/// use purrfect_engine::PieceColor;
///
/// let color: PieceColor = "#3e2723".parse().unwrap();
/// assert_eq!(color, PieceColor::from_hex(0x3E2723));
/// assert_eq!(color.to_string(), "#3E2723");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceColor {
    r: u8,
    g: u8,
    b: u8,
}

impl PieceColor {
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal. Bits above 24 are ignored.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid color {input:?}: expected \"#RRGGBB\"")]
pub struct ParseColorError {
    input: String,
}

impl FromStr for PieceColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_owned(),
        };
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        Ok(Self::from_hex(value))
    }
}

impl Serialize for PieceColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a single piece instance.
///
/// `tag` is drawn once per [`PieceFactory`](crate::PieceFactory) and `serial`
/// counts the pieces it has created, so a factory never hands out the same id
/// twice. The text form is `"{tag:08x}-{serial}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    tag: u32,
    serial: u32,
}

impl PieceId {
    #[must_use]
    pub const fn new(tag: u32, serial: u32) -> Self {
        Self { tag, serial }
    }

    #[must_use]
    pub const fn tag(self) -> u32 {
        self.tag
    }

    #[must_use]
    pub const fn serial(self) -> u32 {
        self.serial
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}-{}", self.tag, self.serial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece id {input:?}: expected \"<8 hex digits>-<serial>\"")]
pub struct ParsePieceIdError {
    input: String,
}

impl FromStr for PieceId {
    type Err = ParsePieceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceIdError {
            input: s.to_owned(),
        };
        let (tag, serial) = s.split_once('-').ok_or_else(err)?;
        if tag.len() != 8 || !tag.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        if serial.is_empty() || !serial.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let tag = u32::from_str_radix(tag, 16).map_err(|_| err())?;
        let serial = serial.parse().map_err(|_| err())?;
        Ok(Self { tag, serial })
    }
}

impl Serialize for PieceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single grid slot.
///
/// A filled cell always knows which piece filled it and with what color; an
/// empty cell carries neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled { color: PieceColor, owner: PieceId },
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<PieceColor> {
        match self {
            Cell::Empty => None,
            Cell::Filled { color, .. } => Some(color),
        }
    }

    #[must_use]
    pub fn owner(self) -> Option<PieceId> {
        match self {
            Cell::Empty => None,
            Cell::Filled { owner, .. } => Some(owner),
        }
    }

    pub fn fill(&mut self, color: PieceColor, owner: PieceId) {
        *self = Cell::Filled { color, owner };
    }

    pub fn clear(&mut self) {
        *self = Cell::Empty;
    }

    #[must_use]
    pub fn to_data(self) -> CellData {
        CellData {
            occupied: self.is_occupied(),
            color: self.color().map(|c| c.to_string()),
            piece_id: self.owner().map(|id| id.to_string()),
        }
    }
}

/// Persisted form of a [`Cell`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub occupied: bool,
    pub color: Option<String>,
    pub piece_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CellDataError {
    #[display("occupied flag disagrees with color/owner presence")]
    #[from(ignore)]
    Inconsistent,
    #[display("{_0}")]
    Color(ParseColorError),
    #[display("{_0}")]
    PieceId(ParsePieceIdError),
}

impl TryFrom<&CellData> for Cell {
    type Error = CellDataError;

    fn try_from(data: &CellData) -> Result<Self, Self::Error> {
        match (data.occupied, &data.color, &data.piece_id) {
            (false, None, None) => Ok(Cell::Empty),
            (true, Some(color), Some(owner)) => Ok(Cell::Filled {
                color: color.parse()?,
                owner: owner.parse()?,
            }),
            _ => Err(CellDataError::Inconsistent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PieceColor = PieceColor::from_hex(0xFF0000);

    #[test]
    fn test_new_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.color(), None);
        assert_eq!(cell.owner(), None);
    }

    #[test]
    fn test_fill_and_clear() {
        let mut cell = Cell::default();
        let id = PieceId::new(0xabcd, 3);

        cell.fill(RED, id);
        assert!(cell.is_occupied());
        assert_eq!(cell.color(), Some(RED));
        assert_eq!(cell.owner(), Some(id));

        cell.clear();
        assert!(cell.is_empty());
        assert_eq!(cell.color(), None);
        assert_eq!(cell.owner(), None);
    }

    #[test]
    fn test_color_parse_and_display() {
        assert_eq!("#8B4513".parse::<PieceColor>(), Ok(PieceColor::from_rgb(0x8B, 0x45, 0x13)));
        assert_eq!(PieceColor::from_hex(0x00_0A_FF).to_string(), "#000AFF");

        assert!("8B4513".parse::<PieceColor>().is_err());
        assert!("#8B451".parse::<PieceColor>().is_err());
        assert!("#8B45133".parse::<PieceColor>().is_err());
        assert!("#+B4513".parse::<PieceColor>().is_err());
        assert!("#GGGGGG".parse::<PieceColor>().is_err());
    }

    #[test]
    fn test_piece_id_parse_and_display() {
        let id = PieceId::new(0x0012_abcd, 42);
        assert_eq!(id.to_string(), "0012abcd-42");
        assert_eq!("0012abcd-42".parse::<PieceId>(), Ok(id));

        assert!("0012abcd".parse::<PieceId>().is_err());
        assert!("12abcd-42".parse::<PieceId>().is_err());
        assert!("0012abcd-".parse::<PieceId>().is_err());
        assert!("0012abcd-+4".parse::<PieceId>().is_err());
        assert!("0012abcd-99999999999".parse::<PieceId>().is_err());
    }

    #[test]
    fn test_cell_data_conversion() {
        let id = PieceId::new(1, 2);
        let filled = Cell::Filled { color: RED, owner: id };

        let data = filled.to_data();
        assert_eq!(
            data,
            CellData {
                occupied: true,
                color: Some("#FF0000".to_owned()),
                piece_id: Some("00000001-2".to_owned()),
            }
        );
        assert_eq!(Cell::try_from(&data), Ok(filled));

        let empty = Cell::Empty.to_data();
        assert_eq!(empty, CellData::default());
        assert_eq!(Cell::try_from(&empty), Ok(Cell::Empty));
    }

    #[test]
    fn test_cell_data_rejects_inconsistent_state() {
        let occupied_without_color = CellData {
            occupied: true,
            color: None,
            piece_id: Some("00000001-2".to_owned()),
        };
        assert_eq!(
            Cell::try_from(&occupied_without_color),
            Err(CellDataError::Inconsistent)
        );

        let empty_with_owner = CellData {
            occupied: false,
            color: None,
            piece_id: Some("00000001-2".to_owned()),
        };
        assert_eq!(
            Cell::try_from(&empty_with_owner),
            Err(CellDataError::Inconsistent)
        );

        let bad_color = CellData {
            occupied: true,
            color: Some("red".to_owned()),
            piece_id: Some("00000001-2".to_owned()),
        };
        assert!(matches!(
            Cell::try_from(&bad_color),
            Err(CellDataError::Color(_))
        ));
    }

    #[test]
    fn test_serde_as_strings() {
        let json = serde_json::to_string(&PieceColor::from_hex(0x3E2723)).unwrap();
        assert_eq!(json, "\"#3E2723\"");
        let id: PieceId = serde_json::from_str("\"deadbeef-7\"").unwrap();
        assert_eq!(id, PieceId::new(0xdead_beef, 7));
        assert!(serde_json::from_str::<PieceId>("\"nope\"").is_err());
    }
}

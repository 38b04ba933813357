use serde::{Deserialize, Serialize};

use crate::core::{
    BoardSnapshot, BoardSnapshotError, CatalogIndex, Piece, PieceColor, PieceId, PieceKind,
    PieceShape,
};

use super::piece_manager::{BombSchedule, PieceManager};

/// Everything needed to resume a game, minus the random stream.
///
/// The engine only builds and validates snapshots; reading and writing them
/// is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    pub score: ScoreSnapshot,
    pub panel: Vec<PieceSnapshot>,
    pub bomb_schedule: BombSchedule,
    pub turn: usize,
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub score: usize,
    pub streak_level: usize,
    pub total_lines_cleared: usize,
    #[serde(default)]
    pub best_streak: usize,
    #[serde(default)]
    pub bombs_exploded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PieceKindSnapshot {
    Catalog { index: usize },
    Bomb,
}

/// Persisted panel piece.
///
/// Shape and color are stored for readers that do not know the catalog, and
/// are checked against it on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub kind: PieceKindSnapshot,
    pub shape: PieceShape,
    pub color: PieceColor,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SnapshotError {
    #[display("{_0}")]
    #[from]
    Board(BoardSnapshotError),
    #[display("panel has {len} pieces, expected 3")]
    PanelSize { len: usize },
    #[display("unknown catalog index {index}")]
    UnknownCatalogIndex { index: usize },
    #[display("piece {id} does not match its catalog definition")]
    DefinitionMismatch { id: PieceId },
    #[display("invalid bomb schedule ({since} of {until} turns)")]
    InvalidBombSchedule { since: u32, until: u32 },
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        let kind = match piece.kind() {
            PieceKind::Catalog(index) => PieceKindSnapshot::Catalog { index: index.get() },
            PieceKind::Bomb => PieceKindSnapshot::Bomb,
        };
        Self {
            id: piece.id(),
            kind,
            shape: piece.shape(),
            color: piece.color(),
        }
    }
}

impl TryFrom<&PieceSnapshot> for Piece {
    type Error = SnapshotError;

    fn try_from(snapshot: &PieceSnapshot) -> Result<Self, Self::Error> {
        let kind = match snapshot.kind {
            PieceKindSnapshot::Catalog { index } => PieceKind::Catalog(
                CatalogIndex::new(index).ok_or(SnapshotError::UnknownCatalogIndex { index })?,
            ),
            PieceKindSnapshot::Bomb => PieceKind::Bomb,
        };
        let piece = Piece::new(snapshot.id, kind);
        if piece.shape() != snapshot.shape || piece.color() != snapshot.color {
            return Err(SnapshotError::DefinitionMismatch { id: snapshot.id });
        }
        Ok(piece)
    }
}

pub(crate) fn panel_from_snapshot(
    panel: &[PieceSnapshot],
) -> Result<[Piece; PieceManager::PANEL_SIZE], SnapshotError> {
    let pieces = panel
        .iter()
        .map(Piece::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    pieces
        .try_into()
        .map_err(|_| SnapshotError::PanelSize { len: panel.len() })
}

pub(crate) fn check_bomb_schedule(schedule: BombSchedule) -> Result<(), SnapshotError> {
    if schedule.is_valid() {
        Ok(())
    } else {
        Err(SnapshotError::InvalidBombSchedule {
            since: schedule.turns_since_last_bomb(),
            until: schedule.turns_until_next_bomb(),
        })
    }
}

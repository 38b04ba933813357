pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece index {index} is out of range (catalog has {len} entries)")]
pub struct InvalidPieceIndexError {
    pub index: usize,
    pub len: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum PlacementError {
    #[display("piece does not fit at the requested position")]
    Blocked,
    #[display("panel slot {index} does not exist")]
    InvalidSlot { index: usize },
    #[display("game is already over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid board size {rows}x{cols}: each side must be between 1 and {max}")]
pub struct BoardSizeError {
    pub rows: usize,
    pub cols: usize,
    pub max: usize,
}

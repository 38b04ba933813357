use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    InvalidPieceIndexError,
    core::{BombPiece, CatalogIndex, PIECE_CATALOG, Piece, PieceId, PieceKind},
};

use super::seed::GameSeed;

/// Creates piece instances from the catalog.
///
/// Each factory owns its random generator and an id tag drawn from it, so
/// factories never share state and never reuse a [`PieceId`].
///
/// Bombs are only produced on request; [`PieceManager`](crate::PieceManager)
/// decides when a bomb enters the panel.
#[derive(Debug, Clone)]
pub struct PieceFactory {
    rng: Pcg32,
    seed: GameSeed,
    tag: u32,
    next_serial: u32,
}

impl Default for PieceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceFactory {
    /// Creates a factory seeded from OS entropy.
    ///
    /// For a reproducible piece sequence, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: GameSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.to_bytes());
        let tag = rng.random();
        Self {
            rng,
            seed,
            tag,
            next_serial: 0,
        }
    }

    #[must_use]
    pub fn seed(&self) -> GameSeed {
        self.seed
    }

    #[must_use]
    pub fn catalog_len(&self) -> usize {
        PIECE_CATALOG.len()
    }

    fn next_id(&mut self) -> PieceId {
        let id = PieceId::new(self.tag, self.next_serial);
        self.next_serial = self.next_serial.wrapping_add(1);
        id
    }

    /// Uniform pick across the whole catalog.
    pub fn create_random_piece(&mut self) -> Piece {
        let index: CatalogIndex = self.rng.random();
        let id = self.next_id();
        Piece::new(id, PieceKind::Catalog(index))
    }

    pub fn create_piece_by_index(&mut self, index: usize) -> Result<Piece, InvalidPieceIndexError> {
        let index = CatalogIndex::new(index).ok_or(InvalidPieceIndexError {
            index,
            len: PIECE_CATALOG.len(),
        })?;
        Ok(Piece::new(self.next_id(), PieceKind::Catalog(index)))
    }

    pub fn create_bomb_piece(&mut self) -> BombPiece {
        BombPiece::new(self.next_id())
    }

    /// Draws `count` independent random pieces. Never includes a bomb.
    pub fn create_multiple_pieces(&mut self, count: usize) -> Vec<Piece> {
        (0..count).map(|_| self.create_random_piece()).collect()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Makes sure ids handed out from now on differ from `id`.
    ///
    /// Used after restoring pieces that carry ids from a previous game.
    pub(crate) fn skip_ids_through(&mut self, id: PieceId) {
        if id.tag() == self.tag && id.serial() >= self.next_serial {
            self.next_serial = id.serial().wrapping_add(1);
        }
    }
}

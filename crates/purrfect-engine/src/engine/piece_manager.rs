use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece};

use super::{piece_factory::PieceFactory, seed::GameSeed};

/// Turn counter that decides when the next bomb enters the panel.
///
/// `turns_until_next_bomb` is redrawn only when a bomb is scheduled, so the
/// gap between two bombs always stays within
/// [`PieceManager::BOMB_INTERVAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombSchedule {
    turns_since_last_bomb: u32,
    turns_until_next_bomb: u32,
}

impl BombSchedule {
    fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            turns_since_last_bomb: 0,
            turns_until_next_bomb: rng.random_range(PieceManager::BOMB_INTERVAL),
        }
    }

    /// Counts one consumption and reports whether it earns a bomb.
    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.turns_since_last_bomb += 1;
        if self.turns_since_last_bomb >= self.turns_until_next_bomb {
            *self = Self::draw(rng);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn turns_since_last_bomb(&self) -> u32 {
        self.turns_since_last_bomb
    }

    #[must_use]
    pub fn turns_until_next_bomb(&self) -> u32 {
        self.turns_until_next_bomb
    }

    /// Returns whether the threshold is in range and not yet reached.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        PieceManager::BOMB_INTERVAL.contains(&self.turns_until_next_bomb)
            && self.turns_since_last_bomb < self.turns_until_next_bomb
    }
}

/// The panel of selectable pieces.
///
/// Every slot always holds a live piece. Consuming a slot refills it right
/// away, with a bomb once every 3 to 5 consumptions.
///
/// # Example
///
/// ```
/// use purrfect_engine::{Board, GameSeed, PieceManager};
///
/// let mut manager = PieceManager::with_seed(GameSeed::from(7));
/// let board = Board::default();
///
/// let first = manager.select_piece(0).unwrap();
/// let consumed = manager.consume_piece(0).unwrap();
/// assert_eq!(first, consumed);
/// assert_ne!(manager.pieces()[0], consumed);
/// assert!(manager.has_playable_pieces(&board));
/// ```
#[derive(Debug, Clone)]
pub struct PieceManager {
    factory: PieceFactory,
    panel: [Piece; PieceManager::PANEL_SIZE],
    schedule: BombSchedule,
    selected: Option<usize>,
}

impl Default for PieceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceManager {
    pub const PANEL_SIZE: usize = 3;
    pub const BOMB_INTERVAL: RangeInclusive<u32> = 3..=5;

    #[must_use]
    pub fn new() -> Self {
        Self::from_factory(PieceFactory::new())
    }

    #[must_use]
    pub fn with_seed(seed: GameSeed) -> Self {
        Self::from_factory(PieceFactory::with_seed(seed))
    }

    fn from_factory(mut factory: PieceFactory) -> Self {
        let panel = std::array::from_fn(|_| factory.create_random_piece());
        let schedule = BombSchedule::draw(factory.rng_mut());
        Self {
            factory,
            panel,
            schedule,
            selected: None,
        }
    }

    /// Rebuilds a manager around a restored panel.
    ///
    /// Future ids are kept clear of the restored pieces' ids.
    pub(crate) fn restore(
        mut factory: PieceFactory,
        panel: [Piece; Self::PANEL_SIZE],
        schedule: BombSchedule,
    ) -> Self {
        for piece in &panel {
            factory.skip_ids_through(piece.id());
        }
        Self {
            factory,
            panel,
            schedule,
            selected: None,
        }
    }

    #[must_use]
    pub fn pieces(&self) -> &[Piece; Self::PANEL_SIZE] {
        &self.panel
    }

    #[must_use]
    pub fn piece(&self, index: usize) -> Option<Piece> {
        self.panel.get(index).copied()
    }

    #[must_use]
    pub fn factory(&self) -> &PieceFactory {
        &self.factory
    }

    #[must_use]
    pub fn bomb_schedule(&self) -> BombSchedule {
        self.schedule
    }

    /// Returns the piece at `index` and marks it as selected.
    ///
    /// An out-of-range index returns `None` and leaves the selection as is.
    pub fn select_piece(&mut self, index: usize) -> Option<Piece> {
        let piece = self.piece(index)?;
        self.selected = Some(index);
        Some(piece)
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Removes the piece at `index` and refills the slot.
    ///
    /// The refill is a bomb when the schedule fires, otherwise a random
    /// catalog piece. An out-of-range index is a no-op returning `None`.
    pub fn consume_piece(&mut self, index: usize) -> Option<Piece> {
        if index >= Self::PANEL_SIZE {
            return None;
        }
        let refill = if self.schedule.tick(self.factory.rng_mut()) {
            self.factory.create_bomb_piece().into_piece()
        } else {
            self.factory.create_random_piece()
        };
        self.selected = None;
        Some(std::mem::replace(&mut self.panel[index], refill))
    }

    /// Returns whether any panel piece fits anywhere on `board`.
    ///
    /// This is the game-over test: it scans every anchor for every piece.
    #[must_use]
    pub fn has_playable_pieces(&self, board: &Board) -> bool {
        self.panel
            .iter()
            .any(|piece| board.has_valid_placement(piece.shape()))
    }

    /// Refills every slot and restarts the bomb schedule.
    ///
    /// The random stream continues from where it was.
    pub fn reset(&mut self) {
        for slot in &mut self.panel {
            *slot = self.factory.create_random_piece();
        }
        self.schedule = BombSchedule::draw(self.factory.rng_mut());
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PieceManager {
        PieceManager::with_seed(GameSeed::from(0x5eed))
    }

    #[test]
    fn test_initial_panel_has_no_bombs() {
        for seed in 0..20_u128 {
            let manager = PieceManager::with_seed(GameSeed::from(seed));
            assert!(manager.pieces().iter().all(|p| !p.is_bomb()));
            assert!(manager.bomb_schedule().is_valid());
            assert_eq!(manager.bomb_schedule().turns_since_last_bomb(), 0);
        }
    }

    #[test]
    fn test_select_piece() {
        let mut manager = manager();
        assert_eq!(manager.selected_index(), None);

        let piece = manager.select_piece(1);
        assert_eq!(piece, Some(manager.pieces()[1]));
        assert_eq!(manager.selected_index(), Some(1));

        let before = *manager.pieces();
        assert_eq!(manager.select_piece(3), None);
        assert_eq!(manager.selected_index(), Some(1));
        assert_eq!(*manager.pieces(), before);

        manager.clear_selection();
        assert_eq!(manager.selected_index(), None);
    }

    #[test]
    fn test_consume_piece_refills_slot() {
        let mut manager = manager();
        let before = *manager.pieces();
        manager.select_piece(2);

        let consumed = manager.consume_piece(2);
        assert_eq!(consumed, Some(before[2]));
        assert_ne!(manager.pieces()[2].id(), before[2].id());
        assert_eq!(manager.pieces()[..2], before[..2]);
        assert_eq!(manager.selected_index(), None);
    }

    #[test]
    fn test_consume_out_of_range_is_noop() {
        let mut manager = manager();
        let before = *manager.pieces();
        let schedule = manager.bomb_schedule();
        assert_eq!(manager.consume_piece(3), None);
        assert_eq!(*manager.pieces(), before);
        assert_eq!(manager.bomb_schedule(), schedule);
    }

    #[test]
    fn test_bomb_gap_stays_in_range() {
        for seed in 0..10_u128 {
            let mut manager = PieceManager::with_seed(GameSeed::from(seed));
            let mut last_bomb = 0;
            let mut bombs = 0;
            for turn in 1..=300 {
                manager.consume_piece(turn % PieceManager::PANEL_SIZE);
                assert!(manager.bomb_schedule().is_valid());
                let slot = manager.pieces()[turn % PieceManager::PANEL_SIZE];
                if slot.is_bomb() {
                    let gap = turn - last_bomb;
                    assert!(
                        (3..=5).contains(&gap),
                        "seed {seed}: bomb after {gap} consumptions"
                    );
                    last_bomb = turn;
                    bombs += 1;
                }
            }
            assert!(bombs >= 300 / 5);
        }
    }

    #[test]
    fn test_full_board_has_no_playable_pieces() {
        let board = Board::from_ascii(&["########"; 8]);
        for seed in 0..20_u128 {
            let mut manager = PieceManager::with_seed(GameSeed::from(seed));
            assert!(!manager.has_playable_pieces(&board));
            // bombs need an empty cell too
            for turn in 0..10 {
                manager.consume_piece(turn % PieceManager::PANEL_SIZE);
                assert!(!manager.has_playable_pieces(&board));
            }
        }
    }

    #[test]
    fn test_has_playable_pieces_on_partial_board() {
        let mut manager = manager();
        let mut board = Board::from_ascii(&["########"; 8]);
        assert!(!manager.has_playable_pieces(&board));

        board.clear();
        assert!(manager.has_playable_pieces(&board));

        manager.reset();
        assert!(manager.has_playable_pieces(&board));
    }

    #[test]
    fn test_reset() {
        let mut manager = manager();
        let before = *manager.pieces();
        manager.consume_piece(0);
        manager.select_piece(1);

        manager.reset();
        assert_eq!(manager.selected_index(), None);
        assert_eq!(manager.bomb_schedule().turns_since_last_bomb(), 0);
        assert!(manager.bomb_schedule().is_valid());
        for (old, new) in before.iter().zip(manager.pieces()) {
            assert_ne!(old.id(), new.id());
            assert!(!new.is_bomb());
        }
    }

    #[test]
    fn test_same_seed_same_panel_sequence() {
        let mut a = manager();
        let mut b = manager();
        for turn in 0..30 {
            let slot = turn % PieceManager::PANEL_SIZE;
            assert_eq!(a.consume_piece(slot), b.consume_piece(slot));
        }
        assert_eq!(a.pieces(), b.pieces());
    }
}

use purrfect_engine::{GameSession, PieceManager, TurnOutcome};
use rand::{Rng, seq::IndexedRandom as _};

/// A placement: panel slot and top-left board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Move {
    pub(crate) slot: usize,
    pub(crate) row: usize,
    pub(crate) col: usize,
}

impl Move {
    pub(crate) fn apply(self, session: &mut GameSession) -> Option<TurnOutcome> {
        session
            .place_piece(self.slot, self.row.cast_signed(), self.col.cast_signed())
            .ok()
    }
}

/// Every placement the current panel allows, slot by slot in row-major order.
pub(crate) fn legal_moves(session: &GameSession) -> Vec<Move> {
    if session.state().is_game_over() {
        return vec![];
    }
    let board = session.board();
    session
        .piece_manager()
        .pieces()
        .iter()
        .enumerate()
        .flat_map(|(slot, piece)| {
            board
                .valid_positions(piece.shape())
                .map(move |(row, col)| Move { slot, row, col })
        })
        .collect()
}

pub(crate) trait Agent {
    fn choose_move(&mut self, session: &GameSession) -> Option<Move>;
}

/// Picks the move with the best immediate result.
///
/// Moves are ranked by points gained, then by fewest occupied cells left,
/// then by the number of panel slots still playable afterwards.
#[derive(Debug, Default)]
pub(crate) struct GreedyAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MoveRank {
    points: usize,
    free_cells: usize,
    playable_slots: usize,
}

impl GreedyAgent {
    fn rank(session: &GameSession, mv: Move) -> Option<MoveRank> {
        let mut sim = session.clone();
        let outcome = mv.apply(&mut sim)?;
        let board = sim.board();
        let playable_slots = (0..PieceManager::PANEL_SIZE)
            .filter_map(|slot| sim.piece_manager().piece(slot))
            .filter(|piece| board.has_valid_placement(piece.shape()))
            .count();
        Some(MoveRank {
            points: outcome.points,
            free_cells: board.rows() * board.cols() - board.occupied_count(),
            playable_slots,
        })
    }
}

impl Agent for GreedyAgent {
    fn choose_move(&mut self, session: &GameSession) -> Option<Move> {
        let mut best: Option<(MoveRank, Move)> = None;
        for mv in legal_moves(session) {
            let Some(rank) = Self::rank(session, mv) else {
                continue;
            };
            // strict comparison keeps the first of equal moves
            if best.is_none_or(|(best_rank, _)| rank > best_rank) {
                best = Some((rank, mv));
            }
        }
        best.map(|(_, mv)| mv)
    }
}

/// Picks uniformly among all legal moves.
#[derive(Debug)]
pub(crate) struct RandomAgent<R> {
    rng: R,
}

impl<R> RandomAgent<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R> Agent for RandomAgent<R>
where
    R: Rng,
{
    fn choose_move(&mut self, session: &GameSession) -> Option<Move> {
        legal_moves(session).choose(&mut self.rng).copied()
    }
}

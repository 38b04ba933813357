use arrayvec::ArrayVec;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    BoardSizeError, PlacementError,
    core::{Board, BombPiece, Piece},
};

use super::{
    cascade_engine::CascadeEngine,
    config::GameConfig,
    piece_factory::PieceFactory,
    piece_manager::PieceManager,
    score_manager::ScoreManager,
    seed::GameSeed,
    snapshot::{self, GameSnapshot, PieceSnapshot, SnapshotError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// What happened during one accepted placement.
///
/// Carries everything a renderer or sound layer needs to react to the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The piece taken from the panel.
    pub piece: Piece,
    pub lines_cleared: usize,
    /// Clearing passes needed for this placement.
    pub cascade_level: u32,
    /// Points awarded this turn, from lines or from an explosion.
    pub points: usize,
    pub cleared_rows: Vec<usize>,
    pub cleared_cols: Vec<usize>,
    /// Blocks removed by a bomb; `None` when the piece was not a bomb.
    pub exploded_blocks: Option<usize>,
    /// In-bounds cells of the blast area, row-major. Empty for normal pieces.
    pub blast_area: ArrayVec<(usize, usize), 9>,
    /// The turn cleared nothing and ended a running streak.
    pub streak_broken: bool,
    pub game_over: bool,
}

/// One game from first placement to game over.
///
/// Owns the board, the panel, the cascade engine and the score, and runs a
/// full turn per [`place_piece`](Self::place_piece) call.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    pieces: PieceManager,
    cascade: CascadeEngine,
    score: ScoreManager,
    state: SessionState,
    turn: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::from_parts(GameConfig::default(), Board::default(), rand::rng().random())
    }
}

impl GameSession {
    /// Starts a game. Without a configured seed one is drawn from OS entropy.
    pub fn new(config: GameConfig) -> Result<Self, BoardSizeError> {
        let board = Board::new(config.board_rows, config.board_cols)?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Ok(Self::from_parts(config, board, seed))
    }

    fn from_parts(config: GameConfig, board: Board, seed: GameSeed) -> Self {
        let mut this = Self {
            config,
            board,
            pieces: PieceManager::with_seed(seed),
            cascade: CascadeEngine::new(),
            score: ScoreManager::new(),
            state: SessionState::Playing,
            turn: 0,
        };
        this.update_state();
        this
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seed of the current piece generator.
    #[must_use]
    pub fn seed(&self) -> GameSeed {
        self.pieces.factory().seed()
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn piece_manager(&self) -> &PieceManager {
        &self.pieces
    }

    #[must_use]
    pub fn score(&self) -> &ScoreManager {
        &self.score
    }

    #[must_use]
    pub fn cascade_engine(&self) -> &CascadeEngine {
        &self.cascade
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of accepted placements.
    #[must_use]
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Marks a panel slot as selected, as a drag start would.
    pub fn select_piece(&mut self, slot: usize) -> Option<Piece> {
        self.pieces.select_piece(slot)
    }

    /// Returns whether the piece in `slot` can go at `(row, col)` now.
    #[must_use]
    pub fn can_place(&self, slot: usize, row: isize, col: isize) -> bool {
        self.state.is_playing()
            && self
                .pieces
                .piece(slot)
                .is_some_and(|piece| self.board.can_place_piece(piece.shape(), row, col))
    }

    /// Plays the piece in `slot` with its top-left cell at `(row, col)`.
    ///
    /// On error nothing changes.
    pub fn place_piece(
        &mut self,
        slot: usize,
        row: isize,
        col: isize,
    ) -> Result<TurnOutcome, PlacementError> {
        if self.state.is_game_over() {
            return Err(PlacementError::GameOver);
        }
        let piece = self
            .pieces
            .piece(slot)
            .ok_or(PlacementError::InvalidSlot { index: slot })?;
        if !self.board.can_place_piece(piece.shape(), row, col) {
            return Err(PlacementError::Blocked);
        }

        let mut outcome = TurnOutcome {
            piece,
            lines_cleared: 0,
            cascade_level: 0,
            points: 0,
            cleared_rows: vec![],
            cleared_cols: vec![],
            exploded_blocks: None,
            blast_area: ArrayVec::new(),
            streak_broken: false,
            game_over: false,
        };

        if let Some(bomb) = piece.as_bomb() {
            self.detonate(bomb, row, col, &mut outcome);
        } else {
            self.board
                .place_piece(piece.shape(), row, col, piece.color(), piece.id());
            self.resolve_lines(&mut outcome);
        }

        self.pieces.consume_piece(slot);
        self.turn += 1;
        self.update_state();
        outcome.game_over = self.state.is_game_over();
        Ok(outcome)
    }

    fn detonate(&mut self, bomb: BombPiece, row: isize, col: isize, outcome: &mut TurnOutcome) {
        outcome.blast_area = bomb
            .explosion_cells(row, col)
            .into_iter()
            .filter_map(|(r, c)| Some((usize::try_from(r).ok()?, usize::try_from(c).ok()?)))
            .filter(|&(r, c)| r < self.board.rows() && c < self.board.cols())
            .collect();
        let exploded = self.board.explode_3x3(row, col);
        outcome.exploded_blocks = Some(exploded);
        outcome.points = self.score.add_explosion_score(exploded);
    }

    fn resolve_lines(&mut self, outcome: &mut TurnOutcome) {
        self.cascade.reset();
        while let Some(lines) = self.cascade.detect_lines(&self.board) {
            outcome.lines_cleared += self.cascade.clear_lines(&mut self.board, &lines);
            outcome.cleared_rows.extend(lines.rows);
            outcome.cleared_cols.extend(lines.cols);
        }
        outcome.cascade_level = self.cascade.cascade_level();

        if outcome.lines_cleared > 0 {
            outcome.points = self.score.add_score(outcome.lines_cleared);
        } else {
            outcome.streak_broken = self.score.streak_level() > 0;
            self.score.reset_streak();
        }
    }

    fn update_state(&mut self) {
        if !self.pieces.has_playable_pieces(&self.board) {
            self.state = SessionState::GameOver;
        }
    }

    /// Starts over on an empty board with the same configuration.
    ///
    /// The piece stream continues; use [`new`](Self::new) for a fresh seed.
    pub fn restart(&mut self) {
        self.board.clear();
        self.pieces.reset();
        self.cascade.reset();
        self.score.reset();
        self.state = SessionState::Playing;
        self.turn = 0;
        self.update_state();
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.to_snapshot(),
            score: self.score.to_snapshot(),
            panel: self.pieces.pieces().iter().map(PieceSnapshot::from).collect(),
            bomb_schedule: self.pieces.bomb_schedule(),
            turn: self.turn,
            game_over: self.state.is_game_over(),
        }
    }

    /// Rebuilds a session from a snapshot.
    ///
    /// The random stream is not part of the snapshot: refills continue from a
    /// generator seeded with `seed`, or from OS entropy when `None`.
    pub fn restore(snapshot: &GameSnapshot, seed: Option<GameSeed>) -> Result<Self, SnapshotError> {
        let board = Board::from_snapshot(&snapshot.board)?;
        let panel = snapshot::panel_from_snapshot(&snapshot.panel)?;
        snapshot::check_bomb_schedule(snapshot.bomb_schedule)?;

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let config = GameConfig {
            board_rows: board.rows(),
            board_cols: board.cols(),
            seed: Some(seed),
        };
        let pieces =
            PieceManager::restore(PieceFactory::with_seed(seed), panel, snapshot.bomb_schedule);

        let mut this = Self {
            config,
            board,
            pieces,
            cascade: CascadeEngine::new(),
            score: ScoreManager::from_snapshot(&snapshot.score),
            state: if snapshot.game_over {
                SessionState::GameOver
            } else {
                SessionState::Playing
            },
            turn: snapshot.turn,
        };
        this.update_state();
        Ok(this)
    }
}

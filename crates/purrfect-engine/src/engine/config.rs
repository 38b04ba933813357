use serde::{Deserialize, Serialize};

use crate::{BoardSizeError, core::Board};

use super::seed::GameSeed;

/// Settings for a new game.
///
/// Missing fields fall back to an 8×8 board and an OS-entropy seed.
///
/// ```
/// use purrfect_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "boardRows": 10 }"#).unwrap();
/// assert_eq!((config.board_rows, config.board_cols), (10, 8));
/// assert!(config.seed.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub board_rows: usize,
    pub board_cols: usize,
    pub seed: Option<GameSeed>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_rows: Board::DEFAULT_ROWS,
            board_cols: Board::DEFAULT_COLS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), BoardSizeError> {
        Board::check_size(self.board_rows, self.board_cols)
    }
}

use serde::{Deserialize, Serialize};

use crate::core::{Board, CompleteLines};

/// Totals of one [`CascadeEngine::process_cascade`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResult {
    pub cascade_level: u32,
    pub total_lines_cleared: usize,
}

/// Detects and clears completed lines in passes.
///
/// `cascade_level` counts clearing passes within one placement. It is not the
/// cross-turn streak, which lives in [`ScoreManager`](crate::ScoreManager).
///
/// Clearing never refills cells, so a placement resolves in a single pass in
/// practice. [`detect_lines`](Self::detect_lines) and
/// [`clear_lines`](Self::clear_lines) are the primitives;
/// [`process_cascade`](Self::process_cascade) is a convenience loop over them.
#[derive(Debug, Clone, Default)]
pub struct CascadeEngine {
    cascade_level: u32,
}

impl CascadeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cascade_level(&self) -> u32 {
        self.cascade_level
    }

    /// Returns the completed lines, or `None` when there are none.
    #[must_use]
    pub fn detect_lines(&self, board: &Board) -> Option<CompleteLines> {
        let lines = board.get_complete_lines();
        (!lines.is_empty()).then_some(lines)
    }

    /// Clears one batch of lines and counts one pass.
    pub fn clear_lines(&mut self, board: &mut Board, lines: &CompleteLines) -> usize {
        let cleared = board.clear_lines(&lines.rows, &lines.cols);
        self.cascade_level += 1;
        cleared
    }

    /// Resets the level, then detects and clears until no lines remain.
    pub fn process_cascade(&mut self, board: &mut Board) -> CascadeResult {
        self.reset();
        let mut total_lines_cleared = 0;
        while let Some(lines) = self.detect_lines(board) {
            total_lines_cleared += self.clear_lines(board, &lines);
        }
        CascadeResult {
            cascade_level: self.cascade_level,
            total_lines_cleared,
        }
    }

    pub fn reset(&mut self) {
        self.cascade_level = 0;
    }
}

use super::snapshot::ScoreSnapshot;

/// Score state for one game.
///
/// # Scoring
///
/// - **Lines**: `lines × 100`, multiplied by `1 + 0.5 × streak`, where the
///   streak counts the consecutive turns before this one that cleared lines.
///   The first clear of a streak always scores at 1.0×.
/// - **Explosions**: a flat 50 points per block a bomb removes. Bombs neither
///   extend nor break the streak.
///
/// # Example
///
/// ```
/// use purrfect_engine::ScoreManager;
///
/// let mut score = ScoreManager::new();
/// assert_eq!(score.add_score(1), 100);
/// assert_eq!(score.add_score(1), 150);
/// score.reset_streak();
/// assert_eq!(score.add_score(1), 100);
/// assert_eq!(score.score(), 350);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreManager {
    score: usize,
    streak_level: usize,
    last_multiplier_percent: usize,
    total_lines_cleared: usize,
    best_streak: usize,
    bombs_exploded: usize,
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreManager {
    pub const BASE_SCORE_PER_LINE: usize = 100;
    /// Multiplier gained per streak level, in percent.
    pub const STREAK_BONUS_PERCENT: usize = 50;
    pub const EXPLOSION_SCORE_PER_BLOCK: usize = 50;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            streak_level: 0,
            last_multiplier_percent: 100,
            total_lines_cleared: 0,
            best_streak: 0,
            bombs_exploded: 0,
        }
    }

    const fn multiplier_percent(streak_level: usize) -> usize {
        100 + streak_level * Self::STREAK_BONUS_PERCENT
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the number of consecutive turns that cleared lines.
    #[must_use]
    pub const fn streak_level(&self) -> usize {
        self.streak_level
    }

    /// Returns the multiplier applied by the most recent line clear, or 1.0
    /// after a streak break or reset.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn last_multiplier(&self) -> f64 {
        self.last_multiplier_percent as f64 / 100.0
    }

    #[must_use]
    pub const fn total_lines_cleared(&self) -> usize {
        self.total_lines_cleared
    }

    /// Returns the longest streak reached in this game.
    #[must_use]
    pub const fn best_streak(&self) -> usize {
        self.best_streak
    }

    #[must_use]
    pub const fn bombs_exploded(&self) -> usize {
        self.bombs_exploded
    }

    /// Awards points for a turn that cleared `lines_cleared` lines and extends
    /// the streak.
    ///
    /// Zero lines award nothing and leave the streak untouched; call
    /// [`reset_streak`](Self::reset_streak) for turns without a clear.
    pub fn add_score(&mut self, lines_cleared: usize) -> usize {
        if lines_cleared == 0 {
            return 0;
        }
        let percent = Self::multiplier_percent(self.streak_level);
        let points = lines_cleared * Self::BASE_SCORE_PER_LINE * percent / 100;

        self.score += points;
        self.last_multiplier_percent = percent;
        self.total_lines_cleared += lines_cleared;
        self.streak_level += 1;
        self.best_streak = self.best_streak.max(self.streak_level);
        points
    }

    pub fn reset_streak(&mut self) {
        self.streak_level = 0;
        self.last_multiplier_percent = 100;
    }

    /// Awards the flat per-block score for a bomb explosion.
    pub fn add_explosion_score(&mut self, blocks_cleared: usize) -> usize {
        let points = blocks_cleared * Self::EXPLOSION_SCORE_PER_BLOCK;
        self.score += points;
        self.bombs_exploded += 1;
        points
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn to_snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            streak_level: self.streak_level,
            total_lines_cleared: self.total_lines_cleared,
            best_streak: self.best_streak,
            bombs_exploded: self.bombs_exploded,
        }
    }

    /// Restores counters; the last multiplier is derived from the streak.
    #[must_use]
    pub fn from_snapshot(snapshot: &ScoreSnapshot) -> Self {
        let last_multiplier_percent = match snapshot.streak_level {
            0 => 100,
            n => Self::multiplier_percent(n - 1),
        };
        Self {
            score: snapshot.score,
            streak_level: snapshot.streak_level,
            last_multiplier_percent,
            total_lines_cleared: snapshot.total_lines_cleared,
            best_streak: snapshot.best_streak.max(snapshot.streak_level),
            bombs_exploded: snapshot.bombs_exploded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_manager() {
        let score = ScoreManager::new();
        assert_eq!(score.score(), 0);
        assert_eq!(score.streak_level(), 0);
        assert!((score.last_multiplier() - 1.0).abs() < f64::EPSILON);
        assert_eq!(score.total_lines_cleared(), 0);
    }

    #[test]
    fn test_streak_scoring() {
        let mut score = ScoreManager::new();
        assert_eq!(score.add_score(1), 100);
        assert!((score.last_multiplier() - 1.0).abs() < f64::EPSILON);

        assert_eq!(score.add_score(1), 150);
        assert!((score.last_multiplier() - 1.5).abs() < f64::EPSILON);
        assert_eq!(score.streak_level(), 2);

        score.reset_streak();
        assert_eq!(score.streak_level(), 0);
        assert!((score.last_multiplier() - 1.0).abs() < f64::EPSILON);
        assert_eq!(score.add_score(1), 100);

        assert_eq!(score.score(), 350);
        assert_eq!(score.total_lines_cleared(), 3);
        assert_eq!(score.best_streak(), 2);
    }

    #[test]
    fn test_multi_line_turns() {
        let mut score = ScoreManager::new();
        assert_eq!(score.add_score(2), 200);
        // streak 1: 3 × 100 × 1.5
        assert_eq!(score.add_score(3), 450);
        // streak 2: 1 × 100 × 2.0
        assert_eq!(score.add_score(1), 200);
        assert_eq!(score.total_lines_cleared(), 6);
    }

    #[test]
    fn test_zero_lines_is_noop() {
        let mut score = ScoreManager::new();
        score.add_score(1);
        assert_eq!(score.add_score(0), 0);
        assert_eq!(score.streak_level(), 1);
        assert_eq!(score.score(), 100);
    }

    #[test]
    fn test_explosion_score_keeps_streak() {
        let mut score = ScoreManager::new();
        score.add_score(1);
        assert_eq!(score.add_explosion_score(4), 200);
        assert_eq!(score.add_explosion_score(0), 0);
        assert_eq!(score.streak_level(), 1);
        assert_eq!(score.score(), 300);
        assert_eq!(score.bombs_exploded(), 2);
        assert_eq!(score.total_lines_cleared(), 1);
    }

    #[test]
    fn test_reset() {
        let mut score = ScoreManager::new();
        score.add_score(2);
        score.add_score(2);
        score.add_explosion_score(3);
        score.reset();
        assert_eq!(score, ScoreManager::new());
    }

    #[test]
    fn test_snapshot_restores_multiplier() {
        let mut score = ScoreManager::new();
        score.add_score(1);
        score.add_score(1);
        score.add_score(2);
        score.add_explosion_score(5);

        let restored = ScoreManager::from_snapshot(&score.to_snapshot());
        assert_eq!(restored, score);

        let mut score = restored;
        assert_eq!(score.add_score(1), 250);
    }
}

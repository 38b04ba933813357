use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use purrfect_engine::{GameConfig, GameSeed, GameSession, GameSnapshot};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::util;

/// A game written to disk by the `save` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavedGame {
    pub(crate) saved_at: DateTime<Utc>,
    /// Seed the game was started with.
    pub(crate) seed: GameSeed,
    /// Seed for refills after loading, drawn when the game was saved.
    pub(crate) resume_seed: GameSeed,
    pub(crate) config: GameConfig,
    pub(crate) snapshot: GameSnapshot,
}

impl SavedGame {
    pub(crate) fn capture(session: &GameSession) -> Self {
        Self {
            saved_at: Utc::now(),
            seed: session.seed(),
            resume_seed: rand::rng().random(),
            config: *session.config(),
            snapshot: session.snapshot(),
        }
    }

    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        util::read_json("saved game", path)
    }

    /// Resumes the game.
    ///
    /// Refills come from `resume_seed`, so they do not repeat the opening
    /// pieces of the original game. Loading the same file twice gives the
    /// same refills.
    pub(crate) fn into_session(self) -> anyhow::Result<GameSession> {
        GameSession::restore(&self.snapshot, Some(self.resume_seed))
            .context("Saved game does not describe a valid game state")
    }

    /// Writes `game_{YYYYMMDD_HHMMSS}.json` into `save_dir` and returns its
    /// path. Existing files are never replaced: a `_N` suffix is added when
    /// the name is taken.
    pub(crate) fn save(&self, save_dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(save_dir)
            .with_context(|| format!("Failed to create directory {}", save_dir.display()))?;

        let stem = format!("game_{}", self.saved_at.format("%Y%m%d_%H%M%S"));
        let (file, filepath) = create_unique(save_dir, &stem)?;
        util::write_json_to(BufWriter::new(file), self, &filepath.display())?;
        Ok(filepath)
    }
}

fn create_unique(dir: &Path, stem: &str) -> anyhow::Result<(File, PathBuf)> {
    let mut n = 0;
    loop {
        let filename = match n {
            0 => format!("{stem}.json"),
            n => format!("{stem}_{n}.json"),
        };
        let filepath = dir.join(filename);
        match File::create_new(&filepath) {
            Ok(file) => return Ok((file, filepath)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create file: {}", filepath.display()));
            }
        }
    }
}

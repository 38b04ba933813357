use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use purrfect_engine::{GameConfig, GameSeed};

/// Writes pretty JSON to `output`, or to stdout when no path is given.
pub(crate) fn write_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json_to(BufWriter::new(file), value, &path.display())
        }
        None => write_json_to(io::stdout().lock(), value, &"stdout"),
    }
}

/// Writes pretty JSON and a trailing newline, then flushes.
pub(crate) fn write_json_to<W, T>(
    mut writer: W,
    value: &T,
    target: &dyn fmt::Display,
) -> anyhow::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer).with_context(|| format!("Failed to write to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

/// Reads a JSON file; `what` names the file in error messages.
pub(crate) fn read_json<T>(what: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
}

/// Game settings shared by every subcommand that starts a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Path to a game configuration file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of board rows (overrides the configuration file)
    #[arg(long)]
    rows: Option<usize>,
    /// Number of board columns (overrides the configuration file)
    #[arg(long)]
    cols: Option<usize>,
    /// Piece seed as 32 hex digits (overrides the configuration file)
    #[arg(long)]
    seed: Option<GameSeed>,
}

impl ConfigArg {
    /// Loads the configuration file if any, then applies the overrides.
    pub(crate) fn load(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => read_json::<GameConfig>("config", path)?,
            None => GameConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut GameConfig) {
        if let Some(rows) = self.rows {
            config.board_rows = rows;
        }
        if let Some(cols) = self.cols {
            config.board_cols = cols;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let arg = ConfigArg {
            rows: Some(10),
            seed: Some(GameSeed::from(7)),
            ..ConfigArg::default()
        };
        let mut config = GameConfig::default();
        arg.apply_overrides(&mut config);
        assert_eq!(config.board_rows, 10);
        assert_eq!(config.board_cols, 8);
        assert_eq!(config.seed, Some(GameSeed::from(7)));
    }

    #[test]
    fn test_write_json_to_ends_with_newline() {
        let mut buf = Vec::new();
        write_json_to(&mut buf, &GameConfig::default(), &"buffer").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        let back: GameConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, GameConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_size() {
        let arg = ConfigArg {
            cols: Some(0),
            ..ConfigArg::default()
        };
        assert!(arg.load().is_err());
    }
}

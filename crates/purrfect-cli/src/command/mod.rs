use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, catalog::CatalogArg, play::PlayArg};

mod auto_play;
mod catalog;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a text-mode game on stdin/stdout
    Play(#[clap(flatten)] PlayArg),
    /// Let an agent play games and report the results as JSON
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print every piece in the catalog
    Catalog(#[clap(flatten)] CatalogArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Catalog(arg) => catalog::run(&arg)?,
    }
    Ok(())
}

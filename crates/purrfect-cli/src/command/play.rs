use std::{
    io::{self, BufRead as _, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use purrfect_engine::GameSession;

use crate::{save::SavedGame, util::ConfigArg, view};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Resume a game saved with the `save` command
    #[arg(long)]
    load: Option<PathBuf>,
    /// Directory to write saved games to
    #[arg(long, default_value = "./data/saves/")]
    save_dir: PathBuf,
}

/// A line typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayCommand {
    Place { slot: usize, row: isize, col: isize },
    Save,
    Restart,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  place <slot> <row> <col>  put a panel piece with its top-left cell at (row, col)
  save                      write the game to the save directory
  restart                   start over on an empty board
  help                      show this message
  quit                      leave the game";

fn parse_command(line: &str) -> Result<PlayCommand, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err("empty command".to_owned());
    };
    let command = match name {
        "place" | "p" => {
            let mut number = |what: &str| -> Result<isize, String> {
                let word = words
                    .next()
                    .ok_or_else(|| format!("missing {what}"))?;
                word.parse()
                    .map_err(|_| format!("invalid {what}: {word}"))
            };
            let slot = number("slot")?;
            let row = number("row")?;
            let col = number("col")?;
            let slot = usize::try_from(slot).map_err(|_| format!("invalid slot: {slot}"))?;
            PlayCommand::Place { slot, row, col }
        }
        "save" => PlayCommand::Save,
        "restart" => PlayCommand::Restart,
        "help" | "?" => PlayCommand::Help,
        "quit" | "exit" | "q" => PlayCommand::Quit,
        _ => return Err(format!("unknown command: {name}")),
    };
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument: {extra}"));
    }
    Ok(command)
}

fn print_game(session: &GameSession) {
    println!();
    print!("{}", view::render_board(session));
    println!();
    print!("{}", view::render_panel(session));
    println!("{}", view::render_status(session));
    if session.state().is_game_over() {
        println!("Game over. Type `restart` or `quit`.");
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        load,
        save_dir,
    } = arg;

    let mut session = match load {
        Some(path) => {
            let session = SavedGame::load(path)?.into_session()?;
            eprintln!("Loaded game from {}", path.display());
            session
        }
        None => GameSession::new(config.load()?).context("Failed to start game")?,
    };

    println!("{HELP}");
    print_game(&session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(PlayCommand::Place { slot, row, col }) => {
                match session.place_piece(slot, row, col) {
                    Ok(outcome) => {
                        println!("{}", view::describe_outcome(&outcome));
                        print_game(&session);
                    }
                    Err(e) => eprintln!("Rejected: {e}"),
                }
            }
            Ok(PlayCommand::Save) => {
                let path = SavedGame::capture(&session).save(save_dir)?;
                eprintln!("Saved game to {}", path.display());
            }
            Ok(PlayCommand::Restart) => {
                session.restart();
                print_game(&session);
            }
            Ok(PlayCommand::Help) => println!("{HELP}"),
            Ok(PlayCommand::Quit) => break,
            Err(e) => eprintln!("{e} (type `help` for commands)"),
        }
    }

    eprintln!(
        "Final score: {} after {} turns",
        session.score().score(),
        session.turn()
    );
    Ok(())
}

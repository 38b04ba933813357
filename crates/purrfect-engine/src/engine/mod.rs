//! Game engine logic and state management.
//!
//! This module builds the turn-based game on top of the core grid and piece
//! types:
//!
//! - [`PieceFactory`] - Seeded piece instantiation from the catalog
//! - [`PieceManager`] - The 3-slot panel and bomb scheduling
//! - [`CascadeEngine`] - Line detection and clearing passes
//! - [`ScoreManager`] - Points, streak multiplier and counters
//! - [`GameSession`] - One game, driving all of the above per placement
//! - [`GameSnapshot`] - Serializable state for the persistence layer
//!
//! # Turn Flow
//!
//! 1. Pick a panel slot and an anchor where the piece fits
//! 2. Place the piece, or detonate it if it is a bomb
//! 3. Clear completed rows and columns and award points
//! 4. Refill the used slot (possibly with a bomb)
//! 5. End the game when no panel piece fits anywhere
//!
//! # Example
//!
//! ```
//! use purrfect_engine::{GameConfig, GameSeed, GameSession};
//!
//! let config = GameConfig {
//!     seed: Some(GameSeed::from(42)),
//!     ..GameConfig::default()
//! };
//! let mut session = GameSession::new(config).unwrap();
//!
//! let shape = session.piece_manager().pieces()[0].shape();
//! let (row, col) = session.board().valid_positions(shape).next().unwrap();
//! let outcome = session.place_piece(0, row as isize, col as isize).unwrap();
//!
//! assert_eq!(session.turn(), 1);
//! println!("scored {} points", outcome.points);
//! ```

pub use self::{
    cascade_engine::*, config::*, game_session::*, piece_factory::*, piece_manager::*,
    score_manager::*, seed::*, snapshot::*,
};

mod cascade_engine;
mod config;
mod game_session;
mod piece_factory;
mod piece_manager;
mod score_manager;
mod seed;
mod snapshot;

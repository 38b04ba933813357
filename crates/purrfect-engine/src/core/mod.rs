pub use self::{board::*, cell::*, piece::*, shape::*};

pub(crate) mod board;
pub(crate) mod cell;
pub(crate) mod piece;
pub(crate) mod shape;

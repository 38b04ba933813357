use std::fmt::Write as _;

use purrfect_engine::{GameSession, Piece, TurnOutcome};

/// Draws the board with row and column indices.
pub(crate) fn render_board(session: &GameSession) -> String {
    let board = session.board();
    let mut out = String::from("   ");
    for col in 0..board.cols() {
        write!(out, "{:>2}", col % 100).unwrap();
    }
    out.push('\n');
    for (row, cells) in board.cell_rows().enumerate() {
        write!(out, "{row:>2} ").unwrap();
        for cell in cells {
            out.push_str(if cell.is_occupied() { " #" } else { " ." });
        }
        out.push('\n');
    }
    out
}

fn piece_label(piece: &Piece) -> String {
    let definition = piece.definition();
    if piece.is_bomb() {
        "bomb".to_owned()
    } else {
        format!(
            "{} {}° {}",
            definition.category,
            definition.rotation.degrees(),
            definition.color
        )
    }
}

/// Draws the three panel pieces next to each other.
pub(crate) fn render_panel(session: &GameSession) -> String {
    let pieces = session.piece_manager().pieces();
    let shapes = pieces
        .iter()
        .map(|piece| piece.shape().to_ascii())
        .collect::<Vec<_>>();
    let height = shapes.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = String::new();
    for (slot, piece) in pieces.iter().enumerate() {
        write!(out, "[{slot}] {:<22}", piece_label(piece)).unwrap();
    }
    out.push('\n');
    for line in 0..height {
        for rows in &shapes {
            let row = rows.get(line).map_or("", String::as_str);
            write!(out, "    {row:<22}").unwrap();
        }
        out.push('\n');
    }
    out
}

pub(crate) fn render_status(session: &GameSession) -> String {
    let score = session.score();
    format!(
        "turn {} | score {} | streak {} (x{:.1}) | lines {}",
        session.turn(),
        score.score(),
        score.streak_level(),
        score.last_multiplier(),
        score.total_lines_cleared(),
    )
}

/// One-line description of what a turn did.
pub(crate) fn describe_outcome(outcome: &TurnOutcome) -> String {
    let mut out = String::new();
    if let Some(blocks) = outcome.exploded_blocks {
        write!(out, "boom! {blocks} blocks destroyed").unwrap();
    } else if outcome.lines_cleared > 0 {
        write!(
            out,
            "cleared {} line(s) (rows {:?}, cols {:?})",
            outcome.lines_cleared, outcome.cleared_rows, outcome.cleared_cols
        )
        .unwrap();
    } else {
        out.push_str("placed");
    }
    if outcome.points > 0 {
        write!(out, ", +{} points", outcome.points).unwrap();
    }
    if outcome.streak_broken {
        out.push_str(", streak lost");
    }
    if outcome.game_over {
        out.push_str(", game over");
    }
    out
}

//! Parsing of typed player input.

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Lines typed on standard input.
pub type InputLines = Lines<BufReader<Stdin>>;

/// Opens standard input for line-by-line reading.
pub fn lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Something the player typed during a solo attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloAction {
    /// Choose an option (0-based).
    Choose(usize),
    /// Go to the next question.
    Next,
    /// Finish now and submit.
    Finish,
    /// Retry a failed submission.
    Retry,
    /// Start over.
    Restart,
    /// Leave without submitting.
    Quit,
    /// Show the help text.
    Help,
}

/// Something a player typed on their turn in a competitive round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    /// Lock in an option (0-based).
    Choose(usize),
    /// Commit the locked option and pass the turn.
    Confirm,
    /// Stop the round.
    Quit,
}

/// Reads a 1-based option number.
pub fn parse_option(line: &str) -> Option<usize> {
    line.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// Reads a solo command; `None` for anything unrecognised.
pub fn parse_solo(line: &str) -> Option<SoloAction> {
    if let Some(option) = parse_option(line) {
        return Some(SoloAction::Choose(option));
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(SoloAction::Next),
        "f" | "finish" => Some(SoloAction::Finish),
        "retry" => Some(SoloAction::Retry),
        "r" | "restart" => Some(SoloAction::Restart),
        "q" | "quit" => Some(SoloAction::Quit),
        "?" | "h" | "help" => Some(SoloAction::Help),
        _ => None,
    }
}

/// Reads a turn command; `None` for anything unrecognised.
pub fn parse_turn(line: &str) -> Option<TurnAction> {
    if let Some(option) = parse_option(line) {
        return Some(TurnAction::Choose(option));
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "ok" | "y" => Some(TurnAction::Confirm),
        "q" | "quit" => Some(TurnAction::Quit),
        _ => None,
    }
}

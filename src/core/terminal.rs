//! Terminal utilities for titles, banners and screen management

use crossterm::cursor::MoveTo;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{IsTerminal, Write};

use super::config::{FALLBACK_TERMINAL_HEIGHT, TERMINAL_RESERVED_LINES};

const RULE_CHAR: &str = "─";
const FALLBACK_TERMINAL_WIDTH: u16 = 80;

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    // ANSI escape sequence to set terminal title
    if std::io::stdout().is_terminal() {
        print!("\x1b]0;{title}\x07");
    }
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    // Flush stdout - ignore errors as this is non-critical
    let _ = std::io::stdout().flush();
}

/// Clears the screen when stdout is an interactive terminal
pub fn clear_screen() {
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
    }
}

/// Prints a full-width rule with `title` centred in it
pub fn print_rule(title: &str) {
    println!("{}", rule_line(title, terminal_width()));
}

/// Lines available for diff output once banner and prompt are accounted for
pub fn diff_budget() -> usize {
    let height = terminal::size()
        .map(|(_, rows)| rows)
        .unwrap_or(FALLBACK_TERMINAL_HEIGHT);
    usize::from(height.saturating_sub(TERMINAL_RESERVED_LINES))
}

fn terminal_width() -> usize {
    usize::from(
        terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(FALLBACK_TERMINAL_WIDTH),
    )
}

fn rule_line(title: &str, width: usize) -> String {
    let label = format!(" {title} ");
    let side = width.saturating_sub(label.chars().count()) / 2;
    let left = RULE_CHAR.repeat(side);
    let right = RULE_CHAR.repeat(width.saturating_sub(side + label.chars().count()));
    format!("{left}{label}{right}")
}

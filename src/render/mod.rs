use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};

use crate::domain::Title;

pub fn header(text: &str) {
    println!("\n{}", text.bold());
}

pub fn ok(message: &str) {
    println!("{}", message.green());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn note(message: &str) {
    println!("{}", message.dimmed());
}

/// Colored title abbreviation, with a trailing space so it can prefix a
/// name, or empty when the player has no title.
pub fn badge(rating: i32, games_played: i32) -> String {
    match Title::for_player(rating, games_played) {
        Some(Title::Grandmaster) => format!("{} ", "GMF".yellow().bold()),
        Some(Title::Master) => format!("{} ", "MF".cyan().bold()),
        Some(Title::Candidate) => format!("{} ", "CMF".blue().bold()),
        None => String::new(),
    }
}

pub fn player_label(name: &str, rating: i32, games_played: i32) -> String {
    format!("{}{}", badge(rating, games_played), name)
}

/// Visible width of a cell, skipping ANSI color sequences so padded
/// columns stay aligned when cells carry badges.
fn display_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in text.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }
    width
}

fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(padding))
}

/// Plain fixed-width table; column widths follow the widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(display_width(cell));
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    println!("{}", header_line.join("  ").bold());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", line.join("  "));
    }
}

/// Rank position with the top three tiers highlighted, as on the public
/// ranking table.
pub fn rank_label(position: usize) -> String {
    let text = format!("{}", position + 1);
    match position {
        0 => text.yellow().bold().to_string(),
        1 => text.bright_white().bold().to_string(),
        2 => text.red().bold().to_string(),
        _ => text,
    }
}

/// Explicit confirmation step before destructive actions; anything other
/// than `s`/`sim` declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [s/N] ", prompt);
    io::stdout().flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "s" || answer == "sim")
}

pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{} ", prompt);
    io::stdout().flush().context("Failed to flush prompt")?;

    let mut value = String::new();
    io::stdin()
        .read_line(&mut value)
        .context("Failed to read input")?;
    Ok(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_ignores_color_escapes() {
        assert_eq!(display_width("Ana Souza"), 9);
        assert_eq!(display_width("\x1b[1;33mGMF\x1b[0m Ana"), 7);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn pad_fills_to_the_visible_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcd", 2), "abcd");
        let padded = pad("\x1b[34mCMF\x1b[0m", 5);
        assert!(padded.ends_with("  "));
    }

    #[test]
    fn badge_is_empty_under_the_games_floor() {
        assert_eq!(badge(2200, 9), "");
        assert_ne!(badge(2200, 10), "");
        assert_eq!(badge(1500, 50), "");
    }
}

//! Card deck files.
//!
//! A deck is a plain text file:
//! - One card (a signed decimal token) per line
//! - Anything after `;` is a comment
//! - Blank lines are ignored
//!
//! Cards are fed to the machine in file order.

use crate::decimal::Word;
use std::path::Path;
use std::io::{BufRead, BufReader, Write};
use thiserror::Error;

/// An ordered stack of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    tokens: Vec<String>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card to the bottom of the deck.
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Cards in feed order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Get the number of cards.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IntoIterator for Deck {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl Extend<String> for Deck {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.tokens.extend(iter);
    }
}

/// Parse deck text, validating every card.
pub fn parse_deck(text: &str) -> Result<Deck, DeckError> {
    let mut deck = Deck::new();

    for (line_num, line) in text.lines().enumerate() {
        let card = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let card = card.trim();

        // Skip empty lines and comments
        if card.is_empty() {
            continue;
        }

        Word::parse(card).map_err(|e| DeckError::ParseError {
            line: line_num + 1,
            message: format!("{}: {:?}", e, card),
        })?;

        deck.push(card);
    }

    Ok(deck)
}

/// Load a deck file from disk.
pub fn load_deck<P: AsRef<Path>>(path: P) -> Result<Deck, DeckError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| DeckError::IoError(e.to_string()))?;
    let reader = BufReader::new(file);

    let mut text = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| DeckError::IoError(e.to_string()))?;
        text.push_str(&line);
        text.push('\n');
    }

    parse_deck(&text)
}

/// Save a deck file to disk.
pub fn save_deck<P: AsRef<Path>>(path: P, deck: &Deck) -> Result<(), DeckError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| DeckError::IoError(e.to_string()))?;

    writeln!(file, "; card deck")
        .map_err(|e| DeckError::IoError(e.to_string()))?;
    writeln!(file, "; {} cards", deck.len())
        .map_err(|e| DeckError::IoError(e.to_string()))?;
    writeln!(file).map_err(|e| DeckError::IoError(e.to_string()))?;

    for (i, token) in deck.tokens().iter().enumerate() {
        writeln!(file, "{:<5}; {:03}", token, i)
            .map_err(|e| DeckError::IoError(e.to_string()))?;
    }

    Ok(())
}

/// Errors that can occur during deck operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "; loader\n002\n800 ; jump\n\n   -042  \n";
        let deck = parse_deck(text).unwrap();
        assert_eq!(deck.tokens(), ["002", "800", "-042"]);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = parse_deck("002\n\nabc\n").unwrap_err();
        assert!(matches!(err, DeckError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_save_then_load() {
        let mut deck = Deck::new();
        deck.push("002");
        deck.push("800");
        deck.push("-7");

        let path = std::env::temp_dir().join(format!("deck-test-{}.txt", std::process::id()));
        save_deck(&path, &deck).unwrap();
        let loaded = load_deck(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, deck);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_deck("/nonexistent/deck.txt"),
            Err(DeckError::IoError(_))
        ));
    }
}

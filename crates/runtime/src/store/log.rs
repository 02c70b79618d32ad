use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{BridgeError, Result};

/// Append-only game log with a running character count.
///
/// Lines are joined with `\n`. The count only grows while the game is
/// active, which makes it a cheap "did anything happen" signal.
#[derive(Debug, Default)]
pub struct LogBuffer {
    text: RwLock<String>,
    chars: AtomicUsize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line and returns the new length in characters.
    pub fn append(&self, line: &str) -> Result<usize> {
        let mut text = self
            .text
            .write()
            .map_err(|_| BridgeError::LockPoisoned { what: "game log" })?;
        let mut added = line.chars().count();
        if !text.is_empty() {
            text.push('\n');
            added += 1;
        }
        text.push_str(line);
        Ok(self.chars.fetch_add(added, Ordering::AcqRel) + added)
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.chars.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last `max_chars` characters, or everything when `max_chars` is 0.
    pub fn tail(&self, max_chars: usize) -> Result<String> {
        let text = self.read()?;
        let total = text.chars().count();
        if max_chars == 0 || max_chars >= total {
            return Ok(text.clone());
        }
        Ok(slice_from(&text, total - max_chars).to_string())
    }

    /// Everything appended after the given character offset.
    pub fn since(&self, offset: usize) -> Result<String> {
        let text = self.read()?;
        Ok(slice_from(&text, offset).to_string())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, String>> {
        self.text
            .read()
            .map_err(|_| BridgeError::LockPoisoned { what: "game log" })
    }
}

fn slice_from(text: &str, char_offset: usize) -> &str {
    match text.char_indices().nth(char_offset) {
        Some((byte, _)) => &text[byte..],
        None => "",
    }
}

//! In-memory terminal view
//!
//! Keeps two records of everything written:
//! - a raw transcript, exactly as the dispatcher wrote it
//! - a small screen model (lines + cursor column) that understands `\r`,
//!   `\n` and `\b`, so erasures and clears are observable
//!
//! Used by the test suite and, wrapped by `StdioView`, by the native CLI.

use super::{PlatformError, PlatformResult, TerminalView};

/// A file the view was asked to save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub mime: String,
    pub contents: String,
}

/// Terminal view backed by plain strings
#[derive(Debug, Clone)]
pub struct MemoryView {
    /// Raw output since the last `take_output`
    transcript: String,
    /// Screen model: one entry per buffer line
    lines: Vec<String>,
    /// Cursor column on the last line, in chars
    col: usize,
    saved: Vec<SavedFile>,
    clears: usize,
    fits: usize,
    /// When set, `save_file` fails with this error
    save_error: Option<PlatformError>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self {
            transcript: String::new(),
            lines: vec![String::new()],
            col: 0,
            saved: Vec::new(),
            clears: 0,
            fits: 0,
            save_error: None,
        }
    }

    /// Get pending output and clear the transcript
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.transcript)
    }

    /// Raw output since the last `take_output`
    pub fn output(&self) -> &str {
        &self.transcript
    }

    /// Screen lines, trailing whitespace trimmed
    pub fn screen(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.trim_end().to_string()).collect()
    }

    /// The line the cursor is on
    pub fn current_line(&self) -> &str {
        self.lines.last().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn saved_files(&self) -> &[SavedFile] {
        &self.saved
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn fit_count(&self) -> usize {
        self.fits
    }

    /// Make every subsequent `save_file` fail
    pub fn fail_saves_with(&mut self, error: PlatformError) {
        self.save_error = Some(error);
    }

    fn put(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.lines.push(String::new());
                self.col = 0;
            }
            '\r' => self.col = 0,
            '\x08' => self.col = self.col.saturating_sub(1),
            ch => {
                let Some(line) = self.lines.last_mut() else {
                    return;
                };
                let mut chars: Vec<char> = line.chars().collect();
                if self.col < chars.len() {
                    chars[self.col] = ch;
                } else {
                    chars.resize(self.col, ' ');
                    chars.push(ch);
                }
                *line = chars.into_iter().collect();
                self.col += 1;
            }
        }
    }
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView for MemoryView {
    fn write(&mut self, text: &str) {
        self.transcript.push_str(text);
        for ch in text.chars() {
            self.put(ch);
        }
    }

    fn clear(&mut self) {
        // Like xterm.js: everything but the cursor line goes away
        let current = self.lines.pop().unwrap_or_default();
        self.lines = vec![current];
        self.clears += 1;
    }

    fn fit(&mut self) {
        self.fits += 1;
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|l| l.trim_end().to_string())
    }

    fn save_file(&mut self, name: &str, mime: &str, contents: &str) -> PlatformResult<()> {
        if let Some(err) = &self.save_error {
            return Err(err.clone());
        }
        self.saved.push(SavedFile {
            name: name.to_string(),
            mime: mime.to_string(),
            contents: contents.to_string(),
        });
        Ok(())
    }
}

//! Native stdout view
//!
//! Provides the terminal view for the `cloudsim-cli` binary:
//! - stdout for output
//! - ANSI escapes for clear
//! - the real filesystem for `download`
//!
//! A `MemoryView` shadows everything written so buffer lines can be read
//! back, which a plain stdout stream cannot do.

use super::memory::MemoryView;
use super::{PlatformError, PlatformResult, TerminalView};
use std::io::{self, Write};
use std::path::PathBuf;

/// Terminal view writing to stdout
pub struct StdioView {
    screen: MemoryView,
    /// Directory `save_file` writes into
    save_dir: PathBuf,
    /// When muted, output only reaches the shadow screen
    muted: bool,
}

impl StdioView {
    pub fn new() -> Self {
        Self {
            screen: MemoryView::new(),
            save_dir: PathBuf::from("."),
            muted: false,
        }
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Stop (or resume) copying output to stdout.
    ///
    /// An interactive tty already echoes what the user types, so the CLI
    /// mutes the view while it replays those keystrokes.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn emit(&self, text: &str) {
        if self.muted {
            return;
        }
        let mut stdout = io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl Default for StdioView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView for StdioView {
    fn write(&mut self, text: &str) {
        self.screen.write(text);
        self.emit(text);
    }

    fn clear(&mut self) {
        self.screen.clear();
        self.emit("\x1b[2J\x1b[H");
    }

    fn line_count(&self) -> usize {
        self.screen.line_count()
    }

    fn line(&self, index: usize) -> Option<String> {
        self.screen.line(index)
    }

    fn save_file(&mut self, name: &str, _mime: &str, contents: &str) -> PlatformResult<()> {
        let path = self.save_dir.join(name);
        std::fs::write(&path, contents)
            .map_err(|e| PlatformError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}

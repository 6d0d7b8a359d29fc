//! Platform Abstraction Layer
//!
//! The dispatcher never talks to a concrete widget. It writes through the
//! [`TerminalView`] trait, which each host implements:
//!
//! - Browser (xterm.js via wasm-bindgen, web-sys)
//! - In-memory screen model (tests, scripted sessions)
//! - Native stdout (the `cloudsim-cli` binary)

#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod stdio;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// I/O error
    Io(String),
    /// Feature not supported on this platform
    NotSupported(String),
    /// Initialization failed
    InitFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Io(s) => write!(f, "I/O error: {}", s),
            PlatformError::NotSupported(s) => write!(f, "Not supported: {}", s),
            PlatformError::InitFailed(s) => write!(f, "Init failed: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Key event as forwarded by the terminal widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The data the key produced (e.g. "a", "\r", "\x7f")
    pub key: String,
    /// Raw DOM key code (13 = Enter, 8 = Backspace)
    pub key_code: u32,
    /// Modifier keys
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub const ENTER: u32 = 13;
    pub const BACKSPACE: u32 = 8;

    /// A plain key press with no modifiers held
    pub fn plain(key: impl Into<String>, key_code: u32) -> Self {
        Self {
            key: key.into(),
            key_code,
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    /// A single typed character, as the widget reports it
    pub fn char(ch: char) -> Self {
        let mut event = Self::plain(ch.to_string(), ch.to_ascii_uppercase() as u32);
        event.shift = ch.is_uppercase();
        event
    }

    pub fn enter() -> Self {
        Self::plain("\r", Self::ENTER)
    }

    pub fn backspace() -> Self {
        Self::plain("\x7f", Self::BACKSPACE)
    }

    /// Is Alt, Ctrl or Meta held? Shift alone does not count.
    pub fn has_modifier(&self) -> bool {
        self.alt || self.ctrl || self.meta
    }
}

/// A terminal rendering surface
///
/// The view owns its scrollback; callers only write text into it, clear it
/// and ask it to refit. Reading lines back and saving files exist for the
/// `download` command.
pub trait TerminalView {
    // ===== Output =====

    /// Write text at the cursor
    fn write(&mut self, text: &str);

    /// Write text followed by a line break
    fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\r\n");
    }

    /// Clear the scrollback, keeping the cursor line
    fn clear(&mut self);

    // ===== Geometry =====

    /// Refit the view to its container
    fn fit(&mut self) {}

    // ===== Buffer access =====

    /// Number of lines in the active buffer
    fn line_count(&self) -> usize;

    /// Text of buffer line `index`, trailing whitespace trimmed
    fn line(&self, index: usize) -> Option<String>;

    /// Offer `contents` to the user as a file
    fn save_file(&mut self, name: &str, mime: &str, contents: &str) -> PlatformResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_constructors() {
        assert_eq!(KeyEvent::enter().key_code, 13);
        assert_eq!(KeyEvent::backspace().key_code, 8);

        let a = KeyEvent::char('a');
        assert_eq!(a.key, "a");
        assert!(!a.shift);
        assert!(KeyEvent::char('A').shift);
    }

    #[test]
    fn test_shift_is_not_a_modifier() {
        let mut event = KeyEvent::char('A');
        assert!(!event.has_modifier());
        event.ctrl = true;
        assert!(event.has_modifier());
    }

    /// Only the required methods; `fit` and `writeln` come from the trait
    struct LinesOnly(Vec<String>);

    impl TerminalView for LinesOnly {
        fn write(&mut self, text: &str) {
            for (i, part) in text.split("\r\n").enumerate() {
                if i > 0 {
                    self.0.push(String::new());
                }
                if let Some(last) = self.0.last_mut() {
                    last.push_str(part);
                }
            }
        }

        fn clear(&mut self) {
            let current = self.0.pop().unwrap_or_default();
            self.0 = vec![current];
        }

        fn line_count(&self) -> usize {
            self.0.len()
        }

        fn line(&self, index: usize) -> Option<String> {
            self.0.get(index).cloned()
        }

        fn save_file(&mut self, _name: &str, _mime: &str, _contents: &str) -> PlatformResult<()> {
            Err(PlatformError::NotSupported("downloads".into()))
        }
    }

    #[test]
    fn test_minimal_view_drives_a_session() {
        let mut d = crate::Dispatcher::new(LinesOnly(vec![String::new()]));
        d.start();
        d.submit_line("git status");
        d.resize();
        d.submit_line("download");

        let lines = &d.view().0;
        assert!(lines.iter().any(|l| l.contains("On branch main")));
        assert!(lines.iter().any(|l| l.contains("Not supported: downloads")));
        assert_eq!(lines.last().map(String::as_str), Some("$ "));
    }

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::Io("disk full".into());
        assert_eq!(err.to_string(), "I/O error: disk full");
        let err = PlatformError::NotSupported("downloads".into());
        assert_eq!(err.to_string(), "Not supported: downloads");
    }
}

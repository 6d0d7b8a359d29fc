//! Terminal configuration
//!
//! Presentation parameters for the widget plus the session text (prompt,
//! banner) and download behavior. Every field has a default, so a page can
//! pass a partial JSON object and override only what it cares about.

use serde::{Deserialize, Serialize};

/// Name of the file `download` produces
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "terminal-output.txt";

/// MIME type of the file `download` produces
pub const DOWNLOAD_MIME: &str = "text/plain";

/// Errors from loading a configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Not valid JSON, or wrong shape
    Parse(serde_json::Error),
    /// Parsed, but a value is unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Invalid(s) => write!(f, "invalid config: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Which part of the terminal buffer `download` exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadScope {
    /// Only buffer line 0
    #[default]
    FirstLine,
    /// Every line of the active buffer
    Scrollback,
}

/// Settings for the `download` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    pub scope: DownloadScope,
    pub filename: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            scope: DownloadScope::FirstLine,
            filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
        }
    }
}

/// Widget colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub foreground: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#1e1e1e".to_string(),
            foreground: "#ffffff".to_string(),
        }
    }
}

/// Everything the browser terminal needs to start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub cursor_blink: bool,
    pub font_size: u32,
    pub font_family: String,
    pub theme: Theme,
    /// Written before every input line
    pub prompt: String,
    /// Banner lines written once at startup
    pub welcome: Vec<String>,
    pub download: DownloadOptions,
    /// Id of the element the terminal mounts into
    pub container_id: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cursor_blink: true,
            font_size: 14,
            font_family: "Consolas, monospace".to_string(),
            theme: Theme::default(),
            prompt: "$ ".to_string(),
            welcome: vec![
                "مرحباً بك في محاكي الأوامر السحابية 🚀".to_string(),
                "اكتب help للمساعدة".to_string(),
                String::new(),
            ],
            download: DownloadOptions::default(),
            container_id: "terminal".to_string(),
        }
    }
}

impl TerminalConfig {
    /// Parse and validate a JSON configuration. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TerminalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_size == 0 {
            return Err(ConfigError::Invalid("font_size must be positive".into()));
        }
        if self.download.filename.trim().is_empty() {
            return Err(ConfigError::Invalid("download.filename is empty".into()));
        }
        if self.container_id.is_empty() {
            return Err(ConfigError::Invalid("container_id is empty".into()));
        }
        Ok(())
    }

    /// The options object handed to the xterm.js `Terminal` constructor
    pub fn xterm_options(&self) -> serde_json::Value {
        serde_json::json!({
            "cursorBlink": self.cursor_blink,
            "fontSize": self.font_size,
            "fontFamily": self.font_family,
            "theme": {
                "background": self.theme.background,
                "foreground": self.theme.foreground,
            },
        })
    }
}

//! cloudsim CLI - the same canned session on a native terminal
//!
//! Run with: cargo run --bin cloudsim-cli [config.json]
//!
//! Each stdin line is replayed into the dispatcher as keystrokes followed by
//! Enter, so behavior matches the browser exactly. `download` writes
//! `terminal-output.txt` into the current directory.

use std::io::{self, BufRead, IsTerminal};

use cloudsim::platform::stdio::StdioView;
use cloudsim::{Dispatcher, KeyEvent, TerminalConfig};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                cloudsim::console_log!("cloudsim-cli: {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => TerminalConfig::default(),
    };

    // A tty already echoes what was typed; piped input should be echoed
    // so the transcript reads like a session.
    let interactive = io::stdin().is_terminal();

    let mut dispatcher = Dispatcher::with_config(StdioView::new(), &config);
    dispatcher.start();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                cloudsim::console_log!("cloudsim-cli: read error: {}", e);
                break;
            }
        };

        dispatcher.view_mut().set_muted(interactive);
        for ch in line.chars() {
            dispatcher.handle_key(&KeyEvent::char(ch));
        }
        dispatcher.view_mut().set_muted(false);
        dispatcher.handle_key(&KeyEvent::enter());

        if dispatcher.is_halted() {
            return;
        }
    }

    // EOF
    println!();
}

fn load_config(path: &str) -> Result<TerminalConfig, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(TerminalConfig::from_json(&json)?)
}

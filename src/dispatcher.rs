//! Line editor and command dispatcher
//!
//! Owns the line buffer and interprets every key event from the terminal
//! widget:
//!
//! - printable key: append to the buffer and echo
//! - Backspace: drop the last char and erase one column
//! - Enter: trim the buffer, run it, print the result and re-prompt
//!
//! `clear` and `exit` are handled here rather than through the command
//! table. After `exit` the session is inert until [`Dispatcher::reset`].

use std::cell::Cell;
use std::rc::Rc;

use crate::commands::CommandTable;
use crate::config::TerminalConfig;
use crate::platform::{KeyEvent, TerminalView};

/// Written when the user types `exit`
pub const FAREWELL: &str = "شكراً لاستخدام المحاكي!";

/// Erases the column left of the cursor
const ERASE: &str = "\x08 \x08";

/// Where the line editor is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Prompt written, buffer empty
    Idle,
    /// At least one char typed since the prompt
    Buffering,
    /// Between Enter and the next prompt
    Dispatching,
    /// `exit` was run; keys are ignored
    Halted,
}

/// What a submitted line turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// Blank after trimming; nothing ran
    Empty,
    Cleared,
    Exited,
    /// A command table entry produced output
    Ran,
    NotFound,
}

/// Dispatch errors. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    CommandNotFound(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::CommandNotFound(cmd) => write!(f, "خطأ: الأمر '{}' غير موجود", cmd),
        }
    }
}

impl std::error::Error for DispatchError {}

/// A key event, reduced to what the line editor cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Enter,
    Backspace,
    Text(String),
    Ignored,
}

impl Input {
    /// Classify a widget key event.
    ///
    /// Enter and Backspace are recognised by key code whatever the
    /// modifiers. Anything else counts as text only with no Alt/Ctrl/Meta
    /// held and no control characters in it (arrows and function keys
    /// arrive as escape sequences).
    pub fn from_key(event: &KeyEvent) -> Self {
        match event.key_code {
            KeyEvent::ENTER => Input::Enter,
            KeyEvent::BACKSPACE => Input::Backspace,
            _ if event.has_modifier() => Input::Ignored,
            _ if event.key.is_empty() || event.key.chars().any(char::is_control) => Input::Ignored,
            _ => Input::Text(event.key.clone()),
        }
    }
}

/// Result of handling one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Text appended to the buffer and echoed
    Echoed(String),
    /// One char removed
    Erased,
    /// A line was submitted
    Submitted { command: String, status: CommandStatus },
    /// Nothing happened
    Ignored,
}

/// Read-only handle on a dispatcher's [`LineState`].
///
/// Producers never see the dispatcher itself; a producer that needs to know
/// where the editor is captures one of these.
#[derive(Debug, Clone)]
pub struct StateWatch(Rc<Cell<LineState>>);

impl StateWatch {
    pub fn get(&self) -> LineState {
        self.0.get()
    }
}

/// The line editor
pub struct Dispatcher<V: TerminalView> {
    view: V,
    table: CommandTable,
    buffer: String,
    state: Rc<Cell<LineState>>,
    prompt: String,
    welcome: Vec<String>,
}

impl<V: TerminalView> Dispatcher<V> {
    pub fn new(view: V) -> Self {
        Self::with_config(view, &TerminalConfig::default())
    }

    pub fn with_config(view: V, config: &TerminalConfig) -> Self {
        let mut dispatcher =
            Self::with_table(view, CommandTable::with_download(config.download.clone()));
        dispatcher.prompt = config.prompt.clone();
        dispatcher.welcome = config.welcome.clone();
        dispatcher
    }

    /// Use a custom command table, default prompt and no banner
    pub fn with_table(view: V, table: CommandTable) -> Self {
        Self {
            view,
            table,
            buffer: String::new(),
            state: Rc::new(Cell::new(LineState::Idle)),
            prompt: TerminalConfig::default().prompt,
            welcome: Vec::new(),
        }
    }

    /// Write the banner and the first prompt
    pub fn start(&mut self) {
        for line in &self.welcome {
            self.view.writeln(line);
        }
        self.write_prompt();
    }

    /// Handle one key event from the widget
    pub fn handle_key(&mut self, event: &KeyEvent) -> DispatchOutcome {
        self.handle_input(Input::from_key(event))
    }

    pub fn handle_input(&mut self, input: Input) -> DispatchOutcome {
        if self.is_halted() {
            return DispatchOutcome::Ignored;
        }

        match input {
            Input::Enter => self.submit(),
            Input::Backspace => {
                if self.buffer.pop().is_none() {
                    return DispatchOutcome::Ignored;
                }
                self.view.write(ERASE);
                if self.buffer.is_empty() {
                    self.state.set(LineState::Idle);
                }
                DispatchOutcome::Erased
            }
            Input::Text(text) => {
                self.buffer.push_str(&text);
                self.view.write(&text);
                self.state.set(LineState::Buffering);
                DispatchOutcome::Echoed(text)
            }
            Input::Ignored => DispatchOutcome::Ignored,
        }
    }

    /// Type `text` then press Enter
    pub fn submit_line(&mut self, text: &str) -> DispatchOutcome {
        for ch in text.chars() {
            self.handle_key(&KeyEvent::char(ch));
        }
        self.handle_key(&KeyEvent::enter())
    }

    /// Enter: run the buffer and re-prompt
    fn submit(&mut self) -> DispatchOutcome {
        self.view.writeln("");

        let command = self.buffer.trim().to_string();
        self.buffer.clear();
        self.state.set(LineState::Dispatching);

        let status = match self.execute(&command) {
            Ok(status) => status,
            Err(err) => {
                self.view.writeln(&err.to_string());
                CommandStatus::NotFound
            }
        };

        if !self.is_halted() {
            self.state.set(LineState::Idle);
            self.write_prompt();
        }

        DispatchOutcome::Submitted { command, status }
    }

    /// Run an already-trimmed command line, writing its output.
    ///
    /// `exit` halts the session here, whether or not it came through Enter.
    /// No prompt is written.
    pub fn execute(&mut self, command: &str) -> Result<CommandStatus, DispatchError> {
        if command.is_empty() {
            return Ok(CommandStatus::Empty);
        }

        match command {
            "clear" => {
                self.view.clear();
                Ok(CommandStatus::Cleared)
            }
            "exit" => {
                self.view.writeln(FAREWELL);
                self.state.set(LineState::Halted);
                crate::console_log!("[session] exit");
                Ok(CommandStatus::Exited)
            }
            _ => {
                let output = self.table.run(command, &mut self.view);
                match output {
                    Some(output) => {
                        self.view.writeln(&output);
                        Ok(CommandStatus::Ran)
                    }
                    None => Err(DispatchError::CommandNotFound(command.to_string())),
                }
            }
        }
    }

    /// Window resized: refit the view
    pub fn resize(&mut self) {
        self.view.fit();
    }

    /// Leave the halted state (or drop a half-typed line) and re-prompt
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state.set(LineState::Idle);
        self.write_prompt();
    }

    fn write_prompt(&mut self) {
        self.view.write(&self.prompt);
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> LineState {
        self.state.get()
    }

    pub fn watch_state(&self) -> StateWatch {
        StateWatch(self.state.clone())
    }

    pub fn is_halted(&self) -> bool {
        self.state.get() == LineState::Halted
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut CommandTable {
        &mut self.table
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryView;

    fn dispatcher() -> Dispatcher<MemoryView> {
        let mut d = Dispatcher::new(MemoryView::new());
        d.start();
        d.view_mut().take_output();
        d
    }

    fn type_str(d: &mut Dispatcher<MemoryView>, text: &str) {
        for ch in text.chars() {
            d.handle_key(&KeyEvent::char(ch));
        }
    }

    #[test]
    fn test_start_writes_banner_and_prompt() {
        let mut d = Dispatcher::new(MemoryView::new());
        d.start();
        let screen = d.view().screen();
        assert_eq!(screen[0], "مرحباً بك في محاكي الأوامر السحابية 🚀");
        assert_eq!(screen[1], "اكتب help للمساعدة");
        assert_eq!(screen[2], "");
        assert_eq!(screen[3], "$");
        assert!(d.view().output().ends_with("\r\n$ "));
        assert_eq!(d.state(), LineState::Idle);
    }

    #[test]
    fn test_typing_echoes_and_buffers() {
        let mut d = dispatcher();
        assert_eq!(d.handle_key(&KeyEvent::char('l')), DispatchOutcome::Echoed("l".into()));
        type_str(&mut d, "s -la");
        assert_eq!(d.buffer(), "ls -la");
        assert_eq!(d.view().output(), "ls -la");
        assert_eq!(d.state(), LineState::Buffering);
    }

    #[test]
    fn test_modifier_keys_ignored() {
        let mut d = dispatcher();
        for flag in 0..3 {
            let mut event = KeyEvent::char('c');
            match flag {
                0 => event.ctrl = true,
                1 => event.alt = true,
                _ => event.meta = true,
            }
            assert_eq!(d.handle_key(&event), DispatchOutcome::Ignored);
        }
        assert_eq!(d.buffer(), "");
        assert_eq!(d.view().output(), "");
    }

    #[test]
    fn test_escape_sequences_ignored() {
        let mut d = dispatcher();
        let arrow_up = KeyEvent::plain("\x1b[A", 38);
        assert_eq!(d.handle_key(&arrow_up), DispatchOutcome::Ignored);
        let tab = KeyEvent::plain("\t", 9);
        assert_eq!(d.handle_key(&tab), DispatchOutcome::Ignored);
        assert_eq!(d.buffer(), "");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut d = dispatcher();
        assert_eq!(d.handle_key(&KeyEvent::backspace()), DispatchOutcome::Ignored);
        assert_eq!(d.buffer(), "");
        assert_eq!(d.view().output(), "");
        assert_eq!(d.state(), LineState::Idle);
    }

    #[test]
    fn test_backspace_erases_one_char() {
        let mut d = dispatcher();
        type_str(&mut d, "ab");
        assert_eq!(d.handle_key(&KeyEvent::backspace()), DispatchOutcome::Erased);
        assert_eq!(d.buffer(), "a");
        assert!(d.view().output().ends_with("\x08 \x08"));
        assert_eq!(d.view().current_line(), "$ a ");

        d.handle_key(&KeyEvent::backspace());
        assert_eq!(d.state(), LineState::Idle);
    }

    #[test]
    fn test_backspace_handles_multibyte() {
        let mut d = dispatcher();
        type_str(&mut d, "مرحبا");
        d.handle_key(&KeyEvent::backspace());
        assert_eq!(d.buffer(), "مرحب");
    }

    #[test]
    fn test_known_command_output_then_prompt() {
        let mut d = dispatcher();
        type_str(&mut d, "docker ps");
        d.view_mut().take_output();

        let outcome = d.handle_key(&KeyEvent::enter());
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: "docker ps".into(), status: CommandStatus::Ran }
        );

        let expected = d.table().run("docker ps", &mut MemoryView::new()).unwrap();
        assert_eq!(d.view().output(), format!("\r\n{}\r\n$ ", expected));
        assert_eq!(d.buffer(), "");
        assert_eq!(d.state(), LineState::Idle);
    }

    #[test]
    fn test_input_is_trimmed() {
        let mut d = dispatcher();
        let outcome = d.submit_line("   git status  ");
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: "git status".into(), status: CommandStatus::Ran }
        );
    }

    #[test]
    fn test_unknown_command() {
        let mut d = dispatcher();
        type_str(&mut d, "kubectl get pods");
        d.view_mut().take_output();

        let outcome = d.handle_key(&KeyEvent::enter());
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted {
                command: "kubectl get pods".into(),
                status: CommandStatus::NotFound
            }
        );
        assert_eq!(
            d.view().output(),
            "\r\nخطأ: الأمر 'kubectl get pods' غير موجود\r\n$ "
        );
    }

    #[test]
    fn test_empty_line_only_reprompts() {
        let mut d = dispatcher();
        type_str(&mut d, "   ");
        d.view_mut().take_output();
        let outcome = d.handle_key(&KeyEvent::enter());
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: String::new(), status: CommandStatus::Empty }
        );
        assert_eq!(d.view().output(), "\r\n$ ");
    }

    #[test]
    fn test_clear() {
        let mut d = dispatcher();
        d.submit_line("gcloud config list");
        assert!(d.view().line_count() > 5);

        let outcome = d.submit_line("clear");
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: "clear".into(), status: CommandStatus::Cleared }
        );
        assert_eq!(d.view().clear_count(), 1);
        assert_eq!(d.view().screen(), vec!["$"]);
    }

    #[test]
    fn test_exit_halts() {
        let mut d = dispatcher();
        type_str(&mut d, "exit");
        d.view_mut().take_output();

        let outcome = d.handle_key(&KeyEvent::enter());
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: "exit".into(), status: CommandStatus::Exited }
        );
        assert_eq!(d.view().output(), format!("\r\n{}\r\n", FAREWELL));
        assert!(d.is_halted());

        // Inert afterwards
        assert_eq!(d.handle_key(&KeyEvent::char('x')), DispatchOutcome::Ignored);
        assert_eq!(d.handle_key(&KeyEvent::enter()), DispatchOutcome::Ignored);
        assert_eq!(d.view().output(), format!("\r\n{}\r\n", FAREWELL));
    }

    #[test]
    fn test_reset_after_exit() {
        let mut d = dispatcher();
        d.submit_line("exit");
        d.view_mut().take_output();

        d.reset();
        assert_eq!(d.state(), LineState::Idle);
        assert_eq!(d.view().output(), "$ ");
        assert!(matches!(
            d.submit_line("help"),
            DispatchOutcome::Submitted { status: CommandStatus::Ran, .. }
        ));
    }

    #[test]
    fn test_git_sequence() {
        let mut d = dispatcher();
        for ch in ['g', 'i', 't'] {
            d.handle_key(&KeyEvent::char(ch));
        }
        d.handle_key(&KeyEvent::backspace());
        d.handle_key(&KeyEvent::backspace());
        for ch in ['i', 't'] {
            d.handle_key(&KeyEvent::char(ch));
        }
        assert_eq!(d.buffer(), "git");

        let outcome = d.handle_key(&KeyEvent::enter());
        assert_eq!(
            outcome,
            DispatchOutcome::Submitted { command: "git".into(), status: CommandStatus::NotFound }
        );
        assert!(d.view().output().contains("خطأ: الأمر 'git' غير موجود"));
    }

    #[test]
    fn test_ctrl_enter_still_submits() {
        let mut d = dispatcher();
        type_str(&mut d, "help");
        let mut enter = KeyEvent::enter();
        enter.ctrl = true;
        assert!(matches!(d.handle_key(&enter), DispatchOutcome::Submitted { .. }));
    }

    #[test]
    fn test_resize_fits_view() {
        let mut d = dispatcher();
        d.resize();
        d.resize();
        assert_eq!(d.view().fit_count(), 2);
        assert_eq!(d.view().output(), "");
    }

    #[test]
    fn test_custom_producer_reads_view() {
        use std::cell::Cell;
        use std::rc::Rc;

        let seen = Rc::new(Cell::new(0));
        let seen_in_producer = seen.clone();
        let mut table = CommandTable::empty();
        table.register("count", move |view| {
            seen_in_producer.set(seen_in_producer.get() + 1);
            format!("{} lines", view.line_count())
        });

        let mut d = Dispatcher::with_table(MemoryView::new(), table);
        d.start();
        d.submit_line("count");
        assert_eq!(seen.get(), 1);
        assert!(d.view().output().contains("2 lines"));
    }

    #[test]
    fn test_producer_sees_dispatching() {
        let mut d = dispatcher();
        let watch = d.watch_state();
        d.table_mut().register("state", move |_| format!("{:?}", watch.get()));

        d.submit_line("state");
        assert!(d.view().output().contains("\r\nDispatching\r\n"));
        assert_eq!(d.state(), LineState::Idle);
    }

    #[test]
    fn test_watch_follows_editor() {
        let mut d = dispatcher();
        let watch = d.watch_state();
        assert_eq!(watch.get(), LineState::Idle);
        d.handle_key(&KeyEvent::char('h'));
        assert_eq!(watch.get(), LineState::Buffering);
        d.handle_key(&KeyEvent::backspace());
        d.submit_line("exit");
        assert_eq!(watch.get(), LineState::Halted);
    }

    #[test]
    fn test_execute_exit_halts_without_prompt() {
        let mut d = dispatcher();
        assert_eq!(d.execute("exit"), Ok(CommandStatus::Exited));
        assert!(d.is_halted());
        assert_eq!(d.view().output(), format!("{}\r\n", FAREWELL));
        assert_eq!(d.handle_key(&KeyEvent::char('x')), DispatchOutcome::Ignored);
    }

    #[test]
    fn test_execute_outside_submit_keeps_state() {
        let mut d = dispatcher();
        assert_eq!(d.execute("help"), Ok(CommandStatus::Ran));
        assert_eq!(d.state(), LineState::Idle);
        assert_eq!(d.execute("nope"), Err(DispatchError::CommandNotFound("nope".into())));
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::CommandNotFound("ls".into());
        assert_eq!(err.to_string(), "خطأ: الأمر 'ls' غير موجود");
    }
}

//! Interactive prompt loop over stdin.
//!
//! Plain lines are prompts. Lines starting with `:` are commands.

use crate::catalog::{default_style, find_style, StyleDescriptor, EXAMPLE_PROMPT, STYLES};
use crate::error::Result;
use crate::history::{GeneratedImageRecord, HistoryPersistence};
use crate::image::{AspectRatio, ImageProvider};
use crate::session::{Session, SubmitOutcome};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const HELP: &str = "\
commands:
  <text>            generate an image from <text>
  :style <id>       switch style (see :styles)
  :styles           list styles
  :ratio <w:h>      switch aspect ratio (1:1, 3:4, 4:3, 9:16, 16:9)
  :retry            generate again with the last prompt
  :example          generate the sample prompt
  :history          list history, newest first
  :select <n|id>    show a history entry
  :save [path]      save the current image
  :clear            clear history
  :status           show state, style and ratio
  :help             this text
  :quit             exit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate from this prompt.
    Prompt(String),
    /// Switch style by id.
    Style(String),
    /// List styles.
    Styles,
    /// Switch aspect ratio.
    Ratio(String),
    /// Regenerate the last submission.
    Retry,
    /// Submit the sample prompt.
    Example,
    /// List history.
    History,
    /// Select a history entry by 1-based index or id.
    Select(String),
    /// Save the current image.
    Save(Option<PathBuf>),
    /// Clear history.
    Clear,
    /// Show status.
    Status,
    /// Show help.
    Help,
    /// Exit.
    Quit,
    /// Unrecognized `:` command.
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Prompt(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let cmd = match (name, arg) {
        ("style", id) if !id.is_empty() => Command::Style(id.to_string()),
        ("styles", _) => Command::Styles,
        ("ratio", r) if !r.is_empty() => Command::Ratio(r.to_string()),
        ("retry", _) => Command::Retry,
        ("example", _) => Command::Example,
        ("history", _) => Command::History,
        ("select", sel) if !sel.is_empty() => Command::Select(sel.to_string()),
        ("save", "") => Command::Save(None),
        ("save", path) => Command::Save(Some(PathBuf::from(path))),
        ("clear", _) => Command::Clear,
        ("status", _) => Command::Status,
        ("help", _) | ("?", _) => Command::Help,
        ("quit", _) | ("q", _) | ("exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(cmd)
}

/// What the shell prints after a command.
#[derive(Debug, Default)]
pub struct Reply {
    /// Text to print.
    pub text: String,
    /// True if the loop should stop.
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

/// Interactive front end over a [`Session`].
pub struct Shell<P, S> {
    session: Session<P, S>,
    style: &'static StyleDescriptor,
    aspect_ratio: AspectRatio,
    output_dir: PathBuf,
}

impl<P: ImageProvider, S: HistoryPersistence> Shell<P, S> {
    /// Wraps a session. Saved images default to `output_dir`.
    pub fn new(session: Session<P, S>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            session,
            style: default_style(),
            aspect_ratio: AspectRatio::default(),
            output_dir: output_dir.into(),
        }
    }

    /// Starts with the given style and ratio.
    pub fn with_selection(mut self, style: &'static StyleDescriptor, ratio: AspectRatio) -> Self {
        self.style = style;
        self.aspect_ratio = ratio;
        self
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<P, S> {
        &self.session
    }

    /// Runs one command.
    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Prompt(prompt) => self.generate(&prompt).await,
            Command::Example => {
                let mut reply = self.generate(EXAMPLE_PROMPT).await;
                reply.text = format!("prompt: {EXAMPLE_PROMPT}\n{}", reply.text);
                reply
            }
            Command::Retry => {
                let outcome = self.session.regenerate().await;
                self.describe(outcome, "nothing to retry yet")
            }
            Command::Style(id) => match find_style(&id) {
                Some(style) => {
                    self.style = style;
                    Reply::text(format!("style: {} ({})", style.display_name, style.id))
                }
                None => Reply::text(format!("unknown style '{id}', see :styles")),
            },
            Command::Styles => Reply::text(styles_table(self.style)),
            Command::Ratio(r) => match r.parse::<AspectRatio>() {
                Ok(ratio) => {
                    self.aspect_ratio = ratio;
                    Reply::text(format!("aspect ratio: {ratio}"))
                }
                Err(e) => Reply::text(e.to_string()),
            },
            Command::History => Reply::text(history_table(self.session.history().records())),
            Command::Select(sel) => self.select(&sel),
            Command::Save(path) => self.save(path).await,
            Command::Clear => {
                self.session.clear_history();
                Reply::text("history cleared")
            }
            Command::Status => Reply::text(self.status()),
            Command::Help => Reply::text(HELP),
            Command::Quit => Reply {
                text: String::new(),
                quit: true,
            },
            Command::Unknown(line) => Reply::text(format!("unknown command '{line}', try :help")),
        }
    }

    /// Reads commands from stdin until EOF or `:quit`.
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        stdout
            .write_all(format!("{}\ntype :help for commands\n", self.status()).as_bytes())
            .await?;
        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };
            if matches!(command, Command::Prompt(_) | Command::Example | Command::Retry) {
                stdout.write_all(b"generating...\n").await?;
                stdout.flush().await?;
            }

            let reply = self.execute(command).await;
            if !reply.text.is_empty() {
                stdout.write_all(reply.text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            if reply.quit {
                break;
            }
        }
        Ok(())
    }

    async fn generate(&mut self, prompt: &str) -> Reply {
        let outcome = self
            .session
            .submit(prompt, self.style, self.aspect_ratio)
            .await;
        self.describe(outcome, "prompt is empty or a request is in flight")
    }

    fn describe(&self, outcome: SubmitOutcome, ignored: &str) -> Reply {
        // :retry reuses the last request's ratio, not the current selection
        let ratio = self.session.last_aspect_ratio().unwrap_or(self.aspect_ratio);
        match outcome {
            SubmitOutcome::Generated(record) => Reply::text(format!(
                "generated {} ({}, {ratio}); :save to keep it",
                record.id, record.style_name
            )),
            SubmitOutcome::Failed(e) => Reply::text(format!("error: {e}\n:retry to try again")),
            SubmitOutcome::Ignored => Reply::text(ignored),
        }
    }

    /// Selects by record id, falling back to a 1-based history position.
    fn select(&mut self, selector: &str) -> Reply {
        let id = match (self.session.find(selector), selector.parse::<usize>()) {
            (Some(record), _) => record.id.clone(),
            (None, Ok(n)) if n >= 1 => match self.session.history().records().get(n - 1) {
                Some(record) => record.id.clone(),
                None => return Reply::text(format!("no history entry #{n}")),
            },
            (None, _) => selector.to_string(),
        };
        if self.session.select_history_item(&id) {
            let current = self.session.current().map(|r| r.prompt.as_str()).unwrap_or_default();
            Reply::text(format!("showing {id}: {current}"))
        } else {
            Reply::text(format!("no history entry '{selector}'"))
        }
    }

    async fn save(&self, path: Option<PathBuf>) -> Reply {
        let Some(record) = self.session.current() else {
            return Reply::text("no image to save");
        };
        let path = path.unwrap_or_else(|| self.output_dir.join(record.download_filename()));
        match self.session.download(record, &path).await {
            Ok(bytes) => Reply::text(format!("saved {} ({bytes} bytes)", path.display())),
            Err(e) => Reply::text(format!("save failed: {e}")),
        }
    }

    fn status(&self) -> String {
        format!(
            "state: {} | style: {} | ratio: {} | history: {}/{} | provider: {}",
            self.session.state(),
            self.style.id,
            self.aspect_ratio,
            self.session.history().len(),
            self.session.history().capacity(),
            self.session.provider().name(),
        )
    }
}

/// Renders the style catalog, marking `selected`.
pub fn styles_table(selected: &StyleDescriptor) -> String {
    let mut out = String::new();
    for style in STYLES.iter() {
        let mark = if style.id == selected.id { '*' } else { ' ' };
        let _ = writeln!(out, "{mark} {:<13} {}", style.id, style.display_name);
    }
    out.trim_end().to_string()
}

/// Renders history records, newest first, numbered from 1.
pub fn history_table(records: &[GeneratedImageRecord]) -> String {
    if records.is_empty() {
        return "history is empty".to_string();
    }
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {}  [{}]  {}",
            i + 1,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.id,
            record.style_name,
            record.prompt
        );
    }
    out.trim_end().to_string()
}

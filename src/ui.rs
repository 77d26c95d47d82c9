//! Terminal user interface for the startup checks.
//!
//! The resolver talks to the user only through the [`Console`] trait so
//! tests can swap in [`MockConsole`] and assert on what would have been
//! printed.

use console::{style, Term};
use dialoguer::Input;
use std::io::{IsTerminal, Write};

use crate::error::{Result, ViewerError};

/// Trait for the console interactions the resolver needs.
pub trait Console {
    /// Print a plain line.
    fn message(&mut self, msg: &str);

    /// Print a success line.
    fn success(&mut self, msg: &str);

    /// Print a warning line.
    fn warning(&mut self, msg: &str);

    /// Print an error line.
    fn error(&mut self, msg: &str);

    /// Whether there is a terminal the user can answer a question on.
    fn is_interactive(&self) -> bool;

    /// Ask a free-form question and return the raw answer.
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Console backed by the real terminal.
///
/// Output goes to stdout. Answers are read from the keyboard, so prompting
/// needs stdin on a terminal plus a terminal to draw the prompt on: stdout
/// when it is one, stderr otherwise (`mdview | tee log` still asks).
pub struct TerminalConsole {
    term: Term,
    prompt: Option<Term>,
}

/// Stream the prompt is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptStream {
    Stdout,
    Stderr,
}

fn prompt_stream(stdin_tty: bool, stdout_tty: bool, stderr_tty: bool) -> Option<PromptStream> {
    match (stdin_tty, stdout_tty, stderr_tty) {
        (false, _, _) => None,
        (true, true, _) => Some(PromptStream::Stdout),
        (true, false, true) => Some(PromptStream::Stderr),
        (true, false, false) => None,
    }
}

impl TerminalConsole {
    pub fn new() -> Self {
        let term = Term::stdout();
        let stderr = Term::stderr();
        let stream = prompt_stream(
            std::io::stdin().is_terminal(),
            term.is_term(),
            stderr.is_term(),
        );
        tracing::debug!("Prompt stream: {:?}", stream);

        let prompt = match stream {
            Some(PromptStream::Stdout) => Some(term.clone()),
            Some(PromptStream::Stderr) => Some(stderr),
            None => None,
        };
        Self { term, prompt }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn message(&mut self, msg: &str) {
        writeln!(self.term, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        let line = style(msg).green().bold();
        writeln!(self.term, "{} {}", style("✅").green(), line).ok();
    }

    fn warning(&mut self, msg: &str) {
        let line = style(msg).yellow();
        writeln!(self.term, "{} {}", style("⚠️").yellow(), line).ok();
    }

    fn error(&mut self, msg: &str) {
        let line = style(msg).red().bold();
        writeln!(self.term, "{} {}", style("❌").red(), line).ok();
    }

    fn is_interactive(&self) -> bool {
        self.prompt.is_some()
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        let Some(prompt) = &self.prompt else {
            return Err(ViewerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no terminal to prompt on",
            )));
        };
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text_on(prompt)
            .map_err(|e| ViewerError::Io(e.into()))
    }
}

/// Recording console for tests.
///
/// Every line is captured by kind, and answers to [`Console::ask`] are
/// served from a queue. Asking with an empty queue is an error, which
/// makes an unexpected prompt fail loudly.
#[derive(Debug, Default)]
pub struct MockConsole {
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interactive console that answers the given replies in order.
    pub fn interactive(answers: &[&str]) -> Self {
        Self {
            interactive: true,
            answers: answers.iter().rev().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Questions that were asked, in order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Every captured line regardless of kind.
    pub fn all_output(&self) -> Vec<&str> {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .map(String::as_str)
            .collect()
    }
}

impl Console for MockConsole {
    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers.pop().ok_or_else(|| {
            ViewerError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no answer queued",
            ))
        })
    }
}

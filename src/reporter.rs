use crate::colors::*;
use std::cell::RefCell;

/// Sink for diagnostics. The resolution core never prints on its own.
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Extra detail, only surfaced when the user asked for it.
    fn debug(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Prints `[align-deps]`-prefixed lines; warnings and errors go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn prefix() -> String {
        paint(C_GRAY, "[align-deps]")
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{} {}", Self::prefix(), message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {} {}", Self::prefix(), paint(C_YELLOW, "warn"), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {} {}", Self::prefix(), paint(C_RED, "error"), message);
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            println!("{} {}", Self::prefix(), paint(C_DIM, message));
        }
    }
}

/// Records every message; tests assert on what was reported.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Level::Info)
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
}

//! Severity-tagged messages produced by a session

use std::fmt;

/// How a message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Regular feedback
    Log,
    /// Emphasized text such as names inside help output
    Highlight,
    /// A command failed; the session goes on
    Error,
    /// The session cannot continue
    Fatal,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

/// One piece of output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn log(text: impl Into<String>) -> Self {
        Self::new(Severity::Log, text)
    }

    pub fn highlight(text: impl Into<String>) -> Self {
        Self::new(Severity::Highlight, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn fatal(text: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, text)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything one input line produced
#[derive(Debug, Default)]
pub struct Outcome {
    pub messages: Vec<Message>,
    /// The user asked to leave, or a fatal error occurred
    pub quit: bool,
    /// The screen should be cleared before printing
    pub clear: bool,
}

impl Outcome {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity.is_error())
    }

    pub fn is_fatal(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Fatal)
    }
}

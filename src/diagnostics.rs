//! Structured compile diagnostics, mirroring the `[line N] error[ at X]:
//! message` text the compiler also writes to stderr.

use std::fmt;

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub line: u32,
    pub anchor: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] error", self.line)?;
        if let Some(anchor) = &self.anchor {
            write!(f, "{}", anchor)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Accumulates every diagnostic a compile run produced, in order, and
/// mirrors each one to stderr as it is recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

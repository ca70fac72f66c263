use chrono::{DateTime, Utc};
use std::fmt::{self, Display};
use tracing::{debug, info};

/// One line of the move log. Events are the non-move entries: board clears,
/// promotions, awakenings and the like.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub is_event: bool,
    pub timestamp: DateTime<Utc>,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// Append-only record of everything that happened in a session. Survives
/// board resets.
#[derive(Debug, Clone, Default)]
pub struct MoveLog {
    entries: Vec<LogEntry>,
}

impl MoveLog {
    pub fn new() -> Self {
        MoveLog::default()
    }

    pub fn record_move(&mut self, text: impl Into<String>) {
        self.push(text.into(), false);
    }

    pub fn record_event(&mut self, text: impl Into<String>) {
        self.push(text.into(), true);
    }

    fn push(&mut self, text: String, is_event: bool) {
        if is_event {
            info!(target: "roguechess::log", "{}", text);
        } else {
            debug!(target: "roguechess::log", "{}", text);
        }
        self.entries.push(LogEntry {
            text,
            is_event,
            timestamp: Utc::now(),
        });
    }

    /// Entries, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Log broadcasting.
//!
//! Engine events (pastes, refused exports, saved files) are echoed to stdout
//! and fanned out over a broadcast channel; `GET /api/logs` streams them to
//! the browser as Server-Sent Events.

use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::broadcast;

/// Entries kept for a slow SSE client before it starts skipping.
const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Console marker printed before the message.
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠️ ",
            LogLevel::Error => "❌",
        }
    }
}

/// One engine event as sent to SSE clients.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Print the entry and send it to every subscriber.
    pub fn log(&self, entry: LogEntry) {
        println!("   {} {}", entry.level.marker(), entry.message);

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn emit(level: LogLevel, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(level, msg));
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, msg);
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, msg);
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, msg);
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, msg);
}

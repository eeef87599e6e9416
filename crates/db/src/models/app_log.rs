//! Unified application log entity and DTOs.
//!
//! Log rows are append-only: there is no update path, and deletion happens
//! only through the retention-cleanup engine.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qrdeck_core::log::{LogLevel, LogType};
use qrdeck_core::types::{DbId, Timestamp};

/// A single application log entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    /// One of the `LogType` variants, stored as lowercase text.
    pub log_type: String,
    pub action: String,
    pub category: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    /// One of the `LogLevel` variants, stored as lowercase text.
    pub level: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a new log entry.
#[derive(Debug, Clone)]
pub struct NewAppLog {
    pub user_id: Option<DbId>,
    pub log_type: LogType,
    pub action: String,
    pub category: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub level: LogLevel,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAppLog {
    /// Minimal entry with the given type, action, and message at INFO level.
    pub fn new(log_type: LogType, action: &str, message: impl Into<String>) -> Self {
        Self {
            user_id: None,
            log_type,
            action: action.to_string(),
            category: log_type.as_str().to_string(),
            message: message.into(),
            metadata: None,
            level: LogLevel::Info,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn request_info(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip;
        self.user_agent = user_agent;
        self
    }
}

/// Filter parameters for querying logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub log_type: Option<LogType>,
    pub level: Option<LogLevel>,
    pub user_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    /// Case-insensitive substring match over action and message.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A page of log entries plus the total count for pagination.
#[derive(Debug, Serialize)]
pub struct LogPage {
    pub items: Vec<AppLog>,
    pub total: i64,
}

/// Count of log rows per type or level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogBucket {
    pub key: String,
    pub count: i64,
}

/// Aggregate statistics over the log table.
#[derive(Debug, Serialize)]
pub struct LogStats {
    pub total: i64,
    pub by_type: Vec<LogBucket>,
    pub by_level: Vec<LogBucket>,
    pub oldest: Option<Timestamp>,
    pub newest: Option<Timestamp>,
}

//! Log vocabulary shared by the unified log writer, the admin console, and
//! the retention-cleanup engine.
//!
//! Types and levels are stored as lowercase text in the database (CHECK
//! constraints in the migration mirror these variants), so both enums
//! round-trip through `as_str` / `FromStr`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of an application log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    /// HTTP request access entries written by the logging middleware.
    Access,
    /// Sign-in, sign-out, token refresh outcomes.
    Auth,
    /// Data mutations (create/update/delete of user-owned rows).
    Audit,
    /// Request or background-task failures.
    Error,
    /// Admin console actions (manual cleanup, exports).
    Admin,
    /// QR render events.
    QrGeneration,
    /// Background maintenance (retention sweeps, startup).
    System,
}

impl LogType {
    pub const ALL: [LogType; 7] = [
        LogType::Access,
        LogType::Auth,
        LogType::Audit,
        LogType::Error,
        LogType::Admin,
        LogType::QrGeneration,
        LogType::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Access => "access",
            LogType::Auth => "auth",
            LogType::Audit => "audit",
            LogType::Error => "error",
            LogType::Admin => "admin",
            LogType::QrGeneration => "qr_generation",
            LogType::System => "system",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(LogType::Access),
            "auth" => Ok(LogType::Auth),
            "audit" => Ok(LogType::Audit),
            "error" => Ok(LogType::Error),
            "admin" => Ok(LogType::Admin),
            "qr_generation" => Ok(LogType::QrGeneration),
            "system" => Ok(LogType::System),
            other => Err(format!("unknown log type: {other}")),
        }
    }
}

/// Severity of an application log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

//! Transactional session binding with explicit open/close lifecycle.

mod context;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use context::TransactionContext;

/// When writes made through a transaction context are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Commit right after every transactional write; the context groups
    /// session and isolation reuse, not cross-call atomicity
    #[default]
    PerStatement,
    /// Commit once when the context is closed
    OnClose,
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommitMode::PerStatement => "per_statement",
            CommitMode::OnClose => "on_close",
        })
    }
}

impl FromStr for CommitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_statement" => Ok(CommitMode::PerStatement),
            "on_close" => Ok(CommitMode::OnClose),
            other => Err(format!("unknown commit mode '{}'", other)),
        }
    }
}

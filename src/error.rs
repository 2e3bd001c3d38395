//! Pre-flight errors.
//!
//! Every variant here is detected before any session is opened. Failures that happen while an
//! action is running are plain [anyhow::Error]s and carry the host and action in their context.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a detfile or an invocation of it is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetfileError {
    #[error("missing detfile: {}", .0.display())]
    MissingConfiguration(PathBuf),

    #[error("no runnable actions in the detfile")]
    NoRunnableActions,

    #[error("not a valid action in the detfile: {0}")]
    UnknownAction(String),

    #[error("no hosts specified in the detfile environment")]
    MissingHosts,

    #[error("action defined more than once: {0}")]
    DuplicateAction(String),

    #[error("function \"{caller}\" calls undefined function \"{callee}\"")]
    UnknownFunction { caller: String, callee: String },

    #[error("recursive call chain: {}", .0.join(" -> "))]
    RecursiveCall(Vec<String>),

    #[error("no function named \"{0}\" in the detfile")]
    NoSuchFunction(String),

    #[error("invalid variable name: {0:?}")]
    InvalidVariable(String),
}

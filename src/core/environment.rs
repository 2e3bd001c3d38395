//! The hosts and credentials that actions run against.

use crate::error::DetfileError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `env` section of a detfile.
///
/// This type is typically parsed from a detfile, but it can be constructed programmatically as
/// well.
#[derive(Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Environment {
    /// The hosts every requested action runs on, in order.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// The user to log in as. If empty, SSH chooses (e.g. from `~/.ssh/config`).
    #[serde(skip_serializing_if = "str::is_empty", default)]
    pub user: String,

    /// The password for [Self::user]. Fed to `sudo` on the remote host.
    #[serde(skip_serializing_if = "str::is_empty", default)]
    pub pass: String,

    /// User-defined variables, substituted into steps when they run.
    ///
    /// Names must look like shell variable names (see [Environment::check_vars]). Order is preserved
    /// from the source file.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub vars: IndexMap<String, String>,
}

impl Environment {
    /// Creates an [Environment] with no variables.
    pub fn new(
        hosts: impl IntoIterator<Item = impl Into<String>>,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        Environment {
            hosts: hosts.into_iter().map(Into::into).collect(),
            user: user.into(),
            pass: pass.into(),
            vars: IndexMap::new(),
        }
    }

    /// Checks that there is at least one host to run on.
    pub fn validate(&self) -> Result<(), DetfileError> {
        match self.hosts.is_empty() {
            true => Err(DetfileError::MissingHosts),
            false => Ok(()),
        }
    }

    /// Checks that every variable name is a letter or underscore followed by letters, digits, and
    /// underscores.
    ///
    /// # Errors
    ///
    /// Returns [DetfileError::InvalidVariable] naming the first bad name.
    pub fn check_vars(&self) -> Result<(), DetfileError> {
        match self.vars.keys().find(|name| !is_variable_name(name)) {
            Some(name) => Err(DetfileError::InvalidVariable(name.clone())),
            None => Ok(()),
        }
    }
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// Keep the password out of logs and error messages.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pass = match self.pass.is_empty() {
            true => "",
            false => "<redacted>",
        };
        f.debug_struct("Environment")
            .field("hosts", &self.hosts)
            .field("user", &self.user)
            .field("pass", &pass)
            .field("vars", &self.vars)
            .finish()
    }
}

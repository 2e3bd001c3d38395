//! The interface between the engine and remote hosts.
//!
//! The engine never talks to a transport directly. It asks a [Connect] implementation for a
//! [SessionHandle] bound to one host, hands that handle to exactly one action, and closes it. The
//! production implementation lives in [ssh]; tests substitute recording fakes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;

#[cfg(feature = "openssh")]
pub mod ssh;

#[cfg(feature = "openssh")]
#[doc(inline)]
pub use ssh::{SshConnector, SshSession};

/// Opens sessions to hosts.
#[async_trait]
pub trait Connect<S: SessionHandle> {
    /// Connect to `host` as `user` and, on success, return a session bound to the host.
    async fn open(&mut self, host: &str, user: &str, password: &str) -> anyhow::Result<S>;
}

/// A live binding between one identity and one host. Actions do their work through this.
#[async_trait]
pub trait SessionHandle: Send {
    /// The host this session is bound to.
    fn host(&self) -> &str;

    /// The user this session logged in as. May be empty if SSH chose the user.
    fn user(&self) -> &str;

    /// Run a command through the remote user's shell.
    async fn run(&mut self, command: &str) -> anyhow::Result<Output>;

    /// Run a command as root via `sudo`, authenticating with the session's password.
    async fn sudo(&mut self, command: &str) -> anyhow::Result<Output>;

    /// Copy a local file to the host.
    async fn put(&mut self, local: &str, remote: &str) -> anyhow::Result<Output>;

    /// Copy a file from the host to the local machine.
    async fn get(&mut self, remote: &str, local: &str) -> anyhow::Result<Output>;

    /// Release the session. Calling this more than once is a no-op.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Expands a leading `~/` in a local path to the current user's home directory.
///
/// Paths without the prefix, and all paths when the home directory can't be determined, are
/// returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod expand_home {
        use super::*;

        #[test]
        fn expands_tilde_prefix() {
            let Some(home) = home::home_dir() else {
                return;
            };
            assert_eq!(home.join("keys/id"), expand_home("~/keys/id"));
        }

        #[test]
        fn leaves_other_paths_alone() {
            assert_eq!(PathBuf::from("/etc/motd"), expand_home("/etc/motd"));
            assert_eq!(PathBuf::from("motd"), expand_home("motd"));
            assert_eq!(PathBuf::from("~alice/motd"), expand_home("~alice/motd"));
        }
    }
}

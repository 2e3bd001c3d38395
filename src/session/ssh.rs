//! Provides sessions over SSH.
//!
//! Commands run over a multiplexed OpenSSH master connection. File transfers shell out to `scp` on
//! the local machine, pointed at the same master's control socket so they don't log in again.

use super::{expand_home, Connect, SessionHandle};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use openssh::{KnownHosts, Session, SessionBuilder, Stdio};
use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

// -S reads the password from stdin; an empty prompt keeps it out of captured stderr.
const SUDO_AUTHENTICATE: &str = "sudo -S -p '' -v";

/// Production implementation of [Connect].
#[derive(Clone, Debug, Default)]
pub struct SshConnector;

#[async_trait]
impl Connect<SshSession> for SshConnector {
    /// Connects to `host` through a new OpenSSH master connection.
    ///
    /// Login uses whatever `ssh` itself would: keys, the agent, and `~/.ssh/config`. `password` is
    /// not used to log in, since OpenSSH can't be fed one non-interactively; hosts that only accept
    /// password authentication are unreachable. It is kept for [SessionHandle::sudo].
    async fn open(&mut self, host: &str, user: &str, password: &str) -> anyhow::Result<SshSession> {
        let mut builder = SessionBuilder::default();
        builder.known_hosts_check(KnownHosts::Add);
        if !user.is_empty() {
            builder.user(user.to_owned());
        }

        debug!(host, user, "connecting");
        let session = builder
            .connect_mux(host)
            .await
            .with_context(|| format!("failed to connect to {host}"))?;
        debug!(host, "connected");

        Ok(SshSession {
            session: Some(session),
            host: host.to_owned(),
            user: user.to_owned(),
            password: password.to_owned(),
        })
    }
}

/// Production implementation of [SessionHandle].
pub struct SshSession {
    // None once closed.
    session: Option<Session>,
    host: String,
    user: String,
    password: String,
}

#[async_trait]
impl SessionHandle for SshSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn user(&self) -> &str {
        &self.user
    }

    async fn run(&mut self, command: &str) -> anyhow::Result<Output> {
        Ok(self.session()?.shell(command).output().await?)
    }

    async fn sudo(&mut self, command: &str) -> anyhow::Result<Output> {
        // The password goes to its own `sudo -v` so the command never sees it on stdin, even when
        // sudo doesn't ask (NOPASSWD rules, cached credentials).
        if !self.password.is_empty() {
            let output = self.authenticate_sudo().await?;
            if !output.status.success() {
                return Ok(output);
            }
        }

        Ok(self
            .session()?
            .shell(sudo_command(command)?)
            .stdin(Stdio::null())
            .output()
            .await?)
    }

    async fn put(&mut self, local: &str, remote: &str) -> anyhow::Result<Output> {
        let from = expand_home(local).into_os_string();
        let to = OsString::from(self.remote_path(remote));
        self.scp(from, to).await
    }

    async fn get(&mut self, remote: &str, local: &str) -> anyhow::Result<Output> {
        let from = OsString::from(self.remote_path(remote));
        let to = expand_home(local).into_os_string();
        self.scp(from, to).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        match self.session.take() {
            Some(session) => {
                debug!(host = %self.host, "closing connection");
                session
                    .close()
                    .await
                    .with_context(|| format!("failed to close session to {}", self.host))
            }
            None => Ok(()),
        }
    }
}

impl SshSession {
    /// Refreshes sudo's cached credentials on the host, feeding it the password on stdin.
    async fn authenticate_sudo(&self) -> anyhow::Result<Output> {
        let mut child = self
            .session()?
            .shell(SUDO_AUTHENTICATE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .await?;

        if let Some(mut stdin) = child.stdin().take() {
            stdin.write_all(self.password.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
        }

        Ok(child.wait_with_output().await?)
    }

    fn session(&self) -> anyhow::Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow!("session to {} is already closed", self.host))
    }

    /// Formats `path` as an `scp` remote path on this session's host.
    fn remote_path(&self, path: &str) -> String {
        match self.user.is_empty() {
            true => format!("{}:{path}", self.host),
            false => format!("{}@{}:{path}", self.user, self.host),
        }
    }

    /// Invokes `scp <from> <to>` on the local machine over this session's master connection.
    async fn scp(&self, from: OsString, to: OsString) -> anyhow::Result<Output> {
        let control_path = control_path_option(self.session()?.control_socket());
        Command::new("scp")
            .arg("-q")
            .arg("-o")
            .arg(control_path)
            .arg(&from)
            .arg(&to)
            .output()
            .await
            .with_context(|| format!("failed to run scp {from:?} {to:?}"))
    }
}

fn control_path_option(socket: &Path) -> OsString {
    let mut option = OsString::from("ControlPath=");
    option.push(socket);
    option
}

/// The remote command line that runs `command` as root without prompting.
///
/// `-n` makes sudo fail instead of prompting if [SUDO_AUTHENTICATE] didn't leave it credentials.
fn sudo_command(command: &str) -> anyhow::Result<String> {
    Ok(format!("sudo -n sh -c {}", shlex::try_quote(command)?))
}

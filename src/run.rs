//! Runs requested actions against every host in the environment.
//!
//! Execution is strictly sequential: one session is opened, used by exactly one action, and closed
//! before the next is opened. The close happens whether or not the action succeeded. The first
//! failure stops the run; nothing is retried and later hosts are not attempted.

use crate::core::{Action, Environment, Registry};
use crate::error::DetfileError;
#[cfg(feature = "openssh")]
use crate::session::SshConnector;
use crate::session::{Connect, SessionHandle};
use anyhow::Context;
use indexmap::IndexMap;
use report::Report;
#[cfg(feature = "openssh")]
use report::Reporter;
use tracing::{debug, info, warn};

pub mod report;

/// How multiple requested actions are paired with hosts.
///
/// Every action runs on every host either way, with one session per pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// For each host, run every action.
    #[default]
    Hosts,

    /// For each action, run it on every host.
    Actions,
}

/// What an action can see of the run besides its session.
pub struct RunContext<'r> {
    environment: &'r Environment,
    current_host: String,
    reporter: &'r dyn Report,
}

impl<'r> RunContext<'r> {
    pub fn new(environment: &'r Environment, reporter: &'r dyn Report) -> Self {
        RunContext {
            environment,
            current_host: String::new(),
            reporter,
        }
    }

    pub fn environment(&self) -> &'r Environment {
        self.environment
    }

    /// The host being processed. Empty before the first host.
    pub fn current_host(&self) -> &str {
        &self.current_host
    }

    pub fn reporter(&self) -> &'r dyn Report {
        self.reporter
    }

    /// Variables available for substitution: the environment's `vars`, then the built-ins `user`
    /// and `host`, which take precedence.
    pub fn vars(&self) -> IndexMap<String, String> {
        let mut vars = self.environment.vars.clone();
        vars.insert("user".to_owned(), self.environment.user.clone());
        vars.insert("host".to_owned(), self.current_host.clone());
        vars
    }

    fn set_current_host(&mut self, host: &str) {
        self.current_host.clear();
        self.current_host.push_str(host);
    }
}

/// Runs each action in `requested` on every host in `environment` over SSH, reporting to stdout.
#[cfg(feature = "openssh")]
pub async fn run<S: AsRef<str>>(
    requested: &[S],
    environment: &Environment,
    registry: &Registry,
    order: Order,
) -> anyhow::Result<()> {
    run_with(requested, environment, registry, order, SshConnector, &Reporter).await
}

/// Checks everything that can be checked before connecting to anything.
///
/// Requested names are checked before hosts, and hosts before variable names.
pub fn preflight<S: AsRef<str>>(
    requested: &[S],
    environment: &Environment,
    registry: &Registry,
) -> Result<(), DetfileError> {
    registry.validate(requested)?;
    environment.validate()?;
    environment.check_vars()
}

/// [run] with a caller-supplied transport and reporter.
pub async fn run_with<S, C, H, R>(
    requested: &[S],
    environment: &Environment,
    registry: &Registry,
    order: Order,
    mut connector: C,
    reporter: &R,
) -> anyhow::Result<()>
where
    S: AsRef<str>,
    C: Connect<H>,
    H: SessionHandle,
    R: Report,
{
    preflight(requested, environment, registry)?;

    let actions = requested
        .iter()
        .map(|name| {
            registry
                .get(name.as_ref())
                .ok_or_else(|| DetfileError::UnknownAction(name.as_ref().to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut context = RunContext::new(environment, reporter);

    match order {
        Order::Hosts => {
            for host in &environment.hosts {
                for action in &actions {
                    run_on_host(host, action, &mut context, &mut connector).await?;
                }
            }
        }
        Order::Actions => {
            for action in &actions {
                for host in &environment.hosts {
                    run_on_host(host, action, &mut context, &mut connector).await?;
                }
            }
        }
    }
    Ok(())
}

/// Opens a session to `host`, runs `action` with it, and closes it.
///
/// If both the action and the close fail, the action's error is returned and the close error is
/// logged.
async fn run_on_host<C, H>(
    host: &str,
    action: &Action,
    context: &mut RunContext<'_>,
    connector: &mut C,
) -> anyhow::Result<()>
where
    C: Connect<H>,
    H: SessionHandle,
{
    context.set_current_host(host);
    let environment = context.environment();
    let name = action.name();

    info!(host, action = name, "opening session");
    let mut session = connector
        .open(host, &environment.user, &environment.pass)
        .await
        .with_context(|| format!("could not open a session to {host} for action \"{name}\""))?;

    let outcome = async {
        context.reporter().starting(host, name)?;
        action.invoke(&mut session, context).await
    }
    .await;

    let closed = session.close().await;
    debug!(host, action = name, "session closed");

    match (outcome, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(err)) => {
            warn!(host, action = name, error = %format!("{err:#}"), "failed to close session");
            Err(err)
        }
        (Err(err), closed) => {
            warn!(host, action = name, error = %format!("{err:#}"), "action failed");
            if let Err(close_err) = closed {
                warn!(host, error = %close_err, "failed to close session after action failure");
            }
            Err(err.context(format!("action \"{name}\" failed on {host}")))
        }
    }
}

//! Run named actions on remote hosts.
//!
//! # Detfiles
//!
//! A detfile is a YAML file declaring the hosts to run on, the credentials to use, and a set of
//! functions. Functions marked with `action: true` can be run from the command line; the rest are
//! helpers that actions can `call`.
//!
//! ```yaml
//! env:
//!   hosts: [alpha, beta]
//!   user: root
//!   pass: hunter2
//! functions:
//!   motd:
//!     action: true
//!     doc: Install the message of the day.
//!     steps:
//!       - put: { from: motd, to: /tmp/motd }
//!       - sudo: mv /tmp/motd /etc/motd
//!       - call: verify
//!   verify:
//!     steps:
//!       - run: cat /etc/motd
//! ```
//!
//! # Program flow
//!
//! 1. The detfile is located ([config::locate]) and loaded ([core::Detfile::load]). Calls between
//!    functions are resolved here.
//!
//! 2. Marked functions become the [core::Registry]. A detfile with no marked functions is
//!    rejected.
//!
//! 3. The requested action names and the environment's hosts are checked ([run::preflight]). No
//!    connection is made until both pass.
//!
//! 4. For each requested action and host, the engine opens a [session::SessionHandle], invokes the
//!    action with it, and closes it, whether or not the action succeeded ([run::run_with]). The
//!    first failure ends the run.

pub mod config;
pub mod core;
pub mod error;
pub mod run;
pub mod session;

#[doc(inline)]
pub use error::DetfileError;

#[cfg(feature = "openssh")]
#[doc(inline)]
pub use run::run;

#[doc(inline)]
pub use run::{run_with, Order, RunContext};

//! Reports the progress of actions as they run on hosts.
//!
//! The [Reporter] methods are thin: they obtain writers and call a free function containing all the
//! formatting logic. The production [Reporter] locks stdout and stderr only for the duration of a
//! single report, so tests can substitute in-memory writers without any changes to the logic
//! under test.

use crate::core::Step;
use std::fmt::Display;
use std::io::{self, Write};
use std::process::Output;

/// Prints feedback about each action and step to keep the user informed.
pub trait Report: Send + Sync {
    /// Reports that an action is about to run on a host.
    fn starting(&self, host: &str, action: &str) -> io::Result<()>;

    /// Reports the outcome of one step.
    fn report(&self, host: &str, step: &Step, output: &Output) -> io::Result<()>;
}

/// The real, production-ready [Report] implementation. Uses the real stdout/stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reporter;

impl Report for Reporter {
    fn starting(&self, host: &str, action: &str) -> io::Result<()> {
        _starting(io::stdout().lock(), host, action)
    }

    fn report(&self, host: &str, step: &Step, output: &Output) -> io::Result<()> {
        _report(io::stdout().lock(), io::stderr().lock(), host, step, output)
    }
}

/// Generates a one-line identifier for a [Step], suitable for use as its title in user output.
pub fn title(step: &Step) -> String {
    use Step::*;
    match step {
        Run(command) => format!("run: {command}"),
        Sudo(command) => format!("sudo: {command}"),
        Put { from, to } => format!("put: {from} -> {to}"),
        Get { from, to } => format!("get: {from} -> {to}"),
        Call(name) => format!("call: {name}"),
    }
}

/// A testable function containing the logic for reporting that an action is starting.
pub fn _starting(mut stdout: impl Write, host: &str, action: &str) -> io::Result<()> {
    writeln!(stdout, "[{host}] Running {action}")
}

/// A testable function containing the logic for reporting the outcome of a [Step].
pub fn _report(
    mut stdout: impl Write,
    mut stderr: impl Write,
    host: &str,
    step: &Step,
    output: &Output,
) -> io::Result<()> {
    fn write_indented(
        mut writer: impl Write,
        header: impl Display,
        content: impl AsRef<str>,
    ) -> io::Result<()> {
        //                1234
        writeln!(writer, "    {header}")?;
        for line in content.as_ref().lines() {
            //                12345678
            writeln!(writer, "        {line}")?;
        }
        Ok(())
    }

    if output.status.success() {
        writeln!(stdout, "[{host}] Completed {}", title(step))?;
    } else {
        writeln!(stderr, "[{host}] Failed    {}", title(step))?;
    }

    if !output.stdout.is_empty() {
        write_indented(
            &mut stdout,
            "Captured stdout:",
            String::from_utf8_lossy(&output.stdout),
        )?;
    }

    if !output.stderr.is_empty() {
        write_indented(
            &mut stderr,
            "Captured stderr:",
            String::from_utf8_lossy(&output.stderr),
        )?;
    }

    if !output.status.success() {
        let exit_code_message = match output.status.code() {
            Some(i) => format!("exit code {i}"),
            None => "error".to_string(),
        };
        writeln!(stderr, "    Exited with {exit_code_message}")?;
    }
    Ok(())
}

#[cfg(test)]
mod test;

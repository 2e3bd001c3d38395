//! Types for representing detfiles.

use crate::core::action::Action;
use crate::core::environment::Environment;
use crate::core::registry::ListActions;
use crate::core::step::{Script, Step};
use crate::error::DetfileError;
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Represents a detfile: the hosts to run on and the functions that can run there.
///
/// This type is typically parsed from a detfile, but it can be constructed programmatically as
/// well. Programmatically constructed values should be checked with [Environment::check_vars] and
/// [Detfile::check_calls].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Detfile {
    /// The file from which this value was parsed (if any).
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// Hosts, credentials, and variables.
    #[serde(default)]
    pub env: Environment,

    /// Every function in the detfile, runnable or not.
    ///
    /// Order is preserved from the source file and determines the order actions are listed in.
    #[serde(default)]
    pub functions: IndexMap<String, Function>,
}

/// A named list of [Step]s in a detfile.
///
/// Only functions with [Self::action] set are runnable from the command line. The rest are
/// helpers, reachable through [Step::Call].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Function {
    /// Marks this function as runnable.
    #[serde(skip_serializing_if = "is_false", default)]
    pub action: bool,

    /// Free-form documentation. The first non-blank line is the summary shown in usage output.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub doc: Option<String>,

    /// What the function does, in order.
    #[serde(with = "serde_yaml::with::singleton_map_recursive", default)]
    pub steps: Vec<Step>,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl Detfile {
    /// Reads and parses the detfile at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("failed to read detfile {}", path.display()))?;
        let mut detfile: Detfile = yaml
            .parse()
            .with_context(|| format!("invalid detfile {}", path.display()))?;
        detfile.source = Some(path.to_owned());
        Ok(detfile)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Checks that every [Step::Call] names a function and that no function calls itself, directly
    /// or indirectly.
    pub fn check_calls(&self) -> Result<(), DetfileError> {
        for name in self.functions.keys() {
            self.resolve(name)?;
        }
        Ok(())
    }

    /// Returns the steps of the function `name` with every call replaced by the callee's steps.
    ///
    /// # Errors
    ///
    /// Returns [DetfileError::NoSuchFunction] if `name` is not a function in this detfile, and the
    /// errors of [Detfile::check_calls] for bad calls reachable from it.
    pub fn resolve(&self, name: &str) -> Result<Vec<Step>, DetfileError> {
        let mut steps = Vec::new();
        self.inline(name, &mut vec![], &mut steps)?;
        Ok(steps)
    }

    fn inline(
        &self,
        name: &str,
        chain: &mut Vec<String>,
        steps: &mut Vec<Step>,
    ) -> Result<(), DetfileError> {
        let Some(function) = self.functions.get(name) else {
            return Err(DetfileError::NoSuchFunction(name.to_owned()));
        };
        chain.push(name.to_owned());

        for step in &function.steps {
            match step {
                Step::Call(callee) => {
                    if !self.functions.contains_key(callee) {
                        return Err(DetfileError::UnknownFunction {
                            caller: name.to_owned(),
                            callee: callee.clone(),
                        });
                    }
                    if chain.contains(callee) {
                        let mut cycle = chain.clone();
                        cycle.push(callee.clone());
                        return Err(DetfileError::RecursiveCall(cycle));
                    }
                    self.inline(callee, chain, steps)?;
                }
                step => steps.push(step.clone()),
            }
        }

        chain.pop();
        Ok(())
    }
}

impl FromStr for Detfile {
    type Err = anyhow::Error;

    /// Parses a detfile from YAML and checks its variable names and calls.
    fn from_str(yaml: &str) -> anyhow::Result<Self> {
        let detfile: Detfile = serde_yaml::from_str(yaml)?;
        detfile.env.check_vars()?;
        detfile.check_calls()?;
        Ok(detfile)
    }
}

impl ListActions for Detfile {
    fn list_actions(&self) -> Result<Vec<Action>, DetfileError> {
        self.functions
            .iter()
            .filter(|(_, function)| function.action)
            .map(|(name, function)| {
                let script = Script::new(self.resolve(name)?);
                Ok(Action::new(name, function.doc.clone(), script))
            })
            .collect()
    }
}

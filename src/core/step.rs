//! The primitive operations a detfile action performs.

use crate::core::action::Invoke;
use crate::run::RunContext;
use crate::session::SessionHandle;
use anyhow::bail;
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

/// One operation in a detfile function, mapped onto a [SessionHandle] method.
///
/// # (De)serialization
///
/// Like other enums in detfiles, steps are written as single-key maps (`- run: uptime`). Fields
/// holding [Step]s must use `#[serde(with = "serde_yaml::with::singleton_map_recursive")]` to get
/// this notation instead of YAML tags.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Run a shell command as the login user.
    Run(String),

    /// Run a shell command as root via `sudo`.
    Sudo(String),

    /// Copy a local file to the host.
    Put { from: String, to: String },

    /// Copy a file from the host to the local machine.
    Get { from: String, to: String },

    /// Run another function's steps in place of this one.
    ///
    /// Calls are resolved when a detfile is loaded; a [Script] never contains one.
    Call(String),
}

impl Step {
    /// Returns a copy of this [Step] with variables substituted into every field.
    ///
    /// # Variable substitution
    ///
    /// There are two forms:
    ///
    /// 1. Simple substitution (`$var`) matches on word boundaries, so `$host.lan` matches the
    ///    variable `host`, but `$hostname` does not.
    /// 2. Braced substitution (`${var}`) matches exactly, e.g. `${host}name`.
    ///
    /// References to variables that don't exist are left unchanged, so shell variables on the
    /// remote host pass through as long as their names don't collide.
    ///
    /// Variables are substituted in order, so a value containing `$other` is itself expanded if
    /// `other` comes later. Relying on this is not recommended.
    pub fn compile(&self, vars: &IndexMap<String, String>) -> anyhow::Result<Step> {
        let mut step = self.clone();

        for (var, value) in vars {
            // A single regular expression for both forms, so a substituted value can't be
            // matched again by the second form.
            let var = regex::escape(var);
            let regex = Regex::new(&format!(r"\${var}\b|\$\{{{var}}}"))?;

            let replace = |s: &mut String| {
                *s = regex.replace_all(s, NoExpand(value)).into_owned();
            };

            use Step::*;
            match &mut step {
                Run(command) | Sudo(command) => replace(command),
                Put { from, to } | Get { from, to } => {
                    replace(from);
                    replace(to);
                }
                Call(_) => {}
            }
        }
        Ok(step)
    }
}

/// A sequence of [Step]s with all calls resolved. This is the body of every detfile action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Script { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[async_trait]
impl Invoke for Script {
    /// Runs each step in order. Stops at the first step that errors or exits non-zero.
    async fn invoke(
        &self,
        session: &mut dyn SessionHandle,
        context: &RunContext<'_>,
    ) -> anyhow::Result<()> {
        let vars = context.vars();

        for step in &self.steps {
            let step = step.compile(&vars)?;

            use Step::*;
            let output = match &step {
                Run(command) => session.run(command).await?,
                Sudo(command) => session.sudo(command).await?,
                Put { from, to } => session.put(from, to).await?,
                Get { from, to } => session.get(from, to).await?,
                Call(name) => bail!("unresolved call to \"{name}\""),
            };

            context.reporter().report(session.host(), &step, &output)?;

            if !output.status.success() {
                let exit_code_message = match output.status.code() {
                    Some(i) => format!("exit code {i}"),
                    None => "error".to_string(),
                };
                bail!("step exited with {exit_code_message}: {step:?}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    mod compile {
        use super::*;

        #[test]
        fn simple_substitution() {
            let step = Step::Run("echo $host".into());
            assert_eq!(
                Step::Run("echo alpha".into()),
                step.compile(&vars(&[("host", "alpha")])).unwrap(),
            );
        }

        #[test]
        fn simple_substitution_respects_word_boundaries() {
            let step = Step::Run("echo $hostname $host.lan".into());
            assert_eq!(
                Step::Run("echo $hostname alpha.lan".into()),
                step.compile(&vars(&[("host", "alpha")])).unwrap(),
            );
        }

        #[test]
        fn braced_substitution() {
            let step = Step::Get {
                from: "/etc/hostname".into(),
                to: "out/${host}name".into(),
            };
            assert_eq!(
                Step::Get {
                    from: "/etc/hostname".into(),
                    to: "out/alphaname".into(),
                },
                step.compile(&vars(&[("host", "alpha")])).unwrap(),
            );
        }

        #[test]
        fn unknown_variables_pass_through() {
            let step = Step::Sudo("echo $HOME ${PATH}".into());
            assert_eq!(step, step.compile(&vars(&[("host", "alpha")])).unwrap());
        }

        #[test]
        fn values_are_literal() {
            let step = Step::Run("echo $greeting".into());
            assert_eq!(
                Step::Run("echo cost: $1".into()),
                step.compile(&vars(&[("greeting", "cost: $1")])).unwrap(),
            );
        }

        #[test]
        fn both_put_fields() {
            let step = Step::Put {
                from: "files/$role.conf".into(),
                to: "/etc/${role}.conf".into(),
            };
            assert_eq!(
                Step::Put {
                    from: "files/web.conf".into(),
                    to: "/etc/web.conf".into(),
                },
                step.compile(&vars(&[("role", "web")])).unwrap(),
            );
        }
    }

    #[test]
    fn script_keeps_step_order() {
        let steps = vec![Step::Run("one".into()), Step::Sudo("two".into())];
        let script = Script::new(steps.clone());
        assert_eq!(steps, script.steps());
        assert!(Script::default().steps().is_empty());
    }

    #[test]
    fn deserializes_singleton_maps() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(with = "serde_yaml::with::singleton_map_recursive")]
            steps: Vec<Step>,
        }

        let yaml = "\
steps:
  - run: uptime
  - sudo: id
  - put:
      from: a
      to: b
  - get: { from: c, to: d }
  - call: cleanup
";
        let wrapper: Wrapper = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            vec![
                Step::Run("uptime".into()),
                Step::Sudo("id".into()),
                Step::Put {
                    from: "a".into(),
                    to: "b".into(),
                },
                Step::Get {
                    from: "c".into(),
                    to: "d".into(),
                },
                Step::Call("cleanup".into()),
            ],
            wrapper.steps,
        );
    }
}

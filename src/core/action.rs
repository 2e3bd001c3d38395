//! Types for representing runnable actions.

#[cfg(doc)]
use crate::core::registry::Registry;
use crate::run::RunContext;
use crate::session::SessionHandle;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// The summary shown for an [Action] that has no documentation.
pub const NO_DESCRIPTION: &str = "No description";

/// The body of an [Action]: something that can do work on a host through a session.
///
/// Implement this to define actions in Rust. Detfile actions are implemented by
/// [Script](crate::core::step::Script).
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Does this action's work on `session`'s host.
    ///
    /// The session is owned by the engine and is closed after this returns, whether or not it
    /// succeeds. `context` exposes the environment and the host currently being processed.
    async fn invoke(
        &self,
        session: &mut dyn SessionHandle,
        context: &RunContext<'_>,
    ) -> anyhow::Result<()>;
}

/// A named unit of remote work that the detfile's author marked as runnable.
///
/// [Action]s are discovered once, when the [Registry] is built, and never change afterward.
#[derive(Clone)]
pub struct Action {
    name: String,
    doc: Option<String>,
    callable: Arc<dyn Invoke>,
}

impl Action {
    pub fn new(name: impl Into<String>, doc: Option<String>, callable: impl Invoke + 'static) -> Self {
        Action {
            name: name.into(),
            doc,
            callable: Arc::new(callable),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full documentation, if any.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The first non-blank line of the documentation, trimmed, or [NO_DESCRIPTION].
    pub fn summary(&self) -> &str {
        self.doc
            .as_deref()
            .and_then(|doc| doc.lines().map(str::trim).find(|line| !line.is_empty()))
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Runs the action on `session`.
    pub async fn invoke(
        &self,
        session: &mut dyn SessionHandle,
        context: &RunContext<'_>,
    ) -> anyhow::Result<()> {
        self.callable.invoke(session, context).await
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::Noop;

    fn action(doc: Option<&str>) -> Action {
        Action::new("deploy", doc.map(str::to_owned), Noop)
    }

    mod summary {
        use super::*;

        #[test]
        fn defaults_without_doc() {
            assert_eq!(NO_DESCRIPTION, action(None).summary());
        }

        #[test]
        fn defaults_with_blank_doc() {
            assert_eq!(NO_DESCRIPTION, action(Some("  \n\t\n")).summary());
        }

        #[test]
        fn takes_first_line() {
            assert_eq!(
                "Deploy the banner.",
                action(Some("Deploy the banner.\nThen restart sshd.")).summary(),
            );
        }

        #[test]
        fn skips_leading_blank_lines_and_trims() {
            assert_eq!(
                "Deploy the banner.",
                action(Some("\n\n    Deploy the banner.   \n    Details.\n")).summary(),
            );
        }
    }

    #[test]
    fn doc_is_kept_whole() {
        let doc = "Deploy the banner.\nThen restart sshd.";
        assert_eq!(Some(doc), action(Some(doc)).doc());
        assert_eq!(None, action(None).doc());
    }

    #[test]
    fn debug_omits_callable() {
        let debug = format!("{:?}", action(Some("doc")));
        assert!(debug.starts_with("Action { name: \"deploy\", doc: Some(\"doc\")"));
    }
}

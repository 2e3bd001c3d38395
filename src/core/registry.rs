//! The catalog of runnable actions.

use crate::core::action::Action;
use crate::error::DetfileError;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::io::{self, Write};

/// A source of [Action]s, e.g. a loaded detfile.
///
/// Implementations return only the functions their author explicitly marked as runnable, in the
/// order they were defined.
pub trait ListActions {
    fn list_actions(&self) -> Result<Vec<Action>, DetfileError>;
}

impl ListActions for [Action] {
    fn list_actions(&self) -> Result<Vec<Action>, DetfileError> {
        Ok(self.to_vec())
    }
}

impl ListActions for Vec<Action> {
    fn list_actions(&self) -> Result<Vec<Action>, DetfileError> {
        self.as_slice().list_actions()
    }
}

/// The runnable [Action]s of a detfile, keyed by name in definition order.
#[derive(Clone, Debug)]
pub struct Registry {
    actions: IndexMap<String, Action>,
}

impl Registry {
    /// Builds the catalog from `source`.
    ///
    /// # Errors
    ///
    /// Returns [DetfileError::NoRunnableActions] if `source` has no actions, since nothing could
    /// ever run, and [DetfileError::DuplicateAction] if two actions share a name.
    pub fn discover<L: ListActions + ?Sized>(source: &L) -> Result<Self, DetfileError> {
        let mut actions = IndexMap::new();
        for action in source.list_actions()? {
            match actions.entry(action.name().to_owned()) {
                Entry::Occupied(entry) => {
                    return Err(DetfileError::DuplicateAction(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(action);
                }
            }
        }

        match actions.is_empty() {
            true => Err(DetfileError::NoRunnableActions),
            false => Ok(Registry { actions }),
        }
    }

    /// Returns `(name, summary)` for every action, in definition order.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.actions
            .values()
            .map(|action| (action.name(), action.summary()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`; an empty [Registry] can't be constructed.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    /// Checks that every name in `requested` is a known action.
    ///
    /// # Errors
    ///
    /// Returns [DetfileError::UnknownAction] naming the first unknown action.
    pub fn validate<S: AsRef<str>>(&self, requested: &[S]) -> Result<(), DetfileError> {
        match requested.iter().find(|name| !self.contains(name.as_ref())) {
            Some(name) => Err(DetfileError::UnknownAction(name.as_ref().to_owned())),
            None => Ok(()),
        }
    }

    /// Writes a usage line and the catalog, one `name - summary` line per action.
    pub fn write_usage(&self, mut writer: impl Write, program: &str) -> io::Result<()> {
        writeln!(writer, "USAGE: {program} <action>[..<action>]")?;
        writeln!(writer, "Valid actions for this detfile are:")?;
        for (name, summary) in self.describe() {
            writeln!(writer, "\t{name} - {summary}")?;
        }
        Ok(())
    }
}

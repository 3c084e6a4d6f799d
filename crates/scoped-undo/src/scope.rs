//! History scope keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an independent undo/redo history bucket.
///
/// Operations performed under one scope never affect another scope's stacks.
/// [`Scope::Default`] is used whenever a caller does not care to partition
/// history; named scopes isolate editing contexts such as separate panels.
/// A named scope can never collide with the default one, whatever its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scope {
    /// The scope used when no scope is given.
    #[default]
    Default,
    /// A caller-chosen named scope.
    Named(String),
}

impl Scope {
    /// Creates a named scope.
    pub fn named(name: impl Into<String>) -> Self {
        Scope::Named(name.into())
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Scope::Named(name.to_string())
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        Scope::Named(name)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Default => write!(f, "default"),
            Scope::Named(name) => write!(f, "{name}"),
        }
    }
}

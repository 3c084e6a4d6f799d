//! History record types.

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Identifier of a registered document.
///
/// Ids are created by the embedding application; the manager only stores
/// them and uses them as registry keys.
pub type DocumentId = String;

/// One completed transaction: which documents had an effective edit, plus a
/// human-readable label for history lists.
///
/// Created only by a successful `end_transaction`. Undo/redo move a change
/// between the two stacks of its scope; the record itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Optional label describing the transaction.
    pub description: Option<String>,
    /// Documents that reported an effective change, in dispatch order.
    pub ids: Vec<DocumentId>,
}

/// A [`Change`] together with the scope it was recorded under.
///
/// Returned by `end_transaction`, `undo` and `redo` so callers know both
/// what happened and which history bucket it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedChange {
    /// Optional label describing the transaction.
    pub description: Option<String>,
    /// Documents that participated in the change, in dispatch order.
    pub ids: Vec<DocumentId>,
    /// Scope whose stacks hold the change.
    pub scope: Scope,
}

impl CommittedChange {
    /// Pairs a change with the scope it resolved to.
    pub(crate) fn new(change: &Change, scope: &Scope) -> Self {
        Self {
            description: change.description.clone(),
            ids: change.ids.clone(),
            scope: scope.clone(),
        }
    }
}

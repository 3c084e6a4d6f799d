//! Per-document handle contract and the snapshot adapter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::scope::Scope;

/// Per-document undo/redo handle: the collaborator the manager fans
/// transactions out to.
///
/// An implementation tracks, per scope, whatever is needed to reverse and
/// reapply the edits made during a transaction. [`DocumentHandle`] is the
/// built-in snapshot-based implementation; engines with their own delta
/// tracking (CRDTs, operation logs) implement this trait directly.
pub trait UndoHandle {
    /// Stable identifier used as the registry key.
    fn doc_id(&self) -> &str;

    /// Begins recording local edits for later undo.
    fn start_transaction(&mut self) -> Result<()>;

    /// Stops recording.
    ///
    /// Returns `true` iff an effective, recordable change occurred during
    /// the transaction.
    fn end_transaction(&mut self, description: Option<&str>, scope: &Scope) -> Result<bool>;

    /// Reverses the most recent recorded change for `scope` on this document.
    fn undo(&mut self, scope: &Scope) -> Result<()>;

    /// Reapplies the most recently undone change for `scope`.
    fn redo(&mut self, scope: &Scope) -> Result<()>;
}

/// Shared, single-threaded reference to a registered handle.
pub type SharedHandle = Rc<RefCell<dyn UndoHandle>>;

/// Capability a raw document must offer to be wrapped by [`DocumentHandle`].
pub trait UndoableDocument {
    /// Cheap, comparable capture of the document content.
    type Snapshot: Clone + PartialEq;

    /// Stable identifier used as the registry key.
    fn doc_id(&self) -> &str;

    /// Captures the current content.
    fn snapshot(&self) -> Self::Snapshot;

    /// Restores previously captured content.
    fn restore(&mut self, snapshot: &Self::Snapshot);
}

/// Before/after snapshot pair recorded by one transaction.
#[derive(Debug, Clone)]
struct SnapshotPair<S> {
    before: S,
    after: S,
}

/// Undo/redo stacks for one scope, most recent on top.
struct ScopeStacks<S> {
    undo: Vec<SnapshotPair<S>>,
    redo: Vec<SnapshotPair<S>>,
}

impl<S> Default for ScopeStacks<S> {
    fn default() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }
}

/// Snapshot-based [`UndoHandle`] adapter for raw documents.
///
/// Records a before-snapshot at `start_transaction` and, when the content
/// actually changed by `end_transaction`, keeps the (before, after) pair on
/// a per-scope stack. Undo restores the before side, redo the after side.
///
/// Snapshots capture the whole document, so edits to the same document
/// interleaved across different scopes do not compose; scopes are meant to
/// partition documents (one per panel), not edits within one document.
///
/// The document stays behind the caller's own `Rc<RefCell<_>>` so it can be
/// edited directly between `start_transaction` and `end_transaction`.
pub struct DocumentHandle<D: UndoableDocument> {
    /// The wrapped document, shared with the caller.
    doc: Rc<RefCell<D>>,
    /// Registry key, cached from the document at wrap time.
    doc_id: String,
    /// Snapshot taken by the currently open transaction, if any.
    pending: Option<D::Snapshot>,
    /// Per-scope recorded snapshot pairs.
    scopes: HashMap<Scope, ScopeStacks<D::Snapshot>>,
}

impl<D: UndoableDocument> DocumentHandle<D> {
    /// Wraps a shared document.
    pub fn new(doc: Rc<RefCell<D>>) -> Self {
        let doc_id = doc.borrow().doc_id().to_string();
        Self {
            doc,
            doc_id,
            pending: None,
            scopes: HashMap::new(),
        }
    }

    /// A shared reference to the wrapped document.
    pub fn document(&self) -> Rc<RefCell<D>> {
        Rc::clone(&self.doc)
    }

    fn stacks(&mut self, scope: &Scope) -> &mut ScopeStacks<D::Snapshot> {
        self.scopes.entry(scope.clone()).or_default()
    }
}

impl<D: UndoableDocument> UndoHandle for DocumentHandle<D> {
    fn doc_id(&self) -> &str {
        &self.doc_id
    }

    fn start_transaction(&mut self) -> Result<()> {
        self.pending = Some(self.doc.borrow().snapshot());
        Ok(())
    }

    fn end_transaction(&mut self, _description: Option<&str>, scope: &Scope) -> Result<bool> {
        // Ending without a matching start records nothing.
        let Some(before) = self.pending.take() else {
            return Ok(false);
        };
        let after = self.doc.borrow().snapshot();
        if after == before {
            return Ok(false);
        }
        let stacks = self.stacks(scope);
        stacks.undo.push(SnapshotPair { before, after });
        stacks.redo.clear();
        Ok(true)
    }

    fn undo(&mut self, scope: &Scope) -> Result<()> {
        // The manager only dispatches replay to handles it recorded, so an
        // empty stack here means a stale or foreign scope. No-op.
        let Some(pair) = self.stacks(scope).undo.pop() else {
            return Ok(());
        };
        self.doc.borrow_mut().restore(&pair.before);
        self.stacks(scope).redo.push(pair);
        Ok(())
    }

    fn redo(&mut self, scope: &Scope) -> Result<()> {
        let Some(pair) = self.stacks(scope).redo.pop() else {
            return Ok(());
        };
        self.doc.borrow_mut().restore(&pair.after);
        self.stacks(scope).undo.push(pair);
        Ok(())
    }
}

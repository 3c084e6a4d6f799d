//! Multi-document transaction coordination and scoped history dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::change::{Change, CommittedChange, DocumentId};
use crate::config::HistoryConfig;
use crate::handle::{DocumentHandle, SharedHandle, UndoHandle, UndoableDocument};
use crate::scope::Scope;

/// Options for closing (or running) a transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    /// Human-readable label stored on the resulting history entry.
    pub description: Option<String>,
    /// History scope the entry is recorded under.
    pub scope: Scope,
    /// Documents participating in the transaction. `None` targets every
    /// registered document; ids that are not registered are skipped.
    pub dependencies: Option<Vec<DocumentId>>,
}

impl TransactionOptions {
    /// Options with just a description: default scope, all documents.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Options with just a scope: no description, all documents.
    pub fn scoped(scope: impl Into<Scope>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }
}

/// Coordinates undo/redo history across registered documents.
///
/// Callers register documents (or pre-built handles), delimit transactions
/// spanning any subset of them, and get one combined history entry per
/// transaction. Undo/redo replays against exactly the documents that
/// participated, and each [`Scope`] keeps its own independent pair of
/// stacks.
///
/// All state lives in the manager instance. The manager is single-threaded
/// (`Rc<RefCell<_>>` sharing) and every operation runs to completion before
/// returning. Interleaving transactions over overlapping document sets is
/// the caller's responsibility to avoid.
pub struct UndoManager {
    /// Registered handles keyed by document id.
    handles: HashMap<DocumentId, SharedHandle>,
    /// Document ids in registration order.
    order: Vec<DocumentId>,
    /// Per-scope undo stacks, oldest change first.
    undo_stacks: HashMap<Scope, Vec<Change>>,
    /// Per-scope redo stacks, most recently undone on top.
    redo_stacks: HashMap<Scope, Vec<Change>>,
    /// Configuration parameters.
    config: HistoryConfig,
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("documents", &self.order)
            .field("undo_scopes", &self.undo_stacks.len())
            .field("redo_scopes", &self.redo_stacks.len())
            .finish()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    /// Creates an empty manager with default configuration.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Creates an empty manager with a custom configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            handles: HashMap::new(),
            order: Vec::new(),
            undo_stacks: HashMap::new(),
            redo_stacks: HashMap::new(),
            config,
        }
    }

    // ── Handle registry ────────────────────────────────────────────────

    /// Registers a pre-built handle and returns it.
    ///
    /// A handle registered under an already-known document id replaces the
    /// previous one while keeping its original registration position. No
    /// history state is touched.
    pub fn add_handle(&mut self, handle: SharedHandle) -> SharedHandle {
        let doc_id = handle.borrow().doc_id().to_string();
        if !self.handles.contains_key(&doc_id) {
            self.order.push(doc_id.clone());
        }
        tracing::debug!("Registered undo handle for document {doc_id:?}");
        self.handles.insert(doc_id, Rc::clone(&handle));
        handle
    }

    /// Wraps a raw document in a [`DocumentHandle`] and registers it.
    ///
    /// Companion of [`add_handle`](Self::add_handle) for documents that
    /// don't bring their own undo machinery. Returns the created handle.
    pub fn add_document<D: UndoableDocument + 'static>(
        &mut self,
        doc: Rc<RefCell<D>>,
    ) -> SharedHandle {
        let handle: SharedHandle = Rc::new(RefCell::new(DocumentHandle::new(doc)));
        self.add_handle(handle)
    }

    /// Returns the registered handle for a document id, if any.
    pub fn get_undo_redo_handle(&self, doc_id: &str) -> Option<SharedHandle> {
        self.handles.get(doc_id).map(Rc::clone)
    }

    /// Unregisters a document's handle and returns it.
    ///
    /// History entries naming the document are left in place; undo/redo
    /// skips ids that are no longer registered.
    pub fn remove_handle(&mut self, doc_id: &str) -> Option<SharedHandle> {
        let removed = self.handles.remove(doc_id);
        if removed.is_some() {
            self.order.retain(|id| id != doc_id);
            tracing::debug!("Removed undo handle for document {doc_id:?}");
        }
        removed
    }

    /// Target handles for a transaction: the registered subset of
    /// `dependencies`, or every registered handle when `None`.
    fn resolve_targets(
        &self,
        dependencies: Option<&[DocumentId]>,
    ) -> Vec<(DocumentId, SharedHandle)> {
        let ids: Vec<&DocumentId> = match dependencies {
            Some(deps) => deps.iter().collect(),
            None => self.order.iter().collect(),
        };
        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            match self.handles.get(id) {
                Some(handle) => targets.push((id.clone(), Rc::clone(handle))),
                None => {
                    tracing::warn!("Ignoring unregistered document id {id:?} in dependencies");
                }
            }
        }
        targets
    }

    // ── Transaction coordination ───────────────────────────────────────

    /// Begins a transaction on the given documents (all registered
    /// documents when `dependencies` is `None`).
    ///
    /// The caller performs the actual edits after this call and closes the
    /// span with [`end_transaction`](Self::end_transaction). Nesting a
    /// transaction on a document that is already mid-transaction is not
    /// supported.
    ///
    /// # Errors
    ///
    /// Propagates the first failure raised by a handle; handles earlier in
    /// the batch will already have started recording.
    pub fn start_transaction(&mut self, dependencies: Option<&[DocumentId]>) -> Result<()> {
        for (_, handle) in self.resolve_targets(dependencies) {
            handle.borrow_mut().start_transaction()?;
        }
        Ok(())
    }

    /// Closes a transaction, recording one combined history entry.
    ///
    /// Asks each participating handle whether it recorded an effective
    /// change. When at least one did, a [`Change`] naming exactly those
    /// documents is pushed onto the scope's undo stack, the scope's redo
    /// stack is cleared, and the committed change is returned. When none
    /// did, the transaction is discarded: `Ok(None)`, no history side
    /// effects.
    ///
    /// # Errors
    ///
    /// Propagates the first failure raised by a handle; no rollback is
    /// attempted for handles already processed.
    pub fn end_transaction(
        &mut self,
        options: TransactionOptions,
    ) -> Result<Option<CommittedChange>> {
        let TransactionOptions {
            description,
            scope,
            dependencies,
        } = options;

        let mut ids = Vec::new();
        for (doc_id, handle) in self.resolve_targets(dependencies.as_deref()) {
            let changed = handle
                .borrow_mut()
                .end_transaction(description.as_deref(), &scope)?;
            if changed {
                ids.push(doc_id);
            }
        }

        if ids.is_empty() {
            tracing::debug!("Transaction on scope {scope} recorded no effective change");
            return Ok(None);
        }

        let change = Change { description, ids };
        let committed = CommittedChange::new(&change, &scope);

        let undo_stack = self.undo_stacks.entry(scope.clone()).or_default();
        undo_stack.push(change);
        if undo_stack.len() > self.config.max_depth {
            let excess = undo_stack.len() - self.config.max_depth;
            undo_stack.drain(..excess);
        }
        self.redo_stacks.entry(scope).or_default().clear();

        tracing::debug!(
            "Recorded change for {} document(s) on scope {}",
            committed.ids.len(),
            committed.scope
        );
        Ok(Some(committed))
    }

    /// Runs `f` inside a transaction.
    ///
    /// Composes [`start_transaction`](Self::start_transaction) and
    /// [`end_transaction`](Self::end_transaction); a description returned by
    /// `f` takes precedence over `options.description`. The composition is
    /// synchronous, so `f` must complete its edits before returning;
    /// asynchronous edits need the two-call form.
    ///
    /// # Errors
    ///
    /// Propagates handle failures from either phase.
    pub fn transaction<F>(
        &mut self,
        options: TransactionOptions,
        f: F,
    ) -> Result<Option<CommittedChange>>
    where
        F: FnOnce() -> Option<String>,
    {
        self.start_transaction(options.dependencies.as_deref())?;
        let description = f();
        self.end_transaction(TransactionOptions {
            description: description.or(options.description),
            scope: options.scope,
            dependencies: options.dependencies,
        })
    }

    // ── Undo/redo dispatch ─────────────────────────────────────────────

    /// Undoes the most recent change recorded under `scope`.
    ///
    /// Pops the change, replays `undo` on every participating document that
    /// is still registered (ids without a registration are skipped), and
    /// moves the change to the scope's redo stack. Returns `Ok(None)` when
    /// there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Propagates the first failure raised by a handle. The popped change
    /// is dropped in that case; partial replay is not compensated.
    pub fn undo(&mut self, scope: &Scope) -> Result<Option<CommittedChange>> {
        let Some(change) = self.undo_stacks.get_mut(scope).and_then(|s| s.pop()) else {
            return Ok(None);
        };
        for doc_id in &change.ids {
            let Some(handle) = self.handles.get(doc_id) else {
                tracing::debug!("Skipping unregistered document {doc_id:?} during undo");
                continue;
            };
            handle.borrow_mut().undo(scope)?;
        }
        let committed = CommittedChange::new(&change, scope);
        self.redo_stacks.entry(scope.clone()).or_default().push(change);
        tracing::debug!("Undid change on scope {scope}");
        Ok(Some(committed))
    }

    /// Redoes the most recently undone change under `scope`.
    ///
    /// Symmetric to [`undo`](Self::undo): pops from the redo stack, replays
    /// `redo` on the participating documents, pushes onto the undo stack.
    ///
    /// # Errors
    ///
    /// Propagates the first failure raised by a handle. The popped change
    /// is dropped in that case; partial replay is not compensated.
    pub fn redo(&mut self, scope: &Scope) -> Result<Option<CommittedChange>> {
        let Some(change) = self.redo_stacks.get_mut(scope).and_then(|s| s.pop()) else {
            return Ok(None);
        };
        for doc_id in &change.ids {
            let Some(handle) = self.handles.get(doc_id) else {
                tracing::debug!("Skipping unregistered document {doc_id:?} during redo");
                continue;
            };
            handle.borrow_mut().redo(scope)?;
        }
        let committed = CommittedChange::new(&change, scope);
        self.undo_stacks.entry(scope.clone()).or_default().push(change);
        tracing::debug!("Redid change on scope {scope}");
        Ok(Some(committed))
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Descriptions of the changes on `scope`'s undo stack, oldest first.
    pub fn undos(&self, scope: &Scope) -> Vec<Option<String>> {
        self.undo_stacks
            .get(scope)
            .map(|stack| stack.iter().map(|c| c.description.clone()).collect())
            .unwrap_or_default()
    }

    /// Descriptions of the changes on `scope`'s redo stack, oldest first.
    pub fn redos(&self, scope: &Scope) -> Vec<Option<String>> {
        self.redo_stacks
            .get(scope)
            .map(|stack| stack.iter().map(|c| c.description.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether `scope` has anything to undo.
    pub fn can_undo(&self, scope: &Scope) -> bool {
        self.undo_stacks.get(scope).is_some_and(|s| !s.is_empty())
    }

    /// Whether `scope` has anything to redo.
    pub fn can_redo(&self, scope: &Scope) -> bool {
        self.redo_stacks.get(scope).is_some_and(|s| !s.is_empty())
    }
}

//! Scoped, transaction-grouped undo/redo coordination.
//!
//! Provides an [`UndoManager`] that groups edits to one or more registered
//! documents into a single history entry per transaction and replays
//! undo/redo across exactly the documents that participated. History is
//! partitioned into independent [`Scope`]s so unrelated editing contexts
//! (different panels, tool windows) never disturb each other's stacks.
//!
//! The per-document undo machinery is pluggable: anything implementing
//! [`UndoHandle`] can be registered, and raw documents implementing
//! [`UndoableDocument`] can be wrapped by the snapshot-based
//! [`DocumentHandle`] adapter.

pub mod change;
pub mod config;
pub mod handle;
pub mod manager;
pub mod scope;

pub use change::{Change, CommittedChange, DocumentId};
pub use config::HistoryConfig;
pub use handle::{DocumentHandle, SharedHandle, UndoHandle, UndoableDocument};
pub use manager::{TransactionOptions, UndoManager};
pub use scope::Scope;

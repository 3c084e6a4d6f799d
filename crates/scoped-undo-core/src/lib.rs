//! Reference document layer for the scoped-undo workspace.
//!
//! Provides [`TextDocument`], a rope-backed in-memory document implementing
//! [`UndoableDocument`](scoped_undo::UndoableDocument), so the orchestration
//! layer can be used and tested end-to-end without an external document
//! engine.

pub mod document;

pub use document::TextDocument;

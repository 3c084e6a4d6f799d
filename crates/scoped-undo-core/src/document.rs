//! Rope-backed in-memory text document.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use ropey::Rope;
use scoped_undo::UndoableDocument;

/// Counter for generating unique untitled document ids within a process.
static UNTITLED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a unique id for a document created without one.
fn generate_untitled_id() -> String {
    let count = UNTITLED_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("untitled-{count}")
}

/// A text document backed by a rope, identified by a stable id.
///
/// Content edits are char-indexed. The document carries no undo state of
/// its own; the wrapping handle snapshots the rope, which makes captures
/// cheap to clone and compare.
#[derive(Debug, Clone)]
pub struct TextDocument {
    id: String,
    rope: Rope,
}

impl TextDocument {
    /// Creates a document with the given id and initial content.
    pub fn new(id: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            rope: Rope::from_str(text),
        }
    }

    /// Creates an empty document with a generated `untitled-N` id.
    pub fn untitled() -> Self {
        Self {
            id: generate_untitled_id(),
            rope: Rope::new(),
        }
    }

    /// The document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full content as a string.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The total number of characters in the document.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Inserts text at a char index.
    ///
    /// # Errors
    ///
    /// Returns an error if `char_idx` is past the end of the document.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        if char_idx > self.rope.len_chars() {
            anyhow::bail!(
                "char index {} out of bounds (document has {} chars)",
                char_idx,
                self.rope.len_chars()
            );
        }
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Appends text at the end of the document.
    pub fn append(&mut self, text: &str) {
        let end = self.rope.len_chars();
        self.rope.insert(end, text);
    }

    /// Removes the chars in `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn remove(&mut self, range: std::ops::Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.rope.len_chars() {
            anyhow::bail!(
                "char range {}..{} out of bounds (document has {} chars)",
                range.start,
                range.end,
                self.rope.len_chars()
            );
        }
        self.rope.remove(range);
        Ok(())
    }

    /// Replaces the whole content.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }
}

impl fmt::Display for TextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl UndoableDocument for TextDocument {
    type Snapshot = Rope;

    fn doc_id(&self) -> &str {
        &self.id
    }

    fn snapshot(&self) -> Rope {
        self.rope.clone()
    }

    fn restore(&mut self, snapshot: &Rope) {
        self.rope = snapshot.clone();
    }
}

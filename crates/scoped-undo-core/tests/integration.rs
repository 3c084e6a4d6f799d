// Integration tests exercising the manager together with the reference
// document layer: grouped transactions, scope isolation, and content
// replayed through real rope snapshots.

use std::cell::RefCell;
use std::rc::Rc;

use scoped_undo::{Scope, TransactionOptions, UndoManager};
use scoped_undo_core::TextDocument;

fn shared(doc: TextDocument) -> Rc<RefCell<TextDocument>> {
    Rc::new(RefCell::new(doc))
}

// ── Grouped transactions ───────────────────────────────────────────────

#[test]
fn test_edit_both_documents_then_undo_redo() {
    let doc1 = shared(TextDocument::new("doc1", "alpha"));
    let doc2 = shared(TextDocument::new("doc2", "beta"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc1));
    mgr.add_document(Rc::clone(&doc2));

    mgr.start_transaction(None).unwrap();
    doc1.borrow_mut().append(" one");
    doc2.borrow_mut().append(" two");
    let committed = mgr
        .end_transaction(TransactionOptions::described("edit both"))
        .unwrap()
        .expect("change recorded");

    assert_eq!(committed.description.as_deref(), Some("edit both"));
    assert_eq!(committed.ids, vec!["doc1".to_string(), "doc2".to_string()]);
    assert_eq!(committed.scope, Scope::Default);
    assert!(mgr.can_undo(&Scope::Default));

    let undone = mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(undone.ids, committed.ids);
    assert_eq!(doc1.borrow().text(), "alpha");
    assert_eq!(doc2.borrow().text(), "beta");
    assert!(mgr.can_redo(&Scope::Default));
    assert!(!mgr.can_undo(&Scope::Default));

    mgr.redo(&Scope::Default).unwrap().expect("redo");
    assert_eq!(doc1.borrow().text(), "alpha one");
    assert_eq!(doc2.borrow().text(), "beta two");
}

#[test]
fn test_only_edited_documents_participate() {
    let doc1 = shared(TextDocument::new("doc1", "x"));
    let doc2 = shared(TextDocument::new("doc2", "y"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc1));
    mgr.add_document(Rc::clone(&doc2));

    mgr.start_transaction(None).unwrap();
    doc1.borrow_mut().append("x");
    let committed = mgr
        .end_transaction(TransactionOptions::default())
        .unwrap()
        .expect("change recorded");

    assert_eq!(committed.ids, vec!["doc1".to_string()]);

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(doc1.borrow().text(), "x");
    assert_eq!(doc2.borrow().text(), "y");
}

#[test]
fn test_ineffective_transaction_is_discarded() {
    let doc = shared(TextDocument::new("doc1", "stable"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));

    // No edit at all.
    mgr.start_transaction(None).unwrap();
    assert!(mgr
        .end_transaction(TransactionOptions::default())
        .unwrap()
        .is_none());

    // Edit reverted within the transaction.
    mgr.start_transaction(None).unwrap();
    doc.borrow_mut().append("!");
    let len = doc.borrow().len_chars();
    doc.borrow_mut().remove(len - 1..len).unwrap();
    assert!(mgr
        .end_transaction(TransactionOptions::default())
        .unwrap()
        .is_none());

    assert!(!mgr.can_undo(&Scope::Default));
    assert!(mgr.undos(&Scope::Default).is_empty());
}

#[test]
fn test_dependency_limited_transaction_ignores_other_edits() {
    let doc1 = shared(TextDocument::new("doc1", "a"));
    let doc2 = shared(TextDocument::new("doc2", "b"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc1));
    mgr.add_document(Rc::clone(&doc2));

    let deps = vec!["doc1".to_string()];
    mgr.start_transaction(Some(&deps)).unwrap();
    doc1.borrow_mut().append("a");
    // doc2 is edited too, but it is not part of the transaction.
    doc2.borrow_mut().append("b");
    let committed = mgr
        .end_transaction(TransactionOptions {
            description: None,
            scope: Scope::Default,
            dependencies: Some(deps),
        })
        .unwrap()
        .expect("change recorded");

    assert_eq!(committed.ids, vec!["doc1".to_string()]);

    // Undo reverts only what the transaction tracked.
    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(doc1.borrow().text(), "a");
    assert_eq!(doc2.borrow().text(), "bb");
}

// ── Scopes ─────────────────────────────────────────────────────────────

#[test]
fn test_panel_scopes_are_isolated() {
    let sidebar = shared(TextDocument::new("sidebar", "files"));
    let canvas = shared(TextDocument::new("canvas", "shapes"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&sidebar));
    mgr.add_document(Rc::clone(&canvas));

    let sidebar_deps = vec!["sidebar".to_string()];
    mgr.start_transaction(Some(&sidebar_deps)).unwrap();
    sidebar.borrow_mut().append(" +readme");
    mgr.end_transaction(TransactionOptions {
        description: Some("add readme".to_string()),
        scope: Scope::named("panelA"),
        dependencies: Some(sidebar_deps),
    })
    .unwrap()
    .expect("change recorded");

    let canvas_deps = vec!["canvas".to_string()];
    mgr.start_transaction(Some(&canvas_deps)).unwrap();
    canvas.borrow_mut().append(" +circle");
    mgr.end_transaction(TransactionOptions {
        description: Some("add circle".to_string()),
        scope: Scope::named("panelB"),
        dependencies: Some(canvas_deps),
    })
    .unwrap()
    .expect("change recorded");

    assert_eq!(
        mgr.undos(&Scope::named("panelA")),
        vec![Some("add readme".to_string())]
    );
    assert_eq!(
        mgr.undos(&Scope::named("panelB")),
        vec![Some("add circle".to_string())]
    );
    assert!(mgr.undos(&Scope::Default).is_empty());

    mgr.undo(&Scope::named("panelA")).unwrap().expect("undo");
    assert_eq!(sidebar.borrow().text(), "files");
    assert_eq!(canvas.borrow().text(), "shapes +circle");

    // Panel B's history is untouched by panel A's undo.
    assert!(mgr.can_undo(&Scope::named("panelB")));
    assert!(!mgr.can_redo(&Scope::named("panelB")));
}

// ── History sequences ──────────────────────────────────────────────────

#[test]
fn test_multi_step_history_walks_both_ways() {
    let doc = shared(TextDocument::new("doc1", ""));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));

    for word in ["one ", "two ", "three "] {
        mgr.start_transaction(None).unwrap();
        doc.borrow_mut().append(word);
        mgr.end_transaction(TransactionOptions::described(word.trim()))
            .unwrap()
            .expect("change recorded");
    }
    assert_eq!(doc.borrow().text(), "one two three ");
    assert_eq!(
        mgr.undos(&Scope::Default),
        vec![
            Some("one".to_string()),
            Some("two".to_string()),
            Some("three".to_string())
        ]
    );

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    mgr.undo(&Scope::Default).unwrap().expect("undo");
    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(doc.borrow().text(), "");
    assert!(mgr.undo(&Scope::Default).unwrap().is_none());

    mgr.redo(&Scope::Default).unwrap().expect("redo");
    mgr.redo(&Scope::Default).unwrap().expect("redo");
    mgr.redo(&Scope::Default).unwrap().expect("redo");
    assert_eq!(doc.borrow().text(), "one two three ");
    assert!(mgr.redo(&Scope::Default).unwrap().is_none());
}

#[test]
fn test_new_edit_invalidates_redo() {
    let doc = shared(TextDocument::new("doc1", "base"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));

    mgr.start_transaction(None).unwrap();
    doc.borrow_mut().append(" first");
    mgr.end_transaction(TransactionOptions::described("first"))
        .unwrap()
        .expect("change recorded");

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert!(mgr.can_redo(&Scope::Default));

    mgr.start_transaction(None).unwrap();
    doc.borrow_mut().append(" second");
    mgr.end_transaction(TransactionOptions::described("second"))
        .unwrap()
        .expect("change recorded");

    assert!(!mgr.can_redo(&Scope::Default));
    assert!(mgr.redo(&Scope::Default).unwrap().is_none());
    assert_eq!(doc.borrow().text(), "base second");
}

#[test]
fn test_transaction_closure_with_real_document() {
    let doc = shared(TextDocument::new("doc1", "v1"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));

    let editing = Rc::clone(&doc);
    let committed = mgr
        .transaction(TransactionOptions::default(), move || {
            editing.borrow_mut().replace_all("v2");
            Some("bump".to_string())
        })
        .unwrap()
        .expect("change recorded");

    assert_eq!(committed.description.as_deref(), Some("bump"));
    assert_eq!(doc.borrow().text(), "v2");

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(doc.borrow().text(), "v1");
}

#[test]
fn test_unicode_content_round_trip() {
    let doc = shared(TextDocument::new("doc1", "héllo wörld"));

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));

    mgr.start_transaction(None).unwrap();
    doc.borrow_mut().insert(5, " ✨").unwrap();
    mgr.end_transaction(TransactionOptions::described("sparkle"))
        .unwrap()
        .expect("change recorded");
    assert_eq!(doc.borrow().text(), "héllo ✨ wörld");

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert_eq!(doc.borrow().text(), "héllo wörld");

    mgr.redo(&Scope::Default).unwrap().expect("redo");
    assert_eq!(doc.borrow().text(), "héllo ✨ wörld");
}

#[test]
fn test_untitled_documents_register_and_undo() {
    let doc = shared(TextDocument::untitled());
    let id = doc.borrow().id().to_string();

    let mut mgr = UndoManager::new();
    mgr.add_document(Rc::clone(&doc));
    assert!(mgr.get_undo_redo_handle(&id).is_some());

    mgr.start_transaction(None).unwrap();
    doc.borrow_mut().append("draft");
    let committed = mgr
        .end_transaction(TransactionOptions::default())
        .unwrap()
        .expect("change recorded");
    assert_eq!(committed.ids, vec![id]);

    mgr.undo(&Scope::Default).unwrap().expect("undo");
    assert!(doc.borrow().is_empty());
}

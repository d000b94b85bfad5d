//! Integration tests for editor crate

use xmledit_editor::{Document, EditSession, XML_HEADER};
use xmledit_tree::{EventLog, TreeEvent};

#[test]
fn test_library_scenario() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new("books", "library"));
    let root = session.root();

    let book = session.add_container(root, "book")?;
    session.set_attribute(book, "genre", "fantasy")?;
    session.add_leaf(book, "chapter1", "Once upon a time")?;

    let expected = format!(
        "{XML_HEADER}\n\
         <library>\n\
         \t<book genre='fantasy' >\n\
         \t\t<chapter1> Once upon a time </chapter1>\n\
         \t</book>\n\
         </library>\n"
    );
    assert_eq!(session.document().serialize(), expected);

    // Undo everything, one step at a time
    while session.undo()? {}
    assert_eq!(
        session.document().serialize(),
        format!("{XML_HEADER}\n<library>\n</library>\n")
    );

    // And bring it all back
    while session.redo()? {}
    assert_eq!(session.document().serialize(), expected);
    Ok(())
}

#[test]
fn test_observer_sees_every_edit_and_its_undo() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new("books", "library"));
    let root = session.root();
    let log = EventLog::new();
    session.subscribe(root, log.clone())?;

    let book = session.add_container(root, "book")?;
    session.subscribe(book, log.clone())?;
    session.set_attribute(book, "genre", "fantasy")?;

    session.undo()?;
    session.undo()?;

    assert_eq!(
        log.events(),
        vec![
            TreeEvent::ChildAdded { parent: root, child: book },
            TreeEvent::AttributeSet {
                node: book,
                key: "genre".into(),
                value: "fantasy".into(),
            },
            TreeEvent::AttributeRemoved {
                node: book,
                attribute: xmledit_tree::Attribute::new("genre", "fantasy"),
            },
            TreeEvent::SubtreeRemoved { parent: root, node: book },
        ]
    );
    Ok(())
}

#[test]
fn test_filter_after_edits() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new("films", "filter1"));
    let root = session.root();
    session.add_leaf(root, "1film", "mission impossible")?;
    let filter2 = session.add_container(root, "filter2")?;
    let select = session.add_container(filter2, "select")?;
    session.add_leaf(select, "press button", "film selected")?;

    let doc = session.into_document();
    let filtered = doc.filter(|n| n.name() != "select").expect("root kept");

    assert_eq!(filtered.name(), "films-filtered");
    let button = filtered.find_by_name("press button").expect("leaf kept");
    let parent = filtered.tree().get(button).and_then(|n| n.parent());
    assert_eq!(parent, filtered.find_by_name("filter2"));
    Ok(())
}

#[test]
fn test_save_writes_serialized_document() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new("books", "library"));
    let root = session.root();
    session.add_leaf(root, "note", "hello")?;

    let path = std::env::temp_dir().join(format!("xmledit-save-{}.xml", std::process::id()));
    session.document().save(&path)?;
    let written = std::fs::read_to_string(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(written, session.document().to_string());
    Ok(())
}

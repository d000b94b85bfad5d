//! Listener delivery tests

use std::cell::RefCell;
use std::rc::Rc;
use xmledit_tree::{
    Attribute, EventLog, ListenerHandle, NodeId, NodeListener, Tree, TreeEvent,
};

#[test]
fn test_each_mutation_fires_exactly_one_event() {
    let mut tree = Tree::new("library");
    let root = tree.root();
    let log = EventLog::new();
    tree.subscribe(root, log.clone()).unwrap();

    let book = tree.add_child_entity(root, "book").unwrap();
    tree.subscribe(book, log.clone()).unwrap();

    tree.add_attribute(book, "genre", "fantasy").unwrap();
    tree.edit_attribute(book, "genre", "horror").unwrap();
    tree.remove_attribute(book, "genre").unwrap();
    tree.rename(book, "novel").unwrap();
    tree.remove_subtree(book).unwrap();

    assert_eq!(
        log.events(),
        vec![
            TreeEvent::ChildAdded { parent: root, child: book },
            TreeEvent::AttributeSet {
                node: book,
                key: "genre".into(),
                value: "fantasy".into(),
            },
            TreeEvent::AttributeEdited {
                node: book,
                key: "genre".into(),
                value: "horror".into(),
            },
            TreeEvent::AttributeRemoved {
                node: book,
                attribute: Attribute::new("genre", "horror"),
            },
            TreeEvent::Renamed {
                node: book,
                name: "novel".into(),
            },
            TreeEvent::SubtreeRemoved { parent: root, node: book },
        ]
    );
}

#[test]
fn test_no_ops_fire_nothing() {
    let mut tree = Tree::new("root");
    let root = tree.root();
    let log = EventLog::new();
    tree.subscribe(root, log.clone()).unwrap();

    tree.edit_attribute(root, "missing", "x").unwrap();
    tree.remove_attribute(root, "missing").unwrap();
    let _ = tree.remove_subtree(root);

    assert!(log.is_empty());
}

#[test]
fn test_subscribe_is_idempotent() {
    let mut tree = Tree::new("root");
    let root = tree.root();
    let log = EventLog::new();
    let handle: ListenerHandle = log.clone();

    assert!(tree.subscribe(root, handle.clone()).unwrap());
    assert!(!tree.subscribe(root, handle.clone()).unwrap());
    assert_eq!(tree.listener_count(root), 1);

    tree.rename(root, "renamed").unwrap();
    assert_eq!(log.len(), 1);

    assert!(tree.unsubscribe(root, &handle).unwrap());
    assert!(!tree.unsubscribe(root, &handle).unwrap());
    tree.rename(root, "again").unwrap();
    assert_eq!(log.len(), 1);
}

struct Ordered {
    tag: &'static str,
    seen: Rc<RefCell<Vec<&'static str>>>,
}

impl NodeListener for Ordered {
    fn on_renamed(&self, _tree: &mut Tree, _node: NodeId, _new_name: &str) {
        self.seen.borrow_mut().push(self.tag);
    }
}

#[test]
fn test_delivery_follows_subscription_order() {
    let mut tree = Tree::new("root");
    let root = tree.root();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let listener = Rc::new(Ordered {
            tag,
            seen: seen.clone(),
        });
        tree.subscribe(root, listener).unwrap();
    }

    tree.rename(root, "x").unwrap();
    assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
}

/// Unsubscribes itself and subscribes a newcomer while an event is delivered
struct Churn {
    me: RefCell<Option<ListenerHandle>>,
    newcomer: ListenerHandle,
    calls: RefCell<usize>,
}

impl NodeListener for Churn {
    fn on_renamed(&self, tree: &mut Tree, node: NodeId, _new_name: &str) {
        *self.calls.borrow_mut() += 1;
        if let Some(me) = self.me.borrow_mut().take() {
            tree.unsubscribe(node, &me).unwrap();
        }
        tree.subscribe(node, self.newcomer.clone()).unwrap();
    }
}

#[test]
fn test_listener_churn_does_not_disturb_current_delivery() {
    let mut tree = Tree::new("root");
    let root = tree.root();

    let newcomer = EventLog::new();
    let tail = EventLog::new();
    let churn = Rc::new(Churn {
        me: RefCell::new(None),
        newcomer: newcomer.clone(),
        calls: RefCell::new(0),
    });
    let churn_handle: ListenerHandle = churn.clone();
    *churn.me.borrow_mut() = Some(churn_handle.clone());

    tree.subscribe(root, churn_handle).unwrap();
    tree.subscribe(root, tail.clone()).unwrap();

    tree.rename(root, "first").unwrap();
    // The listener after the churner still sees the event; the newcomer does not
    assert_eq!(tail.len(), 1);
    assert_eq!(newcomer.len(), 0);
    assert_eq!(*churn.calls.borrow(), 1);

    tree.rename(root, "second").unwrap();
    assert_eq!(*churn.calls.borrow(), 1);
    assert_eq!(newcomer.len(), 1);
    assert_eq!(tail.len(), 2);
}

/// Tags every new child with an attribute, re-entering the tree
struct AutoTag;

impl NodeListener for AutoTag {
    fn on_child_added(&self, tree: &mut Tree, _parent: NodeId, child: NodeId) {
        if tree.get(child).is_some_and(|c| c.is_entity()) {
            tree.add_attribute(child, "tagged", "yes").unwrap();
        }
    }
}

#[test]
fn test_listener_may_mutate_the_tree() {
    let mut tree = Tree::new("root");
    let root = tree.root();
    tree.subscribe(root, Rc::new(AutoTag)).unwrap();

    let child = tree.add_child_entity(root, "child").unwrap();
    let leaf = tree.add_child_text(root, "leaf", "text").unwrap();

    assert_eq!(tree.get(child).unwrap().attribute("tagged"), Some("yes"));
    assert!(tree.get(leaf).unwrap().attributes().is_empty());
    assert_eq!(tree.get(root).unwrap().children(), &[child, leaf]);
}

#[test]
fn test_mutation_is_complete_before_listeners_run() {
    struct CheckParent {
        ok: RefCell<bool>,
    }

    impl NodeListener for CheckParent {
        fn on_subtree_removed(&self, tree: &mut Tree, parent: NodeId, node: NodeId) {
            let detached = tree.get(node).unwrap().parent().is_none();
            let gone = !tree.get(parent).unwrap().children().contains(&node);
            *self.ok.borrow_mut() = detached && gone;
        }
    }

    let mut tree = Tree::new("root");
    let root = tree.root();
    let child = tree.add_child_entity(root, "child").unwrap();
    let check = Rc::new(CheckParent {
        ok: RefCell::new(false),
    });
    tree.subscribe(root, check.clone()).unwrap();

    tree.remove_subtree(child).unwrap();
    assert!(*check.ok.borrow());
}

#[test]
fn test_removed_node_hears_its_own_removal() {
    let mut tree = Tree::new("library");
    let root = tree.root();
    let book = tree.add_child_entity(root, "book").unwrap();
    let chapter = tree.add_child_text(book, "chapter1", "text").unwrap();

    let on_book = EventLog::new();
    let on_root = EventLog::new();
    let on_chapter = EventLog::new();
    tree.subscribe(book, on_book.clone()).unwrap();
    tree.subscribe(root, on_root.clone()).unwrap();
    tree.subscribe(chapter, on_chapter.clone()).unwrap();

    tree.remove_subtree(book).unwrap();

    let removed = TreeEvent::SubtreeRemoved { parent: root, node: book };
    assert_eq!(on_book.events(), vec![removed.clone()]);
    assert_eq!(on_root.events(), vec![removed]);
    // Only the head of the subtree is told
    assert!(on_chapter.is_empty());
}

#[test]
fn test_removal_reaches_node_before_parent() {
    struct Order {
        tag: &'static str,
        seen: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NodeListener for Order {
        fn on_subtree_removed(&self, _tree: &mut Tree, _parent: NodeId, _node: NodeId) {
            self.seen.borrow_mut().push(self.tag);
        }
    }

    let mut tree = Tree::new("root");
    let root = tree.root();
    let child = tree.add_child_entity(root, "child").unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    tree.subscribe(root, Rc::new(Order { tag: "parent", seen: seen.clone() }))
        .unwrap();
    tree.subscribe(child, Rc::new(Order { tag: "node", seen: seen.clone() }))
        .unwrap();

    tree.remove_subtree(child).unwrap();
    assert_eq!(*seen.borrow(), vec!["node", "parent"]);
}

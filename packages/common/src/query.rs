//! Lookup and filtering, both expressed as visitors

use crate::visitor::{accept, Visitor};
use tracing::trace;
use xmledit_tree::{NodeId, NodeRef, Tree};

/// First node (entity or text) named `name` in preorder under `root`
pub fn find_by_name(tree: &Tree, root: NodeId, name: &str) -> Option<NodeId> {
    let mut finder = FindByName { name, found: None };
    accept(tree, root, &mut finder);
    finder.found
}

struct FindByName<'n> {
    name: &'n str,
    found: Option<NodeId>,
}

impl Visitor for FindByName<'_> {
    fn visit_text(&mut self, node: NodeRef<'_>) {
        if self.found.is_none() && node.name() == self.name {
            self.found = Some(node.id());
        }
    }

    fn visit_entity(&mut self, node: NodeRef<'_>) -> bool {
        if self.found.is_some() {
            return false;
        }
        if node.name() == self.name {
            self.found = Some(node.id());
            return false;
        }
        true
    }
}

/// Clone the nodes under `root` that satisfy `predicate` into a new tree.
///
/// Relative nesting is preserved: a kept node whose ancestors were dropped
/// is attached to the clone of its nearest kept ancestor. Kept entities
/// carry their attributes; listeners are never copied.
///
/// When `root` itself is dropped, the first kept entity in preorder becomes
/// the new root and every other kept node without a kept ancestor is
/// attached beneath it, in document order. Returns `None` when no entity
/// is kept at all.
pub fn filter<F>(tree: &Tree, root: NodeId, predicate: F) -> Option<Tree>
where
    F: FnMut(NodeRef<'_>) -> bool,
{
    let mut filter = Filter {
        predicate,
        out: None,
        clones: Vec::new(),
        pending: Vec::new(),
    };
    accept(tree, root, &mut filter);
    filter.out
}

/// Leaf kept before the clone root exists
struct PendingLeaf {
    name: String,
    text: String,
}

struct Filter<F> {
    predicate: F,
    out: Option<Tree>,
    /// One entry per entity on the current path: its clone, or `None` if dropped
    clones: Vec<Option<NodeId>>,
    pending: Vec<PendingLeaf>,
}

impl<F> Filter<F> {
    /// Clone of the nearest kept ancestor on the current path, falling back
    /// to the clone root. `None` until the clone root exists.
    fn nearest_kept(&self) -> Option<NodeId> {
        let out = self.out.as_ref()?;
        self.clones
            .iter()
            .rev()
            .find_map(|clone| *clone)
            .or(Some(out.root()))
    }

    fn start_tree(&mut self, root_name: &str) -> NodeId {
        let mut out = Tree::new(root_name);
        let root = out.root();
        for leaf in self.pending.drain(..) {
            // Cannot fail: the root is a container
            let _ = out.add_child_text(root, leaf.name, leaf.text);
        }
        self.out = Some(out);
        root
    }
}

impl<F> Visitor for Filter<F>
where
    F: FnMut(NodeRef<'_>) -> bool,
{
    fn visit_text(&mut self, node: NodeRef<'_>) {
        if !(self.predicate)(node) {
            return;
        }
        let name = node.name().to_string();
        let text = node.text().unwrap_or_default().to_string();

        match (self.nearest_kept(), self.out.as_mut()) {
            (Some(parent), Some(out)) => {
                let _ = out.add_child_text(parent, name, text);
            }
            _ => self.pending.push(PendingLeaf { name, text }),
        }
    }

    fn visit_entity(&mut self, node: NodeRef<'_>) -> bool {
        if !(self.predicate)(node) {
            trace!(node = %node.id(), "filter dropped entity");
            self.clones.push(None);
            return true;
        }

        let clone = match self.nearest_kept() {
            Some(parent) => self
                .out
                .as_mut()
                .and_then(|out| out.add_child_entity(parent, node.name()).ok()),
            None => Some(self.start_tree(node.name())),
        };

        if let (Some(clone), Some(out)) = (clone, self.out.as_mut()) {
            for attribute in node.attributes() {
                let _ = out.insert_attribute(clone, usize::MAX, attribute.clone());
            }
        }
        self.clones.push(clone);
        true
    }

    fn end_visit_entity(&mut self, _node: NodeRef<'_>) {
        self.clones.pop();
    }
}

use xmledit_tree::{NodeId, NodeRef, Tree};

/// Visitor pattern for traversing a document tree depth-first
///
/// All hooks have default implementations that walk the entire tree.
/// Returning `false` from [`Visitor::visit_entity`] skips that entity's
/// children, but [`Visitor::end_visit_entity`] is still called for it.
pub trait Visitor {
    fn visit_text(&mut self, _node: NodeRef<'_>) {
        // Leaf node, no children to walk
    }

    /// Called before an entity's children. Return whether to descend.
    fn visit_entity(&mut self, _node: NodeRef<'_>) -> bool {
        true
    }

    /// Called after an entity's children, whatever `visit_entity` returned
    fn end_visit_entity(&mut self, _node: NodeRef<'_>) {}
}

/// Drive `visitor` over the subtree rooted at `node`, in preorder for
/// entering hooks and postorder for `end_visit_entity`.
///
/// Ids that do not resolve in `tree` are skipped.
pub fn accept<V: Visitor + ?Sized>(tree: &Tree, node: NodeId, visitor: &mut V) {
    let Some(node) = tree.get(node) else {
        return;
    };

    if node.is_text() {
        visitor.visit_text(node);
        return;
    }

    if visitor.visit_entity(node) {
        walk_children(tree, node, visitor);
    }
    visitor.end_visit_entity(node);
}

/// Visit every child of `node` in sibling order
pub fn walk_children<V: Visitor + ?Sized>(tree: &Tree, node: NodeRef<'_>, visitor: &mut V) {
    for &child in node.children() {
        accept(tree, child, visitor);
    }
}

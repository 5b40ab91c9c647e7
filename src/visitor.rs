use crate::tree::TreeNode;

/// Visit events over a built tree, parent before children.
pub trait TreeVisitor {
    /// `role` is the key under which `node` hangs from its parent; `None` for the root.
    fn enter_node(&mut self, _role: Option<&str>, _node: &TreeNode) {}
    fn exit_node(&mut self, _node: &TreeNode) {}
}

pub fn walk_tree(root: &TreeNode, visitor: &mut impl TreeVisitor) {
    walk_node(None, root, visitor);
}

fn walk_node(role: Option<&str>, node: &TreeNode, visitor: &mut impl TreeVisitor) {
    visitor.enter_node(role, node);
    for (key, child) in node.children() {
        walk_node(Some(key), child, visitor);
    }
    visitor.exit_node(node);
}

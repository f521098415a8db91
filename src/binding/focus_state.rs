use crate::tree::NavigationTree;

/// `node` holds logical focus.
pub fn is_focused(tree: &dyn NavigationTree, node: &str) -> bool {
    tree.focused_id().as_deref() == Some(node)
}

/// `node` or one of its descendants holds logical focus. Containers use this
/// to highlight the branch the focus sits in.
pub fn contains_focus(tree: &dyn NavigationTree, node: &str) -> bool {
    let mut cursor = tree.focused_id();
    while let Some(current) = cursor {
        if current == node {
            return true;
        }
        cursor = tree.parent_of(&current);
    }
    false
}

//! Generic arena tree shared by the layout tree and the color-rule tree
//!
//! Nodes live in a slot vector and are addressed by stable [`NodeId`]s.
//! Child order is z-order and traversal order. Removing a node tombstones
//! its whole subtree; holders of non-owning `NodeId`s (an in-flight input
//! sequence, a pooled palette key) detect the disappearance with
//! [`Tree::is_alive`] instead of receiving a destruction callback.

/// Stable handle to a node in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single tree node: id string, parent link, ordered children, payload
#[derive(Debug)]
pub struct Node<T> {
    pub id: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub data: T,
}

/// Arena of parent-linked nodes
#[derive(Debug, Default)]
pub struct Tree<T> {
    slots: Vec<Option<Node<T>>>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Create a detached node and return its handle
    pub fn create(&mut self, id: impl Into<String>, data: T) -> NodeId {
        let node = Node {
            id: id.into(),
            parent: None,
            children: Vec::new(),
            data,
        };
        self.slots.push(Some(node));
        NodeId((self.slots.len() - 1) as u32)
    }

    /// True while the node has not been removed from the tree
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.slots
            .get(node.index())
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, node: NodeId) -> Option<&Node<T>> {
        self.slots.get(node.index()).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(node.index())
            .and_then(|slot| slot.as_mut())
    }

    /// Payload of a live node.
    ///
    /// Panics on a tombstoned id; use [`Tree::is_alive`] first when holding
    /// a non-owning reference.
    pub fn data(&self, node: NodeId) -> &T {
        &self.node(node).data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut T {
        &mut self.node_mut(node).data
    }

    pub fn id(&self, node: NodeId) -> &str {
        &self.node(node).id
    }

    pub fn set_id(&mut self, node: NodeId, id: impl Into<String>) {
        self.node_mut(node).id = id.into();
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    fn node(&self, node: NodeId) -> &Node<T> {
        self.get(node).expect("dead node id")
    }

    fn node_mut(&mut self, node: NodeId) -> &mut Node<T> {
        self.get_mut(node).expect("dead node id")
    }

    /// Append `child` as the last child of `parent`, reparenting it away
    /// from any previous owner.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Detach + tombstone `child` and its whole subtree
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.retain(|&c| c != child);
        self.node_mut(child).parent = None;
        self.release(child);
    }

    /// Replace all children of `parent`, reparenting every new child.
    /// Previous children that are not in the new list are tombstoned.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let old = std::mem::take(&mut self.node_mut(parent).children);
        for child in old {
            if !children.contains(&child) {
                self.node_mut(child).parent = None;
                self.release(child);
            }
        }
        for &child in &children {
            self.detach(child);
            self.node_mut(child).parent = Some(parent);
        }
        self.node_mut(parent).children = children;
    }

    /// Tombstone a subtree. The slots stay allocated so stale ids fail the
    /// `is_alive` check instead of aliasing new nodes.
    pub fn release(&mut self, node: NodeId) {
        let children = match self.get(node) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            self.release(child);
        }
        self.slots[node.index()] = None;
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.node(child).parent {
            self.node_mut(old_parent).children.retain(|&c| c != child);
            self.node_mut(child).parent = None;
        }
    }

    /// Move `node` to the end of its siblings (top of the z-order)
    pub fn raise_to_top(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            let children = &mut self.node_mut(parent).children;
            children.retain(|&c| c != node);
            children.push(node);
        }
    }

    /// Move `node` to the start of its siblings (bottom of the z-order)
    pub fn lower_to_bottom(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            let children = &mut self.node_mut(parent).children;
            children.retain(|&c| c != node);
            children.insert(0, node);
        }
    }

    /// All nodes of the subtree in depth-first pre-order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_pre_order(root, &mut out);
        out
    }

    fn collect_pre_order(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for &child in self.children(node) {
            self.collect_pre_order(child, out);
        }
    }

    /// All nodes of the subtree in depth-first post-order
    pub fn descendants_post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_post_order(root, &mut out);
        out
    }

    fn collect_post_order(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            self.collect_post_order(child, out);
        }
        out.push(node);
    }

    /// Walk from `node` through its parents up to the root, inclusive
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            out.push(n);
            current = self.parent(n);
        }
        out
    }

    /// First node of the subtree with a matching id, pre-order
    pub fn find_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.find_if(root, |node| node.id == id)
    }

    /// All nodes of the subtree whose id is in `ids`, pre-order
    pub fn find_ids(&self, root: NodeId, ids: &[&str]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| ids.contains(&self.id(n)))
            .collect()
    }

    /// First node of the subtree matching a predicate, pre-order
    pub fn find_if(&self, root: NodeId, predicate: impl Fn(&Node<T>) -> bool) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&n| predicate(self.node(n)))
    }

    /// First node on the path from `node` to the root matching a predicate
    pub fn find_to_root_if(
        &self,
        node: NodeId,
        predicate: impl Fn(&Node<T>) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(node)
            .into_iter()
            .find(|&n| predicate(self.node(n)))
    }

    /// True if `node` is `other` or one of its ancestors
    pub fn is_parent_of(&self, node: NodeId, other: NodeId) -> bool {
        self.ancestors(other).contains(&node)
    }

    /// Root of the tree `node` belongs to
    pub fn root_of(&self, node: NodeId) -> NodeId {
        *self.ancestors(node).last().expect("ancestors is never empty")
    }

    /// Indented dump of the subtree, one line per node
    pub fn dump_tree(&self, root: NodeId, describe: impl Fn(&Node<T>) -> String) -> String {
        let mut out = String::new();
        self.dump_level(root, 0, &describe, &mut out);
        out
    }

    fn dump_level(
        &self,
        node: NodeId,
        level: usize,
        describe: &impl Fn(&Node<T>) -> String,
        out: &mut String,
    ) {
        out.push_str(&"   ".repeat(level));
        out.push_str(&describe(self.node(node)));
        out.push('\n');
        for &child in self.children(node) {
            self.dump_level(child, level + 1, describe, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (Tree<i32>, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.create("root", 0);
        let a = tree.create("a", 1);
        let b = tree.create("b", 2);
        let a1 = tree.create("a1", 3);
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(a, a1);
        (tree, root, a, b, a1)
    }

    #[test]
    fn test_append_child_sets_parent() {
        let (tree, root, a, b, a1) = sample_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.parent(a1), Some(a));
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn test_reparent_is_atomic() {
        let (mut tree, root, a, b, a1) = sample_tree();
        tree.append_child(b, a1);
        assert_eq!(tree.parent(a1), Some(b));
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[a1]);
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn test_remove_child_tombstones_subtree() {
        let (mut tree, root, a, _b, a1) = sample_tree();
        tree.remove_child(root, a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a1));
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn test_set_children_releases_dropped() {
        let (mut tree, root, a, b, a1) = sample_tree();
        tree.set_children(root, vec![b]);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a1));
        assert!(tree.is_alive(b));
        assert_eq!(tree.children(root), &[b]);
    }

    #[test]
    fn test_pre_order_traversal() {
        let (tree, root, a, b, a1) = sample_tree();
        assert_eq!(tree.descendants(root), vec![root, a, a1, b]);
    }

    #[test]
    fn test_post_order_traversal() {
        let (tree, root, a, b, a1) = sample_tree();
        assert_eq!(tree.descendants_post_order(root), vec![a1, a, b, root]);
    }

    #[test]
    fn test_find_id() {
        let (tree, root, _a, _b, a1) = sample_tree();
        assert_eq!(tree.find_id(root, "a1"), Some(a1));
        assert_eq!(tree.find_id(root, "missing"), None);
    }

    #[test]
    fn test_find_ids() {
        let (tree, root, a, b, _a1) = sample_tree();
        assert_eq!(tree.find_ids(root, &["a", "b"]), vec![a, b]);
    }

    #[test]
    fn test_ancestors_and_root() {
        let (tree, root, a, _b, a1) = sample_tree();
        assert_eq!(tree.ancestors(a1), vec![a1, a, root]);
        assert_eq!(tree.root_of(a1), root);
    }

    #[test]
    fn test_find_to_root_if() {
        let (tree, root, _a, _b, a1) = sample_tree();
        let found = tree.find_to_root_if(a1, |node| node.id == "root");
        assert_eq!(found, Some(root));
        assert_eq!(tree.find_to_root_if(a1, |_| false), None);
    }

    #[test]
    fn test_is_parent_of() {
        let (tree, root, a, b, a1) = sample_tree();
        assert!(tree.is_parent_of(root, a1));
        assert!(tree.is_parent_of(a, a1));
        assert!(tree.is_parent_of(a, a));
        assert!(!tree.is_parent_of(b, a1));
    }

    #[test]
    fn test_raise_and_lower() {
        let (mut tree, root, a, b, _a1) = sample_tree();
        tree.raise_to_top(a);
        assert_eq!(tree.children(root), &[b, a]);
        tree.lower_to_bottom(a);
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn test_dump_tree() {
        let (tree, root, ..) = sample_tree();
        let dump = tree.dump_tree(root, |node| format!("id='{}'", node.id));
        assert!(dump.starts_with("id='root'\n"));
        assert!(dump.contains("   id='a'\n"));
        assert!(dump.contains("      id='a1'\n"));
    }

    #[test]
    fn test_stale_id_detection() {
        let (mut tree, root, a, _b, a1) = sample_tree();
        let stale = a1;
        tree.remove_child(root, a);
        assert!(!tree.is_alive(stale));
        assert!(tree.get(stale).is_none());
    }
}

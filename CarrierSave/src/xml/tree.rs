//! Arena-backed element tree
//!
//! Every parsed root document is held in one [`XmlTree`]. Elements are
//! addressed by [`NodeId`] handles, so typed overlays can be cheap `Copy`
//! views that borrow the tree only for the duration of a call.
//!
//! Detaching an element unlinks it from its parent but leaves the storage in
//! the arena; a detached element is unreachable from the root and is never
//! serialized.

use indexmap::IndexMap;

/// Handle to an element inside one [`XmlTree`].
///
/// Handles are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single element: tag, ordered attributes, optional text and children.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Element tag name.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: IndexMap<String, String>,
    /// Character data directly inside this element, if any.
    pub text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    /// Child handles in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent handle, `None` for the root and for detached elements.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// An element tree for one logical root document.
#[derive(Debug, Clone, Default)]
pub struct XmlTree {
    nodes: Vec<Element>,
    root: Option<NodeId>,
}

impl XmlTree {
    /// Creates an empty tree with no root element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree whose root is a new, empty element.
    #[must_use]
    pub fn with_root(tag: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.create_element(tag);
        tree.root = Some(root);
        tree
    }

    /// The root element, if the document was present.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes `node` the root element.
    pub fn set_root(&mut self, node: NodeId) {
        self.detach(node);
        self.root = Some(node);
    }

    /// Returns the root element, creating one with `tag` if the document was empty.
    pub fn ensure_root(&mut self, tag: &str) -> NodeId {
        if let Some(root) = self.root {
            return root;
        }
        let root = self.create_element(tag);
        self.root = Some(root);
        root
    }

    /// Allocates a new detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: tag.to_string(),
            ..Element::default()
        });
        id
    }

    /// Borrow an element.
    #[must_use]
    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    /// Mutably borrow an element.
    pub fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    /// Raw attribute value.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let attributes = &mut self.nodes[node.0].attributes;
        if let Some(slot) = attributes.get_mut(name) {
            *slot = value.into();
        } else {
            attributes.insert(name.to_string(), value.into());
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attributes.shift_remove(name)
    }

    /// Child handles in document order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Parent handle.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Children with a given tag, in document order.
    pub fn children_by_tag<'a>(
        &'a self,
        node: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(node)
            .iter()
            .copied()
            .filter(move |child| self.tag(*child) == tag)
    }

    /// First child with a given tag.
    #[must_use]
    pub fn find_child(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.children_by_tag(node, tag).next()
    }

    /// Follow a path of child tags from `node`, taking the first match at each step.
    #[must_use]
    pub fn find_path(&self, node: NodeId, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(node, |current, tag| self.find_child(current, tag))
    }

    /// Follow a path of child tags from `node`, creating missing elements.
    pub fn ensure_path(&mut self, node: NodeId, path: &[&str]) -> NodeId {
        let mut current = node;
        for tag in path {
            current = match self.find_child(current, tag) {
                Some(child) => child,
                None => {
                    let child = self.create_element(tag);
                    self.append_child(current, child);
                    child
                }
            };
        }
        current
    }

    /// Append `child` as the last child of `parent`, moving it if it was attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` before position `index` of `parent`, or last if `index` is past the end.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        children.insert(index.min(children.len()), child);
    }

    /// Unlink an element from its parent. Detaching the root empties the document.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        } else if self.root == Some(node) {
            self.root = None;
        }
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if self.root == Some(current) {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Copy the subtree at `node` of `source` into this tree, returning the detached copy.
    pub fn import(&mut self, source: &XmlTree, node: NodeId) -> NodeId {
        let original = source.element(node);
        let copy = self.create_element(&original.tag);
        self.nodes[copy.0].attributes = original.attributes.clone();
        self.nodes[copy.0].text = original.text.clone();
        for child in original.children() {
            let child_copy = self.import(source, *child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Number of elements reachable from the root.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(tree: &XmlTree, node: NodeId) -> usize {
            1 + tree
                .children(node)
                .iter()
                .map(|child| count(tree, *child))
                .sum::<usize>()
        }
        self.root.map_or(0, |root| count(self, root))
    }

    /// Whether the document has no root element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

//! Listing page backed by a parsed `scraper` document.
//!
//! The engine reads and annotates a [`Page`]. Nodes are addressed by
//! [`NodeId`], a handle into the document tree; detached nodes stay in the
//! tree's storage until the page is dropped, so an id never dangles.
//!
//! All walks go through the tree's iterators, so nesting depth is bounded
//! only by memory.

use ego_tree::NodeRef;
use scraper::node::Text;
use scraper::{ElementRef, Html, Node, Selector, StrTendril};

pub use ego_tree::NodeId;

#[derive(Debug, Clone)]
pub struct Page {
    html: Html,
}

impl Page {
    #[must_use]
    pub fn parse_html(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// The document node; every attached node descends from it.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|p| p.id())
    }

    /// Element children only, like the DOM's `children` collection.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.children()
                    .filter(|c| c.value().is_element())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.value().is_element())
    }

    /// Lowercase tag name, `None` for text and document nodes.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.value().name())
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Concatenated text of the node and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.node(id)
            .map(|n| {
                n.descendants()
                    .filter_map(|d| d.value().as_text())
                    .map(|t| &**t)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.descendants().skip(1).map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    fn matching<'a>(
        &'a self,
        scope: NodeId,
        selector: &'a Selector,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.node(scope)
            .into_iter()
            .flat_map(|n| n.descendants().skip(1))
            .filter_map(ElementRef::wrap)
            .filter(move |e| selector.matches(e))
            .map(|e| e.id())
    }

    /// Descendant elements of `scope` matching `selector`, in document
    /// order. Like `querySelectorAll`, `scope` itself is excluded.
    #[must_use]
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.matching(scope, selector).collect()
    }

    #[must_use]
    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.matching(scope, selector).next()
    }

    /// Parses `markup` as a fragment and copies its first element, subtree
    /// included, into the page as a detached node.
    pub fn create_fragment(&mut self, markup: &str) -> Option<NodeId> {
        let fragment = Html::parse_fragment(markup);
        let source = fragment
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() != "html")?;

        let copy = self
            .html
            .tree
            .orphan(Node::Element(source.value().clone()))
            .id();
        let mut stack: Vec<(NodeRef<'_, Node>, NodeId)> =
            source.children().rev().map(|c| (c, copy)).collect();
        while let Some((node, parent)) = stack.pop() {
            let Some(mut parent) = self.html.tree.get_mut(parent) else {
                continue;
            };
            let id = parent.append(node.value().clone()).id();
            stack.extend(node.children().rev().map(|c| (c, id)));
        }
        Some(copy)
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return;
        };
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
        node.append(Node::Text(Text {
            text: StrTendril::from_slice(text),
        }));
    }

    /// Appends `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(child).is_none() || self.is_ancestor(child, parent) {
            return;
        }
        let Some(mut parent) = self.html.tree.get_mut(parent) else {
            return;
        };
        // Re-appending the current last child must stay a no-op.
        if parent.last_child().map(|c| c.id()) == Some(child) {
            return;
        }
        parent.append_id(child);
    }

    /// Detaches `id` from its parent. The subtree stays addressable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Whether `id` is still reachable from the document node.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.is_ancestor(self.root(), id)
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| n.ancestors().any(|a| a.id() == ancestor))
    }

    /// Serializes the attached document back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.html.html()
    }
}

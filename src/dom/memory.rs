//! In-memory document used by tests and native embedders.
//!
//! Elements live in an arena addressed by [`NodeId`]. Styles are inline only:
//! `visibility` and `cursor` inherit the way CSS inherits them, `display: none`
//! collapses the box of the whole subtree, and every element otherwise renders
//! with its configured [`ElementSize`]. Mutations broadcast a [`MutationRecord`]
//! to subscribers and activations are recorded for inspection.
use std::cell::RefCell;

use tokio::sync::broadcast;

use crate::dom::selector::{ElementView, SelectorList};
use crate::dom::traits::Document;
use crate::dom::types::{ComputedStyle, Cursor, Display, ElementSize, MutationRecord, Visibility};
use crate::errors::QuickSpaceResult;

/// Box given to elements that do not set one explicitly.
pub const DEFAULT_SIZE: ElementSize = ElementSize {
    width: 120.0,
    height: 24.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub cursor: Option<Cursor>,
}

/// Builder for an element to insert with [`MemoryDocument::append`].
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    style: InlineStyle,
    size: ElementSize,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            text: None,
            style: InlineStyle::default(),
            size: DEFAULT_SIZE,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        self.attributes.retain(|(k, _)| *k != name);
        self.attributes.push((name, value.to_string()));
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn display(mut self, display: Display) -> Self {
        self.style.display = Some(display);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.style.visibility = Some(visibility);
        self
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.style.cursor = Some(cursor);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = ElementSize::new(width, height);
        self
    }
}

#[derive(Debug, Clone)]
enum Child {
    Element(NodeId),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementNode {
    tag: String,
    attributes: Vec<(String, String)>,
    style: InlineStyle,
    size: ElementSize,
    children: Vec<Child>,
    parent: Option<NodeId>,
    attached: bool,
}

impl ElementNode {
    fn from_spec(spec: ElementSpec, parent: Option<NodeId>) -> Self {
        let children = spec.text.map(Child::Text).into_iter().collect();
        Self {
            tag: spec.tag,
            attributes: spec.attributes,
            style: spec.style,
            size: spec.size,
            children,
            parent,
            attached: true,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<ElementNode>,
}

impl Arena {
    fn get(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(id.0)
    }

    fn live(&self, id: NodeId) -> Option<&ElementNode> {
        self.get(id).filter(|node| node.attached)
    }

    /// Pre-order walk of the element children of `id`, excluding `id`.
    fn descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.get(id) else { return };
        for child in &node.children {
            if let Child::Element(child_id) = child {
                out.push(*child_id);
                self.descendants(*child_id, out);
            }
        }
    }

    fn text_of(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        for child in &node.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(child_id) => self.text_of(*child_id, out),
            }
        }
    }

    fn inherited<T: Copy>(&self, id: NodeId, pick: impl Fn(&InlineStyle) -> Option<T>) -> Option<T> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if let Some(value) = pick(&node.style) {
                return Some(value);
            }
            current = node.parent;
        }
        None
    }
}

#[derive(Clone, Copy)]
struct NodeView<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl ElementView for NodeView<'_> {
    fn tag(&self) -> &str {
        self.arena.get(self.id).map(|n| n.tag.as_str()).unwrap_or("")
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.arena.get(self.id)?.attr(name)
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.arena.get(self.id)?.parent?;
        Some(NodeView {
            arena: self.arena,
            id: parent,
        })
    }
}

pub struct MemoryDocument {
    arena: RefCell<Arena>,
    root: NodeId,
    body: NodeId,
    url: String,
    activations: RefCell<Vec<NodeId>>,
    mutations: broadcast::Sender<MutationRecord>,
}

impl MemoryDocument {
    /// An empty `<html><body></body></html>` document.
    pub fn new(url: &str) -> Self {
        let mut arena = Arena::default();
        arena
            .nodes
            .push(ElementNode::from_spec(ElementSpec::new("html").size(1280.0, 800.0), None));
        let root = NodeId(0);
        arena.nodes.push(ElementNode::from_spec(
            ElementSpec::new("body").size(1280.0, 800.0),
            Some(root),
        ));
        let body = NodeId(1);
        arena.nodes[root.0].children.push(Child::Element(body));

        let (mutations, _) = broadcast::channel(64);
        Self {
            arena: RefCell::new(arena),
            root,
            body,
            url: url.to_string(),
            activations: RefCell::new(Vec::new()),
            mutations,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn subscribe_mutations(&self) -> broadcast::Receiver<MutationRecord> {
        self.mutations.subscribe()
    }

    /// Appends a new element as the last child of `parent` and reports the insertion.
    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = {
            let mut arena = self.arena.borrow_mut();
            let id = NodeId(arena.nodes.len());
            arena.nodes.push(ElementNode::from_spec(spec, Some(parent)));
            if let Some(parent_node) = arena.nodes.get_mut(parent.0) {
                parent_node.children.push(Child::Element(id));
            }
            id
        };
        self.notify(MutationRecord {
            added_subtrees: 1,
            added_elements: 1,
        });
        id
    }

    /// Appends a bare text node to `parent`.
    pub fn append_text(&self, parent: NodeId, text: &str) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(parent.0) {
            node.children.push(Child::Text(text.to_string()));
        }
    }

    /// Detaches `id` and its subtree. Handles to them stay valid but report no style.
    pub fn remove(&self, id: NodeId) {
        let mut arena = self.arena.borrow_mut();
        let Some(parent) = arena.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = arena.nodes.get_mut(parent.0) {
            parent_node
                .children
                .retain(|c| !matches!(c, Child::Element(child) if *child == id));
        }
        let mut subtree = vec![id];
        arena.descendants(id, &mut subtree);
        for node_id in subtree {
            if let Some(node) = arena.nodes.get_mut(node_id.0) {
                node.attached = false;
            }
        }
        if let Some(node) = arena.nodes.get_mut(id.0) {
            node.parent = None;
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(id.0) {
            let name = name.to_ascii_lowercase();
            match node.attributes.iter_mut().find(|(k, _)| *k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => node.attributes.push((name, value.to_string())),
            }
        }
    }

    pub fn update_style(&self, id: NodeId, update: impl FnOnce(&mut InlineStyle)) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(id.0) {
            update(&mut node.style);
        }
    }

    pub fn set_size(&self, id: NodeId, width: f64, height: f64) {
        if let Some(node) = self.arena.borrow_mut().nodes.get_mut(id.0) {
            node.size = ElementSize::new(width, height);
        }
    }

    /// Elements activated so far, oldest first.
    pub fn activations(&self) -> Vec<NodeId> {
        self.activations.borrow().clone()
    }

    fn notify(&self, record: MutationRecord) {
        // No subscribers is the common case.
        let _ = self.mutations.send(record);
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;

    fn all_elements(&self, scope: Option<&NodeId>) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        let mut out = Vec::new();
        match scope {
            Some(scope) => {
                if arena.live(*scope).is_some() {
                    arena.descendants(*scope, &mut out);
                }
            }
            None => {
                out.push(self.root);
                arena.descendants(self.root, &mut out);
            }
        }
        out
    }

    fn query_selector_all(&self, selector: &str) -> QuickSpaceResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let candidates = self.all_elements(None);
        let arena = self.arena.borrow();
        Ok(candidates
            .into_iter()
            .filter(|id| {
                list.matches(&NodeView {
                    arena: &arena,
                    id: *id,
                })
            })
            .collect())
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.arena
            .borrow()
            .get(*element)
            .map(|n| n.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.arena
            .borrow()
            .get(*element)?
            .attr(name)
            .map(str::to_string)
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.arena.borrow().get(*element)?.parent
    }

    fn text_content(&self, element: &NodeId) -> String {
        let mut out = String::new();
        self.arena.borrow().text_of(*element, &mut out);
        out
    }

    fn computed_style(&self, element: &NodeId) -> Option<ComputedStyle> {
        let arena = self.arena.borrow();
        let node = arena.live(*element)?;
        Some(ComputedStyle {
            display: node
                .style
                .display
                .unwrap_or_else(|| Display::default_for_tag(&node.tag)),
            visibility: arena
                .inherited(*element, |s| s.visibility)
                .unwrap_or_default(),
            cursor: arena.inherited(*element, |s| s.cursor).unwrap_or_default(),
        })
    }

    fn rendered_size(&self, element: &NodeId) -> ElementSize {
        let arena = self.arena.borrow();
        let Some(node) = arena.live(*element) else {
            return ElementSize::ZERO;
        };
        if node.style.display == Some(Display::Contents) {
            return ElementSize::ZERO;
        }
        let hidden_by_display = arena
            .inherited(*element, |s| (s.display == Some(Display::None)).then_some(()))
            .is_some();
        if hidden_by_display {
            ElementSize::ZERO
        } else {
            node.size
        }
    }

    fn is_content_editable(&self, element: &NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut current = Some(*element);
        while let Some(id) = current {
            let Some(node) = arena.get(id) else {
                return false;
            };
            match node.attr("contenteditable") {
                Some(value) => {
                    return matches!(
                        value.to_ascii_lowercase().as_str(),
                        "" | "true" | "plaintext-only"
                    )
                }
                None => current = node.parent,
            }
        }
        false
    }

    fn activate(&self, element: &NodeId) {
        tracing::debug!(node = element.0, "memory document activation");
        self.activations.borrow_mut().push(*element);
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

#![allow(clippy::excessive_nesting, reason = "tree walks")]
//! An in-memory document mirror that implements [`DomAccess`].
//!
//! Tree structure arrives through [`DOMSubscriber::apply_update`] like any
//! other mirror; geometry, scroll state and the window page offset are set by
//! the host. Writes made through [`DomAccess`] are applied; a document built with
//! [`Document::with_journal`] also appends them to a journal so hosts can
//! forward them and tests can assert on them.

use crate::access::{DomAccess, EventKind, EventTarget};
use crate::geometry::{LayoutBox, ScrollMetrics};
use crate::selector::SelectorList;
use crate::{DOMSubscriber, DOMUpdate, NodeKey};
use anyhow::{Context as _, Result, bail};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};

/// Mutable state of the mirrored document.
#[derive(Debug)]
pub struct Document {
    /// Map node -> tag name, lowercase.
    tag_by_key: HashMap<NodeKey, String>,
    /// Map node -> attributes (names lowercase).
    attrs_by_key: HashMap<NodeKey, BTreeMap<String, String>>,
    /// Map node -> inline style properties.
    style_by_key: HashMap<NodeKey, BTreeMap<String, String>>,
    /// Parent -> children relation, in tree order.
    children_by_parent: HashMap<NodeKey, Vec<NodeKey>>,
    /// Child -> parent relation.
    parent_by_child: HashMap<NodeKey, NodeKey>,
    /// Box metrics reported by layout.
    boxes: HashMap<NodeKey, LayoutBox>,
    /// Explicit offset parents; absent entries default to the tree parent.
    offset_parents: HashMap<NodeKey, Option<NodeKey>>,
    /// Scroll state of scrollable nodes.
    scroll: HashMap<NodeKey, ScrollMetrics>,
    /// `window.pageXOffset` / `window.pageYOffset`.
    page_offset: (f64, f64),
    /// Registered listener counts.
    listeners: HashMap<(EventTarget, EventKind), usize>,
    /// Journal of writes made through `DomAccess`, when enabled.
    journal: Option<Vec<DOMUpdate>>,
    next_key: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only the `html` root element.
    pub fn new() -> Self {
        let mut tag_by_key = HashMap::new();
        tag_by_key.insert(NodeKey::ROOT, String::from("html"));
        let mut attrs_by_key = HashMap::new();
        attrs_by_key.insert(NodeKey::ROOT, BTreeMap::new());
        Self {
            tag_by_key,
            attrs_by_key,
            style_by_key: HashMap::new(),
            children_by_parent: HashMap::new(),
            parent_by_child: HashMap::new(),
            boxes: HashMap::new(),
            offset_parents: HashMap::new(),
            scroll: HashMap::new(),
            page_offset: (0.0, 0.0),
            listeners: HashMap::new(),
            journal: None,
            next_key: 1,
        }
    }

    /// Like [`Document::new`], but recording every write until drained with
    /// [`Document::take_writes`].
    pub fn with_journal() -> Self {
        Self {
            journal: Some(Vec::new()),
            ..Self::new()
        }
    }

    /// Mint a key, append a `tag` element under `parent` and return the key.
    ///
    /// # Errors
    /// Returns an error if `parent` is not in the document.
    pub fn create_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        let node = NodeKey(self.next_key);
        self.apply_update(DOMUpdate::InsertElement {
            parent,
            node,
            tag: tag.to_owned(),
            pos: usize::MAX,
        })?;
        Ok(node)
    }

    /// Whether `node` is currently attached.
    pub fn contains(&self, node: NodeKey) -> bool {
        self.tag_by_key.contains_key(&node)
    }

    /// Tree parent of `node`.
    pub fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.parent_by_child.get(&node).copied()
    }

    /// Current value of attribute `name` on `node`.
    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.attrs_by_key
            .get(&node)
            .and_then(|attrs| attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Current value of inline style property `name` on `node`.
    pub fn style_property(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.style_by_key
            .get(&node)
            .and_then(|style| style.get(name))
            .map(String::as_str)
    }

    /// Record box metrics for `node`.
    pub fn set_layout(&mut self, node: NodeKey, layout: LayoutBox) {
        self.boxes.insert(node, layout);
    }

    /// Override the offset parent of `node`; `None` ends the offset chain there.
    pub fn set_offset_parent(&mut self, node: NodeKey, offset_parent: Option<NodeKey>) {
        self.offset_parents.insert(node, offset_parent);
    }

    /// Record scroll extents (and position) for `node`.
    pub fn set_scroll_metrics(&mut self, node: NodeKey, metrics: ScrollMetrics) {
        self.scroll.insert(node, metrics);
    }

    /// Move the scroll position of `node`, keeping its extents.
    pub fn scroll_to(&mut self, node: NodeKey, left: f64, top: f64) {
        let metrics = self.scroll.entry(node).or_default();
        metrics.scroll_left = left;
        metrics.scroll_top = top;
    }

    /// Set `window.pageXOffset` / `window.pageYOffset`.
    pub fn set_page_offset(&mut self, x_offset: f64, y_offset: f64) {
        self.page_offset = (x_offset, y_offset);
    }

    /// Number of listeners currently registered for `kind` on `target`.
    pub fn listener_count(&self, target: EventTarget, kind: EventKind) -> usize {
        self.listeners.get(&(target, kind)).copied().unwrap_or(0)
    }

    /// Writes recorded since the last drain. Always empty without a journal.
    pub fn writes(&self) -> &[DOMUpdate] {
        self.journal.as_deref().unwrap_or_default()
    }

    /// Drain the write journal.
    pub fn take_writes(&mut self) -> Vec<DOMUpdate> {
        self.journal.as_mut().map(core::mem::take).unwrap_or_default()
    }

    fn record(&mut self, update: DOMUpdate) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(update);
        }
    }

    /// Remove a node (and its descendants) from all maps.
    fn remove_recursively(&mut self, node: NodeKey) {
        if let Some(children) = self.children_by_parent.remove(&node) {
            for child in children {
                self.remove_recursively(child);
            }
        }
        if let Some(parent) = self.parent_by_child.remove(&node)
            && let Some(siblings) = self.children_by_parent.get_mut(&parent)
        {
            siblings.retain(|sibling| *sibling != node);
        }
        self.tag_by_key.remove(&node);
        self.attrs_by_key.remove(&node);
        self.style_by_key.remove(&node);
        self.boxes.remove(&node);
        self.scroll.remove(&node);
        self.offset_parents.remove(&node);
        // Anything positioned against the removed node loses its chain.
        for offset_parent in self.offset_parents.values_mut() {
            if *offset_parent == Some(node) {
                *offset_parent = None;
            }
        }
    }

    /// Collect descendants of `scope` (excluding `scope`) in tree order.
    fn descendants(&self, scope: NodeKey, out: &mut Vec<NodeKey>) {
        if let Some(children) = self.children_by_parent.get(&scope) {
            for child in children {
                out.push(*child);
                self.descendants(*child, out);
            }
        }
    }

    fn layout_of(&self, node: NodeKey) -> LayoutBox {
        self.boxes.get(&node).copied().unwrap_or_default()
    }

    fn scroll_of(&self, node: NodeKey) -> ScrollMetrics {
        self.scroll.get(&node).copied().unwrap_or_default()
    }
}

impl DOMSubscriber for Document {
    /// Apply a tree mutation from the host.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => {
                if !self.contains(parent) {
                    bail!("InsertElement: parent {parent:?} is not in the document");
                }
                if self.contains(node) {
                    bail!("InsertElement: node {node:?} already exists");
                }
                self.parent_by_child.insert(node, parent);
                let siblings = self.children_by_parent.entry(parent).or_default();
                let index = pos.min(siblings.len());
                siblings.insert(index, node);
                self.tag_by_key.insert(node, tag.to_ascii_lowercase());
                self.attrs_by_key.insert(node, BTreeMap::new());
                self.next_key = self.next_key.max(node.0.saturating_add(1));
                trace!("Document: inserted <{tag}> as {node:?} under {parent:?}");
            }
            DOMUpdate::SetAttr { node, name, value } => {
                self.attrs_by_key
                    .get_mut(&node)
                    .with_context(|| format!("SetAttr: node {node:?} is not in the document"))?
                    .insert(name.to_ascii_lowercase(), value);
            }
            DOMUpdate::SetStyleProperty { node, name, value } => {
                if !self.contains(node) {
                    bail!("SetStyleProperty: node {node:?} is not in the document");
                }
                self.style_by_key.entry(node).or_default().insert(name, value);
            }
            DOMUpdate::RemoveNode { node } => {
                if node == NodeKey::ROOT {
                    bail!("RemoveNode: the document element cannot be removed");
                }
                self.remove_recursively(node);
                debug!("Document: removed {node:?} and descendants");
            }
        }
        Ok(())
    }
}

impl DomAccess for Document {
    fn document_element(&self) -> NodeKey {
        NodeKey::ROOT
    }

    fn query_selector_all(&self, scope: NodeKey, selector: &str) -> Result<Vec<NodeKey>> {
        let list = SelectorList::parse(selector)?;
        let mut candidates = Vec::new();
        self.descendants(scope, &mut candidates);
        let empty = BTreeMap::new();
        Ok(candidates
            .into_iter()
            .filter(|node| {
                let tag = self.tag_by_key.get(node).map_or("", String::as_str);
                let attrs = self.attrs_by_key.get(node).unwrap_or(&empty);
                list.matches(tag, attrs)
            })
            .collect())
    }

    fn offset_left(&self, node: NodeKey) -> f64 {
        self.layout_of(node).offset_left
    }

    fn offset_top(&self, node: NodeKey) -> f64 {
        self.layout_of(node).offset_top
    }

    fn offset_parent(&self, node: NodeKey) -> Option<NodeKey> {
        if !self.contains(node) {
            return None;
        }
        match self.offset_parents.get(&node) {
            Some(explicit) => *explicit,
            None => self.parent(node),
        }
    }

    fn offset_width(&self, node: NodeKey) -> f64 {
        self.layout_of(node).offset_width
    }

    fn offset_height(&self, node: NodeKey) -> f64 {
        self.layout_of(node).offset_height
    }

    fn client_width(&self, node: NodeKey) -> f64 {
        self.layout_of(node).client_width
    }

    fn client_height(&self, node: NodeKey) -> f64 {
        self.layout_of(node).client_height
    }

    fn scroll_left(&self, node: NodeKey) -> f64 {
        self.scroll_of(node).scroll_left
    }

    fn scroll_top(&self, node: NodeKey) -> f64 {
        self.scroll_of(node).scroll_top
    }

    fn scroll_width(&self, node: NodeKey) -> f64 {
        self.scroll_of(node).scroll_width
    }

    fn scroll_height(&self, node: NodeKey) -> f64 {
        self.scroll_of(node).scroll_height
    }

    fn page_offset(&self) -> (f64, f64) {
        self.page_offset
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) {
        if let Some(attrs) = self.attrs_by_key.get_mut(&node) {
            attrs.insert(name.to_ascii_lowercase(), value.to_owned());
        }
        self.record(DOMUpdate::SetAttr {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn set_style_property(&mut self, node: NodeKey, name: &str, value: &str) {
        if self.contains(node) {
            self.style_by_key
                .entry(node)
                .or_default()
                .insert(name.to_owned(), value.to_owned());
        }
        self.record(DOMUpdate::SetStyleProperty {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn add_event_listener(&mut self, target: EventTarget, kind: EventKind) {
        *self.listeners.entry((target, kind)).or_default() += 1;
    }

    fn remove_event_listener(&mut self, target: EventTarget, kind: EventKind) {
        if let Some(count) = self.listeners.get_mut(&(target, kind)) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.listeners.remove(&(target, kind));
            }
        }
    }
}

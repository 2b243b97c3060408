//! The DOM capability consumed by scroll-linked engines.
//!
//! Keep this trait small so hosts can be swapped: a browser binding, a
//! headless page, or the in-memory [`Document`](crate::Document).

use crate::NodeKey;
use anyhow::Result;

/// Where an event listener is attached.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventTarget {
    /// The browsing context (`window`).
    Window,
    /// A concrete element.
    Node(NodeKey),
}

/// Event types the engine listens for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventKind {
    Scroll,
    Resize,
}

/// Read and write access to a live document.
///
/// Reads must not mutate the document; writes must not trigger layout reads.
/// Missing nodes read as zero geometry and have no offset parent.
pub trait DomAccess {
    /// The document element (`document.documentElement`).
    fn document_element(&self) -> NodeKey;

    /// Resolve `selector` against the descendants of `scope`, in tree order.
    ///
    /// # Errors
    /// Returns an error if the selector cannot be parsed.
    fn query_selector_all(&self, scope: NodeKey, selector: &str) -> Result<Vec<NodeKey>>;

    /// `offsetLeft` of `node`.
    fn offset_left(&self, node: NodeKey) -> f64;
    /// `offsetTop` of `node`.
    fn offset_top(&self, node: NodeKey) -> f64;
    /// `offsetParent` of `node`, if any.
    fn offset_parent(&self, node: NodeKey) -> Option<NodeKey>;
    /// `offsetWidth` of `node`.
    fn offset_width(&self, node: NodeKey) -> f64;
    /// `offsetHeight` of `node`.
    fn offset_height(&self, node: NodeKey) -> f64;
    /// `clientWidth` of `node`.
    fn client_width(&self, node: NodeKey) -> f64;
    /// `clientHeight` of `node`.
    fn client_height(&self, node: NodeKey) -> f64;

    fn scroll_left(&self, node: NodeKey) -> f64;
    fn scroll_top(&self, node: NodeKey) -> f64;
    fn scroll_width(&self, node: NodeKey) -> f64;
    fn scroll_height(&self, node: NodeKey) -> f64;

    /// `window.pageXOffset` / `window.pageYOffset`.
    fn page_offset(&self) -> (f64, f64);

    /// `element.setAttribute(name, value)`.
    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str);
    /// `element.style.setProperty(name, value)`.
    fn set_style_property(&mut self, node: NodeKey, name: &str, value: &str);

    /// Register interest in `kind` events on `target`.
    fn add_event_listener(&mut self, target: EventTarget, kind: EventKind);
    /// Drop interest in `kind` events on `target`.
    fn remove_event_listener(&mut self, target: EventTarget, kind: EventKind);
}

//! Host-side DOM facade for scroll-linked effects.
//! This crate centralizes the node handles, mutation model and geometry
//! capability shared between the scroll engine and whatever hosts the page
//! (a real browser binding, a headless engine, or the in-memory [`Document`]).

pub mod access;
pub use access::{DomAccess, EventKind, EventTarget};

/// In-memory document mirror with geometry, listeners and a write journal.
pub mod document;
pub use document::Document;

pub mod geometry;
pub use geometry::{LayoutBox, ScrollMetrics};

/// Selector subset used for element lookups.
pub mod selector;
pub use selector::{Selector, SelectorList};

// ============================
// Stable Node keys
// ============================

/// A 64-bit stable key for DOM nodes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The root node key (always present, the document element).
    pub const ROOT: Self = Self(0);
}

// ============================
// DOM Update model + mirror pattern
// ============================

/// A batchable DOM mutation, either fed into a mirror or recorded as a write.
#[derive(Debug, Clone, PartialEq)]
pub enum DOMUpdate {
    InsertElement { parent: NodeKey, node: NodeKey, tag: String, pos: usize },
    SetAttr { node: NodeKey, name: String, value: String },
    SetStyleProperty { node: NodeKey, name: String, value: String },
    RemoveNode { node: NodeKey },
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    /// Returns an error when the update references nodes the subscriber cannot place.
    fn apply_update(&mut self, update: DOMUpdate) -> anyhow::Result<()>;
}

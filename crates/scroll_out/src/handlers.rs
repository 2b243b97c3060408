//! User notification slots.

use crate::context::{ElementContext, ScrollingElementContext};
use core::fmt;
use dom::NodeKey;

/// Called with (element, element context, scrolling root element).
pub type ElementHandler = Box<dyn FnMut(NodeKey, &ElementContext, NodeKey)>;

/// Called with (scrolling root element, root context, tracked list).
pub type ScrollHandler = Box<dyn FnMut(NodeKey, &ScrollingElementContext, &[ElementContext])>;

/// Optional handlers invoked by the render pass. Empty slots are no-ops.
#[derive(Default)]
pub struct Handlers {
    on_change: Option<ElementHandler>,
    on_shown: Option<ElementHandler>,
    on_hidden: Option<ElementHandler>,
    on_scroll: Option<ScrollHandler>,
}

impl Handlers {
    /// Called whenever an element's visibility verdict flips.
    #[must_use]
    pub fn on_change(
        mut self,
        handler: impl FnMut(NodeKey, &ElementContext, NodeKey) + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    /// Called after `on_change` when an element became visible.
    #[must_use]
    pub fn on_shown(
        mut self,
        handler: impl FnMut(NodeKey, &ElementContext, NodeKey) + 'static,
    ) -> Self {
        self.on_shown = Some(Box::new(handler));
        self
    }

    /// Called after `on_change` when an element stopped being visible.
    #[must_use]
    pub fn on_hidden(
        mut self,
        handler: impl FnMut(NodeKey, &ElementContext, NodeKey) + 'static,
    ) -> Self {
        self.on_hidden = Some(Box::new(handler));
        self
    }

    /// Called when the root scroll metrics changed.
    #[must_use]
    pub fn on_scroll(
        mut self,
        handler: impl FnMut(NodeKey, &ScrollingElementContext, &[ElementContext]) + 'static,
    ) -> Self {
        self.on_scroll = Some(Box::new(handler));
        self
    }

    /// Dispatch a visibility flip: `on_change`, then `on_shown` or `on_hidden`.
    pub(crate) fn visibility_changed(&mut self, ctx: &ElementContext, root: NodeKey) {
        if let Some(handler) = self.on_change.as_mut() {
            handler(ctx.element, ctx, root);
        }
        let follow_up = if ctx.visible() {
            self.on_shown.as_mut()
        } else {
            self.on_hidden.as_mut()
        };
        if let Some(handler) = follow_up {
            handler(ctx.element, ctx, root);
        }
    }

    pub(crate) fn scrolled(
        &mut self,
        root: NodeKey,
        ctx: &ScrollingElementContext,
        elements: &[ElementContext],
    ) {
        if let Some(handler) = self.on_scroll.as_mut() {
            handler(root, ctx, elements);
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Handlers")
            .field("on_change", &self.on_change.is_some())
            .field("on_shown", &self.on_shown.is_some())
            .field("on_hidden", &self.on_hidden.is_some())
            .field("on_scroll", &self.on_scroll.is_some())
            .finish()
    }
}

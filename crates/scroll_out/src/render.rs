//! The write phase: apply one frame's worth of attribute, property and
//! handler updates for everything the measurement pass flagged.

use crate::config::{CssProps, ScrollOutConfig};
use crate::context::{ContextField, ElementContext, ScrollingElementContext};
use crate::handlers::Handlers;
use dom::{DomAccess, NodeKey};

/// Visibility marker attribute on tracked elements.
pub const SCROLL_ATTR: &str = "data-scroll";
/// Horizontal scroll direction attribute on the root element.
pub const SCROLL_DIR_X_ATTR: &str = "data-scroll-dir-x";
/// Vertical scroll direction attribute on the root element.
pub const SCROLL_DIR_Y_ATTR: &str = "data-scroll-dir-y";

/// What one render pass did, for logging.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    pub root_rendered: bool,
    pub elements_rendered: usize,
    pub visibility_flips: usize,
    pub pruned: usize,
}

/// Run one render pass over the flagged contexts.
///
/// Elements are visited from last to first so that pruning under `once`
/// never shifts an element that has not been visited yet.
pub fn render_pass<D: DomAccess>(
    dom: &mut D,
    root: NodeKey,
    root_ctx: &mut ScrollingElementContext,
    elements: &mut Vec<ElementContext>,
    config: &ScrollOutConfig,
    handlers: &mut Handlers,
) -> RenderOutcome {
    let mut outcome = RenderOutcome::default();

    if root_ctx.changed {
        root_ctx.changed = false;
        dom.set_attribute(root, SCROLL_DIR_X_ATTR, &root_ctx.scroll_dir_x.to_string());
        dom.set_attribute(root, SCROLL_DIR_Y_ATTR, &root_ctx.scroll_dir_y.to_string());
        write_props(dom, root, &config.css_props, &ContextField::ROOT, |field| {
            root_ctx.field(field)
        });
        handlers.scrolled(root, root_ctx, elements);
        outcome.root_rendered = true;
    }

    for position in (0..elements.len()).rev() {
        let ctx = &mut elements[position];
        if ctx.changed {
            ctx.changed = false;
            if let Some(measured) = ctx.measurement().copied() {
                write_props(dom, ctx.element, &config.css_props, &ContextField::ELEMENT, |field| {
                    measured.field(field)
                });
            }
            outcome.elements_rendered += 1;
        }
        if ctx.visible_changed {
            ctx.visible_changed = false;
            let marker = if ctx.visible() { "in" } else { "out" };
            dom.set_attribute(ctx.element, SCROLL_ATTR, marker);
            handlers.visibility_changed(ctx, root);
            outcome.visibility_flips += 1;
        }
        if ctx.visible() && config.once {
            elements.remove(position);
            outcome.pruned += 1;
        }
    }
    outcome
}

/// Mirror the selected fields onto `node` as CSS custom properties.
fn write_props<D: DomAccess>(
    dom: &mut D,
    node: NodeKey,
    css_props: &CssProps,
    fields: &[ContextField],
    value_of: impl Fn(ContextField) -> Option<f64>,
) {
    if !css_props.is_enabled() {
        return;
    }
    for field in fields.iter().copied().filter(|field| css_props.includes(*field)) {
        if let Some(value) = value_of(field) {
            dom.set_style_property(node, field.css_property(), &format_value(value));
        }
    }
}

/// Round to four decimals and print without trailing zeros.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        // Avoid "-0".
        return String::from("0");
    }
    rounded.to_string()
}

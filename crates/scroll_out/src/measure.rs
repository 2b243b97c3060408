//! The read phase: geometry sampling and derived metrics.
//!
//! Everything here only reads from the host. Results are compared and stored
//! by the engine; DOM writes happen in [`render`](crate::render).

use crate::context::Measurement;
use crate::math::{clamp, sign};
use dom::{DomAccess, NodeKey};
use log::trace;

/// Client size and scroll offset of the scrolling container.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Viewport {
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// One reading of the scrolling container.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RootSample {
    pub viewport: Viewport,
    pub scroll_percent_x: f64,
    pub scroll_percent_y: f64,
}

/// How the visibility verdict is decided.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VisibilityRule {
    /// Visible once the container is scrolled at least this far down,
    /// regardless of element geometry.
    Offset(f64),
    /// Visible when `visible_x * visible_y` exceeds the threshold.
    Ratio(f64),
}

impl VisibilityRule {
    /// Apply the rule. Non-finite ratio products (zero-size elements) are never visible.
    pub fn verdict(self, visible_x: f64, visible_y: f64, scroll_y: f64) -> bool {
        match self {
            Self::Offset(offset) => offset <= scroll_y,
            Self::Ratio(threshold) => {
                let product = visible_x * visible_y;
                product.is_finite() && threshold < product
            }
        }
    }
}

/// Read the container metrics.
///
/// `root` is the scrolling element, or the document element when the window
/// scrolls (`explicit == false`); only the latter falls back to the window
/// page offset when the element reports no scroll.
pub fn sample_root<D: DomAccess>(dom: &D, root: NodeKey, explicit: bool) -> RootSample {
    let client_width = dom.client_width(root);
    let client_height = dom.client_height(root);
    let scroll_left = dom.scroll_left(root);
    let scroll_top = dom.scroll_top(root);
    let (page_x, page_y) = if explicit { (0.0, 0.0) } else { dom.page_offset() };
    let scroll_x = if scroll_left == 0.0 { page_x } else { scroll_left };
    let scroll_y = if scroll_top == 0.0 { page_y } else { scroll_top };
    RootSample {
        viewport: Viewport {
            client_width,
            client_height,
            scroll_x,
            scroll_y,
        },
        scroll_percent_x: scroll_left / non_zero(dom.scroll_width(root) - client_width),
        scroll_percent_y: scroll_top / non_zero(dom.scroll_height(root) - client_height),
    }
}

/// Substitute 1 for a zero denominator.
fn non_zero(range: f64) -> f64 {
    if range == 0.0 { 1.0 } else { range }
}

/// Sum offsets from `element` up the offset-parent chain, stopping before
/// `container` (`None` for the window) or where the chain ends.
pub fn chain_offset<D: DomAccess>(
    dom: &D,
    element: NodeKey,
    container: Option<NodeKey>,
) -> (f64, f64) {
    let mut offset_x = 0.0;
    let mut offset_y = 0.0;
    let mut target = element;
    loop {
        offset_x += dom.offset_left(target);
        offset_y += dom.offset_top(target);
        match dom.offset_parent(target) {
            Some(parent) if Some(parent) != container => target = parent,
            _ => break,
        }
    }
    (offset_x, offset_y)
}

/// Fraction of `[start, start + size]` inside `[view_start, view_start + view_size]`.
/// `NaN` when `size` is zero.
pub fn visible_ratio(start: f64, size: f64, view_start: f64, view_size: f64) -> f64 {
    let view_end = view_start + view_size;
    (clamp(start + size, view_start, view_end) - clamp(start, view_start, view_end)) / size
}

/// Center position relative to the viewport center: 1 when the center sits
/// at the leading edge, -1 at the trailing edge, clamped beyond either.
pub fn viewport_position(start: f64, size: f64, view_start: f64, view_size: f64) -> f64 {
    let half_view = view_size / 2.0;
    clamp(
        (view_start - (size / 2.0 + start - half_view)) / half_view,
        -1.0,
        1.0,
    )
}

/// Derive every metric of one element.
pub fn measure_element<D: DomAccess>(
    dom: &D,
    element: NodeKey,
    index: usize,
    container: Option<NodeKey>,
    viewport: &Viewport,
    rule: VisibilityRule,
) -> Measurement {
    let Viewport {
        client_width,
        client_height,
        scroll_x,
        scroll_y,
    } = *viewport;
    let (offset_x, offset_y) = chain_offset(dom, element, container);
    let element_width = content_or_border(dom.client_width(element), dom.offset_width(element));
    let element_height = content_or_border(dom.client_height(element), dom.offset_height(element));

    let visible_x = visible_ratio(offset_x, element_width, scroll_x, client_width);
    let visible_y = visible_ratio(offset_y, element_height, scroll_y, client_height);
    let intersect = |visible: f64, delta: f64| if visible == 1.0 { 0 } else { sign(delta) };

    let measurement = Measurement {
        index,
        element_width,
        element_height,
        offset_x,
        offset_y,
        visible_x,
        visible_y,
        intersect_x: intersect(visible_x, offset_x - scroll_x),
        intersect_y: intersect(visible_y, offset_y - scroll_y),
        viewport_x: viewport_position(offset_x, element_width, scroll_x, client_width),
        viewport_y: viewport_position(offset_y, element_height, scroll_y, client_height),
        visible: rule.verdict(visible_x, visible_y, scroll_y),
    };
    trace!("measure: {element:?} -> {measurement:?}");
    measurement
}

/// Prefer the content box; fall back to the border box, then 0.
fn content_or_border(client: f64, offset: f64) -> f64 {
    if client != 0.0 {
        client
    } else if offset != 0.0 {
        offset
    } else {
        0.0
    }
}

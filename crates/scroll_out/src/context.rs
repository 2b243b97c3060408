//! Per-run state: the scrolling root context and one context per tracked element.
//!
//! Contexts are plain data owned by the engine. The measurement pass writes
//! them, the render pass reads them (and clears their dirty flags), and
//! handlers observe them by reference.

use dom::NodeKey;
use serde::{Deserialize, Serialize};

/// Scroll metrics of the scrolling container.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScrollingElementContext {
    /// Sign of the horizontal scroll delta since the previous pass.
    pub scroll_dir_x: i8,
    /// Sign of the vertical scroll delta since the previous pass.
    pub scroll_dir_y: i8,
    /// Fraction of the horizontal scroll range travelled. Not clamped.
    pub scroll_percent_x: f64,
    /// Fraction of the vertical scroll range travelled. Not clamped.
    pub scroll_percent_y: f64,
    /// Set when the metrics need to be rendered.
    pub(crate) changed: bool,
}

impl ScrollingElementContext {
    /// A context whose first render is forced.
    pub(crate) fn pending() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    /// Numeric value of a root-level field; `None` for element fields.
    pub fn field(&self, field: ContextField) -> Option<f64> {
        match field {
            ContextField::ScrollDirX => Some(f64::from(self.scroll_dir_x)),
            ContextField::ScrollDirY => Some(f64::from(self.scroll_dir_y)),
            ContextField::ScrollPercentX => Some(self.scroll_percent_x),
            ContextField::ScrollPercentY => Some(self.scroll_percent_y),
            _ => None,
        }
    }
}

/// Geometry derived for one element in one measurement pass.
///
/// Equality follows IEEE semantics: a `NaN` ratio never equals itself, so a
/// zero-size element is reported as changed on every pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Position in the tracked list during the pass. Not a stable id.
    pub index: usize,
    pub element_width: f64,
    pub element_height: f64,
    /// Offset from the scrolling container along the offset-parent chain.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Fraction of the width inside the viewport. `NaN` for zero width.
    pub visible_x: f64,
    /// Fraction of the height inside the viewport. `NaN` for zero height.
    pub visible_y: f64,
    /// Side the element protrudes from horizontally, 0 when fully visible.
    pub intersect_x: i8,
    /// Side the element protrudes from vertically, 0 when fully visible.
    pub intersect_y: i8,
    /// Center position relative to the viewport center, in `[-1, 1]`.
    pub viewport_x: f64,
    pub viewport_y: f64,
    /// The visibility verdict.
    pub visible: bool,
}

impl Measurement {
    /// Numeric value of an element-level field; `None` for root fields.
    pub fn field(&self, field: ContextField) -> Option<f64> {
        let value = match field {
            ContextField::Index => self.index as f64,
            ContextField::ElementWidth => self.element_width,
            ContextField::ElementHeight => self.element_height,
            ContextField::OffsetX => self.offset_x,
            ContextField::OffsetY => self.offset_y,
            ContextField::VisibleX => self.visible_x,
            ContextField::VisibleY => self.visible_y,
            ContextField::IntersectX => f64::from(self.intersect_x),
            ContextField::IntersectY => f64::from(self.intersect_y),
            ContextField::ViewportX => self.viewport_x,
            ContextField::ViewportY => self.viewport_y,
            ContextField::Visible => f64::from(u8::from(self.visible)),
            ContextField::ScrollDirX
            | ContextField::ScrollDirY
            | ContextField::ScrollPercentX
            | ContextField::ScrollPercentY => return None,
        };
        Some(value)
    }
}

/// State of one tracked element.
#[derive(Clone, Debug)]
pub struct ElementContext {
    /// The tracked node.
    pub element: NodeKey,
    measurement: Option<Measurement>,
    pub(crate) changed: bool,
    pub(crate) visible_changed: bool,
}

impl ElementContext {
    /// A fresh context with no measurement yet.
    pub(crate) const fn new(element: NodeKey) -> Self {
        Self {
            element,
            measurement: None,
            changed: false,
            visible_changed: false,
        }
    }

    /// The latest measurement, `None` until the first pass after indexing.
    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// The visibility verdict; unmeasured elements are not visible.
    pub fn visible(&self) -> bool {
        self.measurement.is_some_and(|measured| measured.visible)
    }

    /// Store `next` if it differs from the current measurement, flagging what changed.
    /// Returns whether anything changed.
    pub(crate) fn record(&mut self, next: Measurement) -> bool {
        if self.measurement.as_ref() == Some(&next) {
            return false;
        }
        let visible_changed = self.measurement.is_none_or(|prev| prev.visible != next.visible);
        self.changed = true;
        self.visible_changed = self.visible_changed || visible_changed;
        self.measurement = Some(next);
        true
    }
}

/// Every context field that can be mirrored to a CSS custom property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    ScrollDirX,
    ScrollDirY,
    ScrollPercentX,
    ScrollPercentY,
    Index,
    ElementWidth,
    ElementHeight,
    OffsetX,
    OffsetY,
    VisibleX,
    VisibleY,
    IntersectX,
    IntersectY,
    ViewportX,
    ViewportY,
    Visible,
}

impl ContextField {
    /// Fields carried by [`ScrollingElementContext`], in write order.
    pub const ROOT: [Self; 4] = [
        Self::ScrollDirX,
        Self::ScrollDirY,
        Self::ScrollPercentX,
        Self::ScrollPercentY,
    ];

    /// Fields carried by [`Measurement`], in write order.
    pub const ELEMENT: [Self; 12] = [
        Self::Index,
        Self::ElementWidth,
        Self::ElementHeight,
        Self::OffsetX,
        Self::OffsetY,
        Self::VisibleX,
        Self::VisibleY,
        Self::IntersectX,
        Self::IntersectY,
        Self::ViewportX,
        Self::ViewportY,
        Self::Visible,
    ];

    /// The CSS custom property mirroring this field.
    pub const fn css_property(self) -> &'static str {
        match self {
            Self::ScrollDirX => "--scroll-dir-x",
            Self::ScrollDirY => "--scroll-dir-y",
            Self::ScrollPercentX => "--scroll-percent-x",
            Self::ScrollPercentY => "--scroll-percent-y",
            Self::Index => "--index",
            Self::ElementWidth => "--element-width",
            Self::ElementHeight => "--element-height",
            Self::OffsetX => "--offset-x",
            Self::OffsetY => "--offset-y",
            Self::VisibleX => "--visible-x",
            Self::VisibleY => "--visible-y",
            Self::IntersectX => "--intersect-x",
            Self::IntersectY => "--intersect-y",
            Self::ViewportX => "--viewport-x",
            Self::ViewportY => "--viewport-y",
            Self::Visible => "--visible",
        }
    }
}

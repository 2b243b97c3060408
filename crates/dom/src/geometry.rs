//! Geometry records the host reports for each node.
//!
//! Values follow the CSSOM View model: `offset_*` describe the border box
//! relative to the offset parent, `client_*` the padding box without
//! scrollbars.

/// Box metrics of a single element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayoutBox {
    /// `offsetLeft` relative to the offset parent.
    pub offset_left: f64,
    /// `offsetTop` relative to the offset parent.
    pub offset_top: f64,
    /// Border-box width (`offsetWidth`).
    pub offset_width: f64,
    /// Border-box height (`offsetHeight`).
    pub offset_height: f64,
    /// Content-box width (`clientWidth`).
    pub client_width: f64,
    /// Content-box height (`clientHeight`).
    pub client_height: f64,
}

impl LayoutBox {
    /// A box whose border box and content box coincide.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            offset_left: left,
            offset_top: top,
            offset_width: width,
            offset_height: height,
            client_width: width,
            client_height: height,
        }
    }

    /// Override the content-box size, keeping the border box.
    #[inline]
    #[must_use]
    pub const fn with_client_size(mut self, width: f64, height: f64) -> Self {
        self.client_width = width;
        self.client_height = height;
        self
    }
}

/// Scroll state of a scrollable element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_left: f64,
    pub scroll_top: f64,
    /// Total scrollable content width.
    pub scroll_width: f64,
    /// Total scrollable content height.
    pub scroll_height: f64,
}

impl ScrollMetrics {
    #[inline]
    #[must_use]
    pub const fn new(scroll_width: f64, scroll_height: f64) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            scroll_width,
            scroll_height,
        }
    }
}

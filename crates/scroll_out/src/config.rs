//! Configuration for a scroll-out engine.
//!
//! Configuration can be deserialized from JSON, loaded from environment
//! variables, or constructed programmatically. Handlers are not part of the
//! configuration; see [`Handlers`](crate::Handlers).

use crate::context::ContextField;
use anyhow::{Context as _, Result, bail};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;

/// Default selector for tracked elements.
pub const DEFAULT_TARGETS: &str = "[data-scroll]";

/// Default frame budget in milliseconds.
pub const DEFAULT_FRAME_BUDGET_MS: u64 = 16;

/// Which context fields are mirrored to CSS custom properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CssPropsRepr", into = "CssPropsRepr")]
pub enum CssProps {
    /// Write nothing.
    #[default]
    None,
    /// Write every field of every context.
    All,
    /// Write only the listed fields.
    Fields(BTreeSet<ContextField>),
}

impl CssProps {
    /// Whether `field` should be written.
    pub fn includes(&self, field: ContextField) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Fields(fields) => fields.contains(&field),
        }
    }

    /// Whether any field will be written.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Fields(fields) => !fields.is_empty(),
        }
    }
}

/// Wire form: `true`, `false`, or `{ "visibleY": true, ... }`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CssPropsRepr {
    Flag(bool),
    Fields(BTreeMap<ContextField, bool>),
}

impl From<CssPropsRepr> for CssProps {
    fn from(repr: CssPropsRepr) -> Self {
        match repr {
            CssPropsRepr::Flag(true) => Self::All,
            CssPropsRepr::Flag(false) => Self::None,
            CssPropsRepr::Fields(map) => Self::Fields(
                map.into_iter()
                    .filter_map(|(field, enabled)| enabled.then_some(field))
                    .collect(),
            ),
        }
    }
}

impl From<CssProps> for CssPropsRepr {
    fn from(props: CssProps) -> Self {
        match props {
            CssProps::None => Self::Flag(false),
            CssProps::All => Self::Flag(true),
            CssProps::Fields(fields) => {
                Self::Fields(fields.into_iter().map(|field| (field, true)).collect())
            }
        }
    }
}

/// Options recognised by [`ScrollOut`](crate::ScrollOut).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ScrollOutConfig {
    /// Selector of the element under which targets are searched.
    /// Defaults to the scrolling element, or the document element.
    pub scope: Option<String>,
    /// Selector identifying tracked elements.
    pub targets: String,
    /// Selector of an alternate scrolling container. Defaults to the window.
    pub scrolling_element: Option<String>,
    /// Absolute scroll offset gate; switches the verdict to position mode.
    /// Zero counts as unset.
    pub offset: Option<f64>,
    /// Visible-ratio product an element must exceed. Ignored in offset mode.
    pub threshold: f64,
    /// Untrack elements once they have been visible.
    pub once: bool,
    /// Context fields mirrored to CSS custom properties.
    pub css_props: CssProps,
    /// Minimum time between delivered frames, in milliseconds.
    pub frame_budget_ms: u64,
}

impl Default for ScrollOutConfig {
    fn default() -> Self {
        Self {
            scope: None,
            targets: String::from(DEFAULT_TARGETS),
            scrolling_element: None,
            offset: None,
            threshold: 0.0,
            once: false,
            css_props: CssProps::None,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
        }
    }
}

impl ScrollOutConfig {
    /// Parse and validate a JSON configuration object.
    ///
    /// # Errors
    /// Returns an error for malformed JSON, unknown keys, unknown `cssProps`
    /// field names, or values rejected by [`Self::validate`].
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(source).context("failed to parse scroll-out configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SCROLL_OUT_TARGETS`: target selector (default: `[data-scroll]`)
    /// - `SCROLL_OUT_SCOPE`: scope selector
    /// - `SCROLL_OUT_SCROLLING_ELEMENT`: scrolling container selector
    /// - `SCROLL_OUT_OFFSET`: absolute scroll offset gate
    /// - `SCROLL_OUT_THRESHOLD`: visible-ratio threshold (default: 0)
    /// - `SCROLL_OUT_ONCE`: `1` or `true` to untrack after first reveal
    /// - `SCROLL_OUT_FRAME_BUDGET_MS`: frame budget (default: 16)
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build a configuration from a variable lookup, with the same names and
    /// fallbacks as [`Self::from_env`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|val| !val.trim().is_empty());
        let number = |name: &str| {
            non_empty(name)
                .and_then(|val| val.trim().parse::<f64>().ok())
                .filter(|val| val.is_finite())
        };
        Self {
            scope: non_empty("SCROLL_OUT_SCOPE"),
            targets: non_empty("SCROLL_OUT_TARGETS")
                .unwrap_or_else(|| String::from(DEFAULT_TARGETS)),
            scrolling_element: non_empty("SCROLL_OUT_SCROLLING_ELEMENT"),
            offset: number("SCROLL_OUT_OFFSET"),
            threshold: number("SCROLL_OUT_THRESHOLD").unwrap_or(0.0),
            once: matches!(
                non_empty("SCROLL_OUT_ONCE").as_deref().map(str::trim),
                Some("1" | "true")
            ),
            css_props: CssProps::None,
            frame_budget_ms: non_empty("SCROLL_OUT_FRAME_BUDGET_MS")
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_FRAME_BUDGET_MS),
        }
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    /// Returns an error for empty selectors or non-finite numbers.
    pub fn validate(&self) -> Result<()> {
        if self.targets.trim().is_empty() {
            bail!("`targets` selector must not be empty");
        }
        for (name, selector) in [
            ("scope", &self.scope),
            ("scrollingElement", &self.scrolling_element),
        ] {
            if selector.as_deref().is_some_and(|val| val.trim().is_empty()) {
                bail!("`{name}` selector must not be empty when set");
            }
        }
        if !self.threshold.is_finite() {
            bail!("`threshold` must be finite, got {}", self.threshold);
        }
        if let Some(offset) = self.offset
            && !offset.is_finite()
        {
            bail!("`offset` must be finite, got {offset}");
        }
        Ok(())
    }

    /// The offset gate if one is in effect. A zero offset means ratio mode.
    pub fn offset_gate(&self) -> Option<f64> {
        self.offset.filter(|offset| *offset != 0.0 && offset.is_finite())
    }

    /// Get the frame budget as a `Duration`.
    #[inline]
    #[must_use]
    pub const fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }
}

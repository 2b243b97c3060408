//! The engine instance: indexing, measurement, frame-batched rendering and
//! listener lifecycle for one scrolling container.

use crate::config::ScrollOutConfig;
use crate::context::{ElementContext, ScrollingElementContext};
use crate::handlers::Handlers;
use crate::math::sign;
use crate::measure::{self, VisibilityRule};
use crate::render::{self, RenderOutcome};
use crate::scheduler::{FrameLoop, FrameScheduler, SubscriptionId};
use anyhow::{Context as _, Result, anyhow};
use dom::{DomAccess, EventKind, EventTarget, NodeKey};
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::time::Instant;
use tracing::info_span;

/// Tracks elements against one scrolling container and keeps their
/// visibility markers, CSS properties and handlers up to date.
///
/// Measurement runs synchronously on every scroll/resize event delivered via
/// [`ScrollOut::handle_event`]; DOM writes are deferred to the next frame
/// delivered via [`ScrollOut::tick`], so at most one write pass happens per
/// frame no matter how many events arrive.
pub struct ScrollOut<D: DomAccess, F: FrameScheduler = FrameLoop> {
    dom: D,
    frames: F,
    config: ScrollOutConfig,
    handlers: Handlers,
    rule: VisibilityRule,
    /// The scrolling element, or the document element when the window scrolls.
    root: NodeKey,
    /// The configured scrolling element; `None` means the window.
    container: Option<NodeKey>,
    /// Root of the target search.
    scope: NodeKey,
    root_ctx: ScrollingElementContext,
    previous_scroll: Option<(f64, f64)>,
    elements: Vec<ElementContext>,
    subscription: Option<SubscriptionId>,
    listening: bool,
}

impl<D: DomAccess> ScrollOut<D> {
    /// Construct with a [`FrameLoop`] using the configured frame budget.
    ///
    /// # Errors
    /// See [`ScrollOut::with_scheduler`].
    pub fn new(dom: D, config: ScrollOutConfig, handlers: Handlers) -> Result<Self> {
        let frames = FrameLoop::new(config.frame_budget());
        Self::with_scheduler(dom, frames, config, handlers)
    }
}

impl<D: DomAccess, F: FrameScheduler> ScrollOut<D, F> {
    /// Resolve the configuration against `dom`, index and measure once, then
    /// start listening for window resizes and container scrolls.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, a selector cannot be
    /// parsed by the host, or `scrollingElement` / `scope` match nothing.
    pub fn with_scheduler(
        dom: D,
        frames: F,
        config: ScrollOutConfig,
        handlers: Handlers,
    ) -> Result<Self> {
        config.validate()?;
        let document = dom.document_element();
        let container = config
            .scrolling_element
            .as_deref()
            .map(|selector| first_match(&dom, document, selector, "scrollingElement"))
            .transpose()?;
        let root = container.unwrap_or(document);
        let scope = config
            .scope
            .as_deref()
            .map(|selector| first_match(&dom, document, selector, "scope"))
            .transpose()?
            .unwrap_or(root);
        let rule = config
            .offset_gate()
            .map_or(VisibilityRule::Ratio(config.threshold), VisibilityRule::Offset);

        let mut engine = Self {
            dom,
            frames,
            config,
            handlers,
            rule,
            root,
            container,
            scope,
            root_ctx: ScrollingElementContext::pending(),
            previous_scroll: None,
            elements: Vec::new(),
            subscription: None,
            listening: false,
        };
        engine.try_index()?;
        engine.update();

        engine
            .dom
            .add_event_listener(EventTarget::Window, EventKind::Resize);
        engine
            .dom
            .add_event_listener(engine.scroll_target(), EventKind::Scroll);
        engine.listening = true;
        debug!(
            "ScrollOut: tracking {} element(s), root={:?}, rule={:?}",
            engine.elements.len(),
            engine.root,
            engine.rule
        );
        Ok(engine)
    }

    /// Re-resolve the target selector and replace the tracked list with fresh
    /// contexts. Prior per-element state is discarded, so the next
    /// [`update`](Self::update) measures every element from scratch.
    ///
    /// Element identity is not preserved across calls: a render already
    /// scheduled when this runs operates on the new list.
    pub fn index(&mut self) {
        if let Err(error) = self.try_index() {
            warn!("ScrollOut: index failed, tracking nothing: {error:#}");
            self.elements.clear();
        }
    }

    fn try_index(&mut self) -> Result<()> {
        let found = self
            .dom
            .query_selector_all(self.scope, &self.config.targets)
            .with_context(|| format!("invalid targets selector '{}'", self.config.targets))?;
        let mut seen = HashSet::with_capacity(found.len());
        self.elements = found
            .into_iter()
            .filter(|node| seen.insert(*node))
            .map(ElementContext::new)
            .collect();
        trace!("ScrollOut: indexed {} element(s)", self.elements.len());
        Ok(())
    }

    /// Measurement pass: read container and element geometry, record what
    /// changed, and subscribe to the next frame if anything did.
    /// Performs no DOM writes.
    pub fn update(&mut self) {
        let _span = info_span!("scroll_out.update").entered();

        let sample = measure::sample_root(&self.dom, self.root, self.container.is_some());
        let viewport = sample.viewport;
        let (scroll_dir_x, scroll_dir_y) = self
            .previous_scroll
            .map_or((0, 0), |(prev_x, prev_y)| {
                (sign(viewport.scroll_x - prev_x), sign(viewport.scroll_y - prev_y))
            });
        self.previous_scroll = Some((viewport.scroll_x, viewport.scroll_y));

        let root_ctx = &mut self.root_ctx;
        root_ctx.changed = root_ctx.changed
            || root_ctx.scroll_dir_x != scroll_dir_x
            || root_ctx.scroll_dir_y != scroll_dir_y
            || root_ctx.scroll_percent_x != sample.scroll_percent_x
            || root_ctx.scroll_percent_y != sample.scroll_percent_y;
        root_ctx.scroll_dir_x = scroll_dir_x;
        root_ctx.scroll_dir_y = scroll_dir_y;
        root_ctx.scroll_percent_x = sample.scroll_percent_x;
        root_ctx.scroll_percent_y = sample.scroll_percent_y;

        let mut child_changed = false;
        for (index, ctx) in self.elements.iter_mut().enumerate() {
            let measured = measure::measure_element(
                &self.dom,
                ctx.element,
                index,
                self.container,
                &viewport,
                self.rule,
            );
            child_changed |= ctx.record(measured);
        }

        if (child_changed || self.root_ctx.changed) && self.subscription.is_none() {
            let id = self.frames.subscribe();
            trace!("ScrollOut: frame requested ({id:?})");
            self.subscription = Some(id);
        }
    }

    /// Deliver a scroll or resize event. Runs [`update`](Self::update) when
    /// the engine listens for `kind` on `target`; returns whether it did.
    pub fn handle_event(&mut self, target: EventTarget, kind: EventKind) -> bool {
        let listens = self.listening
            && match kind {
                EventKind::Resize => target == EventTarget::Window,
                EventKind::Scroll => target == self.scroll_target(),
            };
        if listens {
            self.update();
        }
        listens
    }

    /// Advance the frame scheduler to `now`; renders if our frame arrived.
    /// Returns whether a render pass ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(id) = self.subscription else {
            return false;
        };
        if !self.frames.poll(now).contains(&id) {
            return false;
        }
        self.render();
        true
    }

    /// Render pass: apply flagged attribute/property writes, fire handlers,
    /// prune once-visible elements, then release the frame subscription.
    fn render(&mut self) -> RenderOutcome {
        let _span = info_span!("scroll_out.render").entered();
        let outcome = render::render_pass(
            &mut self.dom,
            self.root,
            &mut self.root_ctx,
            &mut self.elements,
            &self.config,
            &mut self.handlers,
        );
        self.release_frame();
        trace!("ScrollOut: {outcome:?}");
        outcome
    }

    /// Stop listening and cancel any pending frame. Idempotent.
    pub fn teardown(&mut self) {
        self.release_frame();
        if self.listening {
            self.listening = false;
            self.dom
                .remove_event_listener(EventTarget::Window, EventKind::Resize);
            let target = self.scroll_target();
            self.dom.remove_event_listener(target, EventKind::Scroll);
            debug!("ScrollOut: torn down");
        }
    }

    /// The host document.
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// The host document, for geometry and tree changes between events.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// The frame scheduler.
    pub fn frames(&self) -> &F {
        &self.frames
    }

    /// The frame scheduler, for hosts that drive it directly.
    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    fn scroll_target(&self) -> EventTarget {
        self.container.map_or(EventTarget::Window, EventTarget::Node)
    }

    fn release_frame(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.frames.unsubscribe(id);
        }
    }
}

impl<D: DomAccess, F: FrameScheduler> Drop for ScrollOut<D, F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// First element under `document` matching `selector`.
fn first_match<D: DomAccess>(
    dom: &D,
    document: NodeKey,
    selector: &str,
    option: &str,
) -> Result<NodeKey> {
    dom.query_selector_all(document, selector)
        .with_context(|| format!("invalid {option} selector '{selector}'"))?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("{option} selector '{selector}' matched no element"))
}

//! Scroll-linked visibility tracking.
//!
//! A [`ScrollOut`] engine watches a set of elements inside one scrolling
//! container and, as the container scrolls or the window resizes, keeps three
//! things current for each element:
//!
//! - a `data-scroll="in"|"out"` marker,
//! - optional CSS custom properties mirroring its geometry (`--visible-y`,
//!   `--viewport-y`, ...),
//! - user handlers fired when its visibility verdict flips.
//!
//! # Architecture
//!
//! ```text
//! scroll/resize event -> update()   read-only measurement, may run many times
//!                        |
//!                        v  (subscribe once if anything changed)
//! delivered frame     -> render()   DOM writes + handlers, then unsubscribe
//! ```
//!
//! The host supplies the document through [`dom::DomAccess`] and drives the
//! engine with [`ScrollOut::handle_event`] and [`ScrollOut::tick`].

pub mod config;
pub mod context;
mod engine;
pub mod handlers;
pub mod math;
pub mod measure;
pub mod render;
pub mod scheduler;

pub use config::{CssProps, ScrollOutConfig};
pub use context::{ContextField, ElementContext, Measurement, ScrollingElementContext};
pub use engine::ScrollOut;
pub use handlers::Handlers;
pub use scheduler::{FrameLoop, FrameScheduler, SubscriptionId};

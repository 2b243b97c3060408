//! Criterion benchmarks for the measurement and render passes.
//!
//! A synthetic page of N stacked cards is built through `DOMUpdate`s applied
//! to the in-memory `Document`, then we measure:
//! - `update()` after a scroll step (every card re-measured).
//! - `update()` plus the delivered frame's render pass.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dom::{
    DOMSubscriber as _, DOMUpdate, Document, EventKind, EventTarget, LayoutBox, NodeKey,
    ScrollMetrics,
};
use scroll_out::{CssProps, Handlers, ScrollOut, ScrollOutConfig};
use std::hint::black_box;
use std::time::Instant;

/// ROOT -> body -> N cards of 200px each, stacked vertically.
fn build_page(n: usize) -> Document {
    let mut doc = Document::new();
    let height = 200.0 * n as f64;
    doc.set_layout(NodeKey::ROOT, LayoutBox::new(0.0, 0.0, 1280.0, 720.0));
    doc.set_scroll_metrics(NodeKey::ROOT, ScrollMetrics::new(1280.0, height));
    let body = doc.create_element(NodeKey::ROOT, "body").unwrap();
    doc.set_layout(body, LayoutBox::new(0.0, 0.0, 1280.0, height));
    for i in 0..n {
        let card = doc.create_element(body, "div").unwrap();
        let _ = doc.apply_update(DOMUpdate::SetAttr {
            node: card,
            name: "data-scroll".into(),
            value: String::new(),
        });
        doc.set_layout(card, LayoutBox::new(0.0, 200.0 * i as f64, 1280.0, 180.0));
    }
    doc
}

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_out");
    for &n in &[100usize, 1_000usize, 5_000usize] {
        let config = ScrollOutConfig {
            frame_budget_ms: 0,
            ..ScrollOutConfig::default()
        };
        let mut engine = ScrollOut::new(build_page(n), config, Handlers::default()).unwrap();
        let mut top = 0.0;
        group.bench_with_input(BenchmarkId::new("update", n), &n, |b, &_n| {
            b.iter(|| {
                top = (top + 37.0) % (200.0 * n as f64);
                engine.dom_mut().scroll_to(NodeKey::ROOT, 0.0, top);
                black_box(engine.handle_event(EventTarget::Window, EventKind::Scroll));
            })
        });

        let config = ScrollOutConfig {
            frame_budget_ms: 0,
            css_props: CssProps::All,
            ..ScrollOutConfig::default()
        };
        let mut engine = ScrollOut::new(build_page(n), config, Handlers::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("update_and_render_css", n), &n, |b, &_n| {
            b.iter(|| {
                top = (top + 37.0) % (200.0 * n as f64);
                engine.dom_mut().scroll_to(NodeKey::ROOT, 0.0, top);
                engine.handle_event(EventTarget::Window, EventKind::Scroll);
                black_box(engine.tick(Instant::now()));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_passes);
criterion_main!(benches);

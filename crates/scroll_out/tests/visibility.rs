use dom::{
    DOMSubscriber, DOMUpdate, Document, EventKind, EventTarget, LayoutBox, NodeKey, ScrollMetrics,
};
use scroll_out::{ContextField, CssProps, Handlers, ScrollOut, ScrollOutConfig};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Instant;

/// A 1000x800 window over a 4000px page with a body and no cards.
fn window_page() -> (Document, NodeKey) {
    let mut doc = Document::with_journal();
    doc.set_layout(NodeKey::ROOT, LayoutBox::new(0.0, 0.0, 1000.0, 800.0));
    doc.set_scroll_metrics(NodeKey::ROOT, ScrollMetrics::new(1000.0, 4000.0));
    let body = doc.create_element(NodeKey::ROOT, "body").unwrap();
    doc.set_layout(body, LayoutBox::new(0.0, 0.0, 1000.0, 4000.0));
    (doc, body)
}

fn card(doc: &mut Document, parent: NodeKey, layout: LayoutBox) -> NodeKey {
    let node = doc.create_element(parent, "div").unwrap();
    doc.apply_update(DOMUpdate::SetAttr {
        node,
        name: "data-scroll".into(),
        value: String::new(),
    })
    .unwrap();
    doc.set_layout(node, layout);
    node
}

fn immediate() -> ScrollOutConfig {
    ScrollOutConfig {
        frame_budget_ms: 0,
        ..ScrollOutConfig::default()
    }
}

fn scroll_window(engine: &mut ScrollOut<Document>, top: f64) {
    engine.dom_mut().scroll_to(NodeKey::ROOT, 0.0, top);
    assert!(engine.handle_event(EventTarget::Window, EventKind::Scroll));
    engine.tick(Instant::now());
}

fn marker_writes(writes: &[DOMUpdate], node: NodeKey) -> Vec<&str> {
    writes
        .iter()
        .filter_map(|write| match write {
            DOMUpdate::SetAttr {
                node: target,
                name,
                value,
            } if *target == node && name == "data-scroll" => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn quarter_visible_card_passes_zero_threshold_only() {
    let _ = env_logger::builder().is_test(true).try_init();
    // Half of the width and half of the height inside the viewport.
    let layout = LayoutBox::new(500.0, 600.0, 1000.0, 400.0);

    let (mut doc, body) = window_page();
    let quarter = card(&mut doc, body, layout);
    let mut engine = ScrollOut::new(doc, immediate(), Handlers::default()).unwrap();
    assert!(engine.tick(Instant::now()));
    assert_eq!(engine.dom().attribute(quarter, "data-scroll"), Some("in"));

    let (mut doc, body) = window_page();
    let quarter = card(&mut doc, body, layout);
    let strict = ScrollOutConfig {
        threshold: 0.3,
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, strict, Handlers::default()).unwrap();
    assert!(engine.tick(Instant::now()));
    assert_eq!(engine.dom().attribute(quarter, "data-scroll"), Some("out"));
}

#[test]
fn card_past_the_right_edge_is_hidden() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    // visible_x = 0, visible_y = 1
    let aside = card(&mut doc, body, LayoutBox::new(1000.0, 0.0, 100.0, 100.0));
    let mut engine = ScrollOut::new(doc, immediate(), Handlers::default()).unwrap();
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(aside, "data-scroll"), Some("out"));
}

#[test]
fn scroll_direction_follows_successive_positions() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, _) = window_page();
    doc.scroll_to(NodeKey::ROOT, 0.0, 100.0);
    let directions = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&directions);
    let handlers =
        Handlers::default().on_scroll(move |_, ctx, _| seen.borrow_mut().push(ctx.scroll_dir_y));
    let mut engine = ScrollOut::new(doc, immediate(), handlers).unwrap();
    engine.tick(Instant::now());
    let dir_y = |engine: &ScrollOut<Document>| {
        engine
            .dom()
            .attribute(NodeKey::ROOT, "data-scroll-dir-y")
            .map(str::to_owned)
    };
    assert_eq!(dir_y(&engine).as_deref(), Some("0"));

    scroll_window(&mut engine, 100.0);
    assert_eq!(dir_y(&engine).as_deref(), Some("0"));
    scroll_window(&mut engine, 140.0);
    assert_eq!(dir_y(&engine).as_deref(), Some("1"));
    scroll_window(&mut engine, 90.0);
    assert_eq!(dir_y(&engine).as_deref(), Some("-1"));
    assert_eq!(
        engine.dom().attribute(NodeKey::ROOT, "data-scroll-dir-x"),
        Some("0")
    );

    // 100 -> 100 changed nothing, so no scroll notification was sent for it.
    assert_eq!(*directions.borrow(), vec![0, 1, -1]);
}

#[test]
fn offset_mode_gates_on_scroll_position_alone() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    // Far below the fold: geometry would say hidden.
    let far = card(&mut doc, body, LayoutBox::new(0.0, 3000.0, 1000.0, 100.0));
    let config = ScrollOutConfig {
        offset: Some(200.0),
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, config, Handlers::default()).unwrap();
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(far, "data-scroll"), Some("out"));

    scroll_window(&mut engine, 250.0);
    assert_eq!(engine.dom().attribute(far, "data-scroll"), Some("in"));
    scroll_window(&mut engine, 150.0);
    assert_eq!(engine.dom().attribute(far, "data-scroll"), Some("out"));
}

#[test]
fn zero_offset_means_ratio_mode() {
    let (mut doc, body) = window_page();
    let far = card(&mut doc, body, LayoutBox::new(0.0, 3000.0, 1000.0, 100.0));
    let config = ScrollOutConfig {
        offset: Some(0.0),
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, config, Handlers::default()).unwrap();
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(far, "data-scroll"), Some("out"));
}

#[test]
fn css_props_mirror_selected_fields() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    let half = card(&mut doc, body, LayoutBox::new(0.0, 700.0, 1000.0, 200.0));
    let fields = BTreeSet::from([
        ContextField::VisibleY,
        ContextField::IntersectY,
        ContextField::ScrollPercentY,
    ]);
    let config = ScrollOutConfig {
        css_props: CssProps::Fields(fields),
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, config, Handlers::default()).unwrap();
    engine.tick(Instant::now());

    let dom = engine.dom();
    assert_eq!(dom.style_property(half, "--visible-y"), Some("0.5"));
    assert_eq!(dom.style_property(half, "--intersect-y"), Some("1"));
    assert_eq!(dom.style_property(half, "--visible-x"), None);
    assert_eq!(dom.style_property(NodeKey::ROOT, "--scroll-percent-y"), Some("0"));
    assert_eq!(dom.style_property(NodeKey::ROOT, "--scroll-dir-y"), None);

    // 1600 / (4000 - 800)
    scroll_window(&mut engine, 1600.0);
    let dom = engine.dom();
    assert_eq!(dom.style_property(NodeKey::ROOT, "--scroll-percent-y"), Some("0.5"));
    assert_eq!(dom.style_property(half, "--visible-y"), Some("0"));
    assert_eq!(dom.style_property(half, "--intersect-y"), Some("-1"));
}

#[test]
fn all_css_props_cover_every_element_field() {
    let (mut doc, body) = window_page();
    let node = card(&mut doc, body, LayoutBox::new(0.0, 350.0, 1000.0, 100.0));
    let config = ScrollOutConfig {
        css_props: CssProps::All,
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, config, Handlers::default()).unwrap();
    engine.tick(Instant::now());

    let dom = engine.dom();
    for field in ContextField::ELEMENT {
        assert!(
            dom.style_property(node, field.css_property()).is_some(),
            "{field:?} not written"
        );
    }
    assert_eq!(dom.style_property(node, "--viewport-y"), Some("0"));
    assert_eq!(dom.style_property(node, "--visible"), Some("1"));
    assert_eq!(dom.style_property(node, "--index"), Some("0"));
}

#[test]
fn flips_between_frames_render_once_with_the_latest_verdict() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    let node = card(&mut doc, body, LayoutBox::new(0.0, 0.0, 1000.0, 100.0));
    let shown = Rc::new(RefCell::new(0_u32));
    let hidden = Rc::new(RefCell::new(0_u32));
    let shown_count = Rc::clone(&shown);
    let hidden_count = Rc::clone(&hidden);
    let handlers = Handlers::default()
        .on_shown(move |_, _, _| *shown_count.borrow_mut() += 1)
        .on_hidden(move |_, _, _| *hidden_count.borrow_mut() += 1);
    let mut engine = ScrollOut::new(doc, immediate(), handlers).unwrap();
    engine.tick(Instant::now());
    engine.dom_mut().take_writes();
    assert_eq!((*shown.borrow(), *hidden.borrow()), (1, 0));

    // in -> out -> in with no frame in between.
    for top in [2000.0, 0.0] {
        engine.dom_mut().scroll_to(NodeKey::ROOT, 0.0, top);
        engine.handle_event(EventTarget::Window, EventKind::Scroll);
    }
    assert!(engine.tick(Instant::now()));

    assert_eq!(marker_writes(engine.dom().writes(), node), vec!["in"]);
    assert_eq!((*shown.borrow(), *hidden.borrow()), (2, 0));

    // The flag was consumed: the next frame leaves the marker alone.
    engine.dom_mut().take_writes();
    engine.update();
    engine.tick(Instant::now());
    assert!(marker_writes(engine.dom().writes(), node).is_empty());
    assert_eq!((*shown.borrow(), *hidden.borrow()), (2, 0));
}

#[test]
fn plain_document_host_does_not_accumulate_writes() {
    let mut doc = Document::new();
    doc.set_layout(NodeKey::ROOT, LayoutBox::new(0.0, 0.0, 1000.0, 800.0));
    doc.set_scroll_metrics(NodeKey::ROOT, ScrollMetrics::new(1000.0, 4000.0));
    let node = card(&mut doc, NodeKey::ROOT, LayoutBox::new(0.0, 0.0, 1000.0, 100.0));
    let config = ScrollOutConfig {
        css_props: CssProps::All,
        ..immediate()
    };
    let mut engine = ScrollOut::new(doc, config, Handlers::default()).unwrap();
    for step in 0..1000 {
        scroll_window(&mut engine, f64::from(step % 2) * 50.0 + 1.0);
    }
    assert!(engine.dom().writes().is_empty());
    assert_eq!(engine.dom().style_property(node, "--index"), Some("0"));
}

#[test]
fn zero_size_card_is_hidden_and_always_remeasured() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    let empty = card(&mut doc, body, LayoutBox::new(0.0, 100.0, 0.0, 0.0));
    let mut engine = ScrollOut::new(doc, immediate(), Handlers::default()).unwrap();
    assert!(engine.tick(Instant::now()));
    assert_eq!(engine.dom().attribute(empty, "data-scroll"), Some("out"));
    engine.dom_mut().take_writes();

    // NaN ratios never compare equal, so every pass asks for a frame,
    // but the verdict stays hidden and the marker is not rewritten.
    engine.update();
    assert!(engine.tick(Instant::now()));
    assert!(engine.dom().writes().is_empty());
}

#[test]
fn detached_card_turns_hidden() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut doc, body) = window_page();
    let doomed = card(&mut doc, body, LayoutBox::new(0.0, 0.0, 1000.0, 100.0));
    let hidden = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&hidden);
    let handlers = Handlers::default().on_hidden(move |node, _, _| seen.borrow_mut().push(node));
    let mut engine = ScrollOut::new(doc, immediate(), handlers).unwrap();
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(doomed, "data-scroll"), Some("in"));

    engine
        .dom_mut()
        .apply_update(DOMUpdate::RemoveNode { node: doomed })
        .unwrap();
    engine.dom_mut().take_writes();
    engine.update();
    assert!(engine.tick(Instant::now()));
    assert_eq!(*hidden.borrow(), vec![doomed]);
    assert_eq!(marker_writes(engine.dom().writes(), doomed), vec!["out"]);
}

#[test]
fn window_scroll_falls_back_to_page_offset() {
    let (mut doc, body) = window_page();
    let lower = card(&mut doc, body, LayoutBox::new(0.0, 1500.0, 1000.0, 100.0));
    let mut engine = ScrollOut::new(doc, immediate(), Handlers::default()).unwrap();
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(lower, "data-scroll"), Some("out"));

    engine.dom_mut().set_page_offset(0.0, 1000.0);
    assert!(engine.handle_event(EventTarget::Window, EventKind::Scroll));
    engine.tick(Instant::now());
    assert_eq!(engine.dom().attribute(lower, "data-scroll"), Some("in"));
}

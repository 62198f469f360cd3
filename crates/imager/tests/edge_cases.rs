//! Edge case tests for imager
//!
//! Lazy loading, viewport boundaries and the event/timer glue.

use std::time::{Duration, Instant};

use imager::imager_dom::{DomTree, ElementGeometry, NodeId};
use imager::{
    Capabilities, HeadlessPlatform, Imager, ImagerConfig, PLACEHOLDER_PIXEL, ScrollOutcome,
    ViewportEvent, ViewportState, ViewportWatcher,
};

const VIEWPORT_HEIGHT: f64 = 800.0;

/// One placeholder per entry of `offsets`, each `offset` pixels from the
/// top of the page, in a 300px wide column
fn column(offsets: &[f64]) -> DomTree {
    let mut tree = DomTree::new();
    let body = tree.create_element("body");
    tree.append_child(tree.root(), body).unwrap();
    tree.set_geometry(body, ElementGeometry::new().with_client_size(300.0, 5000.0))
        .unwrap();

    for (i, &offset) in offsets.iter().enumerate() {
        let el = tree.create_element("div");
        tree.set_attribute(el, "class", "delayed-image-load").unwrap();
        tree.set_attribute(el, "data-src", &format!("img{i}-{{width}}.jpg")).unwrap();
        tree.set_geometry(el, ElementGeometry::new().with_offset(offset, 0.0, body))
            .unwrap();
        tree.append_child(body, el).unwrap();
    }
    tree
}

fn lazy_config() -> ImagerConfig {
    ImagerConfig::new()
        .with_widths(vec![320.0])
        .with_lazy_load(true)
}

fn resolved(tree: &DomTree, imager: &Imager) -> Vec<bool> {
    imager
        .elements()
        .iter()
        .map(|&el| !imager.is_placeholder(tree, el))
        .collect()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// VIEWPORT BOUNDARY
// ============================================================================

#[test]
fn test_on_screen_boundary_is_strict() {
    let mut tree = column(&[799.0, 800.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let imager = Imager::new(&mut tree, lazy_config(), platform.clone()).unwrap();
    let els = imager.elements().to_vec();

    assert!(imager.is_on_screen(&tree, els[0]));
    assert!(!imager.is_on_screen(&tree, els[1]));

    platform.scroll_to(1.0);
    assert!(imager.is_on_screen(&tree, els[1]));
}

#[test]
fn test_lazy_load_offset_extends_fold() {
    let mut tree = column(&[1000.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let imager = Imager::new(&mut tree, lazy_config().with_lazy_load_offset(250.0), platform)
        .unwrap();

    assert!(imager.is_on_screen(&tree, imager.elements()[0]));
}

// ============================================================================
// LAZY MODE
// ============================================================================

#[test]
fn test_lazy_scroll_check() {
    let mut tree = column(&[100.0, 1200.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let mut imager = Imager::new(&mut tree, lazy_config(), platform.clone()).unwrap();

    imager.init(&mut tree);
    assert_eq!(resolved(&tree, &imager), vec![true, false]);

    assert_eq!(imager.scroll_check(&mut tree), ScrollOutcome::Idle);

    platform.scroll_to(500.0);
    imager.mark_scrolled();
    // Resolving the last placeholder finishes straight away
    assert_eq!(imager.scroll_check(&mut tree), ScrollOutcome::Finished);
    assert_eq!(resolved(&tree, &imager), vec![true, true]);
    assert_eq!(imager.pending(&tree), 0);

    imager.mark_scrolled();
    assert_eq!(imager.scroll_check(&mut tree), ScrollOutcome::Finished);
}

#[test]
fn test_lazy_scroll_check_reports_remaining() {
    let mut tree = column(&[100.0, 1000.0, 2000.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let mut imager = Imager::new(&mut tree, lazy_config(), platform.clone()).unwrap();
    imager.init(&mut tree);

    platform.scroll_to(400.0);
    imager.mark_scrolled();
    assert_eq!(
        imager.scroll_check(&mut tree),
        ScrollOutcome::Checked {
            resolved: 1,
            remaining: 1
        }
    );

    // A scroll that brings nothing new into view still reports what is left
    imager.mark_scrolled();
    assert_eq!(
        imager.scroll_check(&mut tree),
        ScrollOutcome::Checked {
            resolved: 0,
            remaining: 1
        }
    );
}

#[test]
fn test_watcher_lazy_lifecycle() {
    let mut tree = column(&[100.0, 1000.0, 2000.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let imager = Imager::new(&mut tree, lazy_config(), platform.clone()).unwrap();
    let mut watcher = ViewportWatcher::new(imager);
    let start = Instant::now();

    // Events before the first pass do nothing
    watcher.handle_event(&mut tree, ViewportEvent::Scroll);
    watcher.handle_event(&mut tree, ViewportEvent::Resize);
    assert_eq!(resolved(&tree, watcher.imager()), vec![false, false, false]);

    watcher.start(start);
    assert!(watcher.is_polling());
    assert_eq!(watcher.tick(&mut tree, start), 1);
    assert_eq!(resolved(&tree, watcher.imager()), vec![true, false, false]);

    platform.scroll_to(400.0);
    watcher.handle_event(&mut tree, ViewportEvent::Scroll);
    // Nothing happens until the sampling interval fires
    assert_eq!(resolved(&tree, watcher.imager()), vec![true, false, false]);
    watcher.tick(&mut tree, start + ms(250));
    assert_eq!(resolved(&tree, watcher.imager()), vec![true, true, false]);

    // Nothing scrolled, polling keeps going
    watcher.tick(&mut tree, start + ms(500));
    assert!(watcher.is_polling());

    // The sample that resolves the last placeholder also stops polling
    platform.scroll_to(1500.0);
    watcher.handle_event(&mut tree, ViewportEvent::Scroll);
    watcher.tick(&mut tree, start + ms(750));
    assert_eq!(resolved(&tree, watcher.imager()), vec![true, true, true]);
    assert!(!watcher.is_polling());
    assert!(watcher.is_idle());
    assert_eq!(watcher.time_until_next(start + ms(750)), None);
}

#[test]
fn test_watcher_stops_polling_when_everything_is_on_screen() {
    let mut tree = column(&[0.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let imager = Imager::new(&mut tree, lazy_config(), platform).unwrap();
    let mut watcher = ViewportWatcher::new(imager);
    let start = Instant::now();

    watcher.start(start);
    assert!(watcher.is_polling());
    watcher.tick(&mut tree, start);

    let img = watcher.imager().elements()[0];
    assert_eq!(tree.get_attribute(img, "src"), Some("img0-320.jpg"));
    assert!(!watcher.is_polling());
    assert!(watcher.is_idle());

    // No stray ticks later on
    for step in 1..=40 {
        assert_eq!(watcher.tick(&mut tree, start + ms(step * 250)), 0);
    }
    assert!(!watcher.is_polling());
}

#[test]
fn test_lazy_resize_only_touches_visible_or_resolved() {
    let mut tree = column(&[100.0, 3000.0]);
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT));
    let config = lazy_config().with_widths(vec![320.0, 640.0]);
    let imager = Imager::new(&mut tree, config, platform.clone()).unwrap();
    let mut watcher = ViewportWatcher::new(imager);
    let start = Instant::now();
    watcher.start(start);
    watcher.tick(&mut tree, start);

    let els = watcher.imager().elements().to_vec();
    let body = tree.parent(els[0]).unwrap();
    tree.set_geometry(
        body,
        ElementGeometry::new().with_client_size(600.0, 5000.0),
    )
    .unwrap();
    watcher.handle_event(&mut tree, ViewportEvent::Resize);

    assert_eq!(tree.get_attribute(els[0], "src"), Some("img0-640.jpg"));
    assert_eq!(tree.get_attribute(els[1], "src"), Some(PLACEHOLDER_PIXEL));
}

// ============================================================================
// RESIZE AND SCHEDULING
// ============================================================================

fn eager_watcher(tree: &mut DomTree, config: ImagerConfig, capabilities: Capabilities) -> ViewportWatcher {
    let platform = HeadlessPlatform::new(ViewportState::new(1.0, VIEWPORT_HEIGHT))
        .with_capabilities(capabilities);
    ViewportWatcher::new(Imager::new(tree, config, platform).unwrap())
}

fn set_column_width(tree: &mut DomTree, el: NodeId, width: f64) {
    let body = tree.parent(el).unwrap();
    tree.set_geometry(body, ElementGeometry::new().with_client_size(width, 5000.0))
        .unwrap();
}

#[test]
fn test_resize_upgrades_resolved_image() {
    let mut tree = column(&[0.0]);
    let config = ImagerConfig::new().with_widths(vec![320.0, 640.0]);
    let mut watcher = eager_watcher(&mut tree, config, Capabilities::default());
    let start = Instant::now();
    watcher.start(start);
    watcher.tick(&mut tree, start);
    assert!(watcher.is_idle());

    let img = watcher.imager().elements()[0];
    assert_eq!(tree.get_attribute(img, "src"), Some("img0-320.jpg"));

    // The browser loaded the 320px image
    let mut geometry = *tree.geometry(img).unwrap();
    geometry.natural_width = 320.0;
    tree.set_geometry(img, geometry).unwrap();

    set_column_width(&mut tree, img, 600.0);
    watcher.handle_event(&mut tree, ViewportEvent::Resize);
    assert_eq!(tree.get_attribute(img, "src"), Some("img0-640.jpg"));

    // Shrinking again keeps the larger image
    geometry.natural_width = 640.0;
    tree.set_geometry(img, geometry).unwrap();
    set_column_width(&mut tree, img, 200.0);
    watcher.handle_event(&mut tree, ViewportEvent::Resize);
    assert_eq!(tree.get_attribute(img, "src"), Some("img0-640.jpg"));
}

#[test]
fn test_resize_ignored_when_not_watching() {
    let mut tree = column(&[0.0]);
    let config = ImagerConfig::new()
        .with_widths(vec![320.0, 640.0])
        .with_watch_resize(false);
    let mut watcher = eager_watcher(&mut tree, config, Capabilities::default());
    let start = Instant::now();
    watcher.start(start);
    watcher.tick(&mut tree, start);

    let img = watcher.imager().elements()[0];
    set_column_width(&mut tree, img, 600.0);
    watcher.handle_event(&mut tree, ViewportEvent::Resize);
    assert_eq!(tree.get_attribute(img, "src"), Some("img0-320.jpg"));
}

#[test]
fn test_initial_pass_without_animation_frames() {
    let mut tree = column(&[0.0]);
    let config = ImagerConfig::new().with_widths(vec![320.0]);
    let mut watcher = eager_watcher(
        &mut tree,
        config,
        Capabilities {
            animation_frame: false,
        },
    );
    let start = Instant::now();
    watcher.start(start);
    watcher.start(start);

    assert_eq!(watcher.time_until_next(start), Some(Duration::ZERO));
    assert_eq!(watcher.tick(&mut tree, start), 1);
    assert!(watcher.imager().is_initialized());
    assert!(watcher.is_idle());
}

#[test]
fn test_scroll_ignored_outside_lazy_mode() {
    let mut tree = column(&[0.0, 5000.0]);
    let config = ImagerConfig::new().with_widths(vec![320.0]);
    let mut watcher = eager_watcher(&mut tree, config, Capabilities::default());
    let start = Instant::now();
    watcher.start(start);
    watcher.tick(&mut tree, start);

    // Everything resolved up front, no polling
    assert_eq!(resolved(&tree, watcher.imager()), vec![true, true]);
    watcher.handle_event(&mut tree, ViewportEvent::Scroll);
    assert!(!watcher.is_polling());
}

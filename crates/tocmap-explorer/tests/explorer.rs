use kurbo::{Point, Vec2};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tocmap_core::{ApproxMeasure, Document, ExplorerConfig, NodeIndex, Viewport};
use tocmap_explorer::{Cursor, Explorer, FrameStatus, InputEvent};
use tocmap_render::RecordingSurface;

const TWO_BRANCHES: &str = include_str!("fixtures/two_branches.json");
const THREE_BRANCHES: &str = include_str!("fixtures/three_branches.json");

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn explorer(json: &str) -> Explorer {
    init();
    let doc = Document::from_json(json).unwrap();
    Explorer::new(&doc, ExplorerConfig::default(), Viewport::default(), &ApproxMeasure::default())
}

fn idx(explorer: &Explorer, id: &str) -> NodeIndex {
    explorer.tree().find_str(id).unwrap()
}

fn screen_of(explorer: &Explorer, node: NodeIndex) -> Point {
    explorer.transform().apply(explorer.tree().node(node).pos)
}

/// Tick frames every 16ms from `from` until the transition settles.
fn run_to_completion(explorer: &mut Explorer, from: u64) -> u64 {
    let mut now = from;
    loop {
        now += 16;
        match explorer.frame(ms(now)) {
            FrameStatus::Animating => continue,
            FrameStatus::Settled | FrameStatus::Idle => return now,
        }
    }
}

#[test]
fn clicking_a_branch_opens_it_and_reindexes_its_children() {
    let mut ex = explorer(TWO_BRANCHES);
    let (a, b, c) = (idx(&ex, "a"), idx(&ex, "b"), idx(&ex, "c"));
    assert!(!ex.tree().node(a).is_open());
    assert!(!ex.tree().node(b).is_open());
    assert!(ex.index().entries().iter().all(|e| e.node != c));

    let hit = ex.click(screen_of(&ex, a), false, ms(1_000));
    assert_eq!(hit, Some(a));
    assert!(ex.tree().node(a).is_open());
    assert!(ex.is_animating());

    // Mid-flight the index still reflects the settled layout.
    assert_eq!(ex.frame(ms(1_100)), FrameStatus::Animating);
    assert!(ex.index().entries().iter().all(|e| e.node != c));

    assert_eq!(ex.frame(ms(1_250)), FrameStatus::Settled);
    assert!(!ex.is_animating());

    let tree = ex.tree();
    let (a_pos, c_pos) = (tree.node(a).pos, tree.node(c).pos);
    assert_eq!(c_pos.y, a_pos.y, "a single child shares its parent's breadth coordinate");
    assert_eq!(c_pos.x, a_pos.x + 300.0);

    let entry = ex.index().entries().iter().find(|e| e.node == c).unwrap();
    assert_eq!(entry.pos, c_pos);
    assert_eq!(ex.index().len(), 4);
    assert_eq!(ex.frame(ms(1_300)), FrameStatus::Idle);
}

#[test]
fn clicking_a_leaf_changes_nothing() {
    let mut ex = explorer(r#"{"id": "root", "name": "Root", "children": [
        {"id": "a", "name": "A"},
        {"id": "b", "name": "B"}
    ]}"#);
    let a = idx(&ex, "a");
    let before: Vec<Point> = ex.tree().indices().map(|i| ex.tree().node(i).pos).collect();

    assert_eq!(ex.click(screen_of(&ex, a), false, ms(0)), Some(a));
    assert!(!ex.is_animating());
    assert_eq!(ex.frame(ms(16)), FrameStatus::Idle);

    let after: Vec<Point> = ex.tree().indices().map(|i| ex.tree().node(i).pos).collect();
    assert_eq!(before, after);
}

#[test]
fn clicking_empty_space_hits_nothing() {
    let mut ex = explorer(TWO_BRANCHES);
    assert_eq!(ex.click(Point::new(-500.0, -500.0), false, ms(0)), None);
    assert!(!ex.is_animating());
}

#[test]
fn superseding_continues_from_interpolated_positions() {
    let mut ex = explorer(THREE_BRANCHES);
    let (a, b, e) = (idx(&ex, "a"), idx(&ex, "b"), idx(&ex, "e"));
    let b_start = ex.tree().node(b).pos;

    ex.click(screen_of(&ex, a), false, ms(0));
    assert_eq!(ex.frame(ms(100)), FrameStatus::Animating);
    let b_mid = ex.tree().node(b).pos;
    assert!(b_mid.y > b_start.y, "opening a pushes b down");

    assert_eq!(ex.click(screen_of(&ex, b), false, ms(100)), Some(b));
    assert_eq!(ex.tree().node(b).pos, b_mid, "no jump when the new transition begins");

    // The new transition restarts at t = 0 from the snapshot.
    assert_eq!(ex.frame(ms(100)), FrameStatus::Animating);
    assert_eq!(ex.tree().node(b).pos, b_mid);
    assert_eq!(ex.tree().node(e).pos, b_start, "a never-shown child starts where it was parked at load");

    // The superseded 250ms deadline has passed; the new one has not.
    assert_eq!(ex.frame(ms(250)), FrameStatus::Animating);
    assert_eq!(ex.frame(ms(350)), FrameStatus::Settled);

    let fresh = {
        let mut other = explorer(THREE_BRANCHES);
        other.expand_all(false, ms(0));
        run_to_completion(&mut other, 0);
        other
    };
    for id in ["root", "a", "b", "c", "d", "e"] {
        let (i, j) = (idx(&ex, id), idx(&fresh, id));
        assert_eq!(ex.tree().node(i).pos, fresh.tree().node(j).pos, "{id}");
    }
}

#[test]
fn collapsing_draws_children_until_they_reach_their_parent() {
    let mut ex = explorer(TWO_BRANCHES);
    let (a, c) = (idx(&ex, "a"), idx(&ex, "c"));
    ex.click(screen_of(&ex, a), false, ms(0));
    let now = run_to_completion(&mut ex, 0);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    assert_eq!(ex.render(&mut surface).markers, 4);

    ex.click(screen_of(&ex, a), false, ms(now));
    assert!(!ex.tree().is_attached(c));
    surface.reset();
    assert_eq!(ex.render(&mut surface).markers, 4, "the exiting child is still drawn at t = 0");

    assert_eq!(ex.frame(ms(now + 1)), FrameStatus::Animating);
    surface.reset();
    assert_eq!(ex.render(&mut surface).markers, 4);

    run_to_completion(&mut ex, now + 1);
    surface.reset();
    assert_eq!(ex.render(&mut surface).markers, 3);
    assert_eq!(ex.index().len(), 3);
    assert_eq!(ex.tree().node(c).pos, ex.tree().node(a).pos);
}

#[test]
fn exiting_children_keep_travelling_when_superseded() {
    let mut ex = explorer(TWO_BRANCHES);
    let (a, b, c, e) = (idx(&ex, "a"), idx(&ex, "b"), idx(&ex, "c"), idx(&ex, "e"));
    ex.expand_all(false, ms(0));
    let now = run_to_completion(&mut ex, 0);

    ex.click(screen_of(&ex, a), false, ms(now));
    ex.frame(ms(now + 100));
    let c_mid = ex.tree().node(c).pos;
    assert_ne!(c_mid, ex.tree().node(a).pos);

    assert_eq!(ex.click(screen_of(&ex, b), false, ms(now + 100)), Some(b));
    assert_eq!(ex.tree().node(c).pos, c_mid, "no jump when the collapse is cut short");
    let mut surface = RecordingSurface::new(800.0, 600.0);
    assert_eq!(ex.render(&mut surface).markers, 5, "both collapsing children are drawn");

    run_to_completion(&mut ex, now + 100);
    surface.reset();
    assert_eq!(ex.render(&mut surface).markers, 3);
    assert_eq!(ex.tree().node(c).pos, ex.tree().node(a).pos);
    assert_eq!(ex.tree().node(e).pos, ex.tree().node(b).pos);
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    init();
    let doc = Document::from_json(TWO_BRANCHES).unwrap();
    let mut config = ExplorerConfig::default();
    config.view.k_min = 5.0;
    config.view.k_max = 1.0;
    let mut ex = Explorer::new(&doc, config, Viewport::default(), &ApproxMeasure::default());
    assert_eq!(ex.config(), &ExplorerConfig::default());

    ex.wheel(Point::new(400.0, 300.0), -10_000.0);
    assert_eq!(ex.transform().k, ExplorerConfig::default().view.k_max);
}

#[test]
fn alt_click_plays_the_slow_transition() {
    let mut ex = explorer(TWO_BRANCHES);
    let a = idx(&ex, "a");
    ex.click(screen_of(&ex, a), true, ms(0));
    assert_eq!(ex.frame(ms(250)), FrameStatus::Animating);
    assert_eq!(ex.frame(ms(2_499)), FrameStatus::Animating);
    assert_eq!(ex.frame(ms(2_500)), FrameStatus::Settled);
}

#[test]
fn expand_all_then_collapse_all() {
    let mut ex = explorer(THREE_BRANCHES);
    ex.expand_all(false, ms(0));
    run_to_completion(&mut ex, 0);
    assert_eq!(ex.index().len(), 6);

    ex.collapse_all(false, ms(1_000));
    run_to_completion(&mut ex, 1_000);
    assert_eq!(ex.index().len(), 3);
    assert!(ex.tree().node(ex.tree().root()).is_open());
}

#[test]
fn collapse_all_on_a_collapsed_tree_settles_immediately() {
    let mut ex = explorer(TWO_BRANCHES);
    ex.collapse_all(false, ms(0));
    assert!(!ex.is_animating());
    assert_eq!(ex.frame(ms(16)), FrameStatus::Idle);
    assert_eq!(ex.index().len(), 3);
}

#[test]
fn initial_view_is_zoomed_about_the_viewport_centre() {
    let ex = explorer(TWO_BRANCHES);
    let t = ex.transform();
    assert_eq!(t.k, 0.1);
    let center = Point::new(400.0, 300.0);
    assert!((t.apply(center) - center).hypot() < 1e-9);
}

#[test]
fn wheel_zoom_is_anchored_and_clamped() {
    let mut ex = explorer(TWO_BRANCHES);
    let anchor = Point::new(120.0, 80.0);
    let data = ex.transform().invert(anchor);

    ex.wheel(anchor, -500.0);
    let t = ex.transform();
    assert_eq!(t.k, 0.2);
    let back = t.apply(data);
    assert!((back - anchor).hypot() < 1e-9);

    for _ in 0..50 {
        ex.wheel(anchor, -10_000.0);
    }
    assert_eq!(ex.transform().k, ex.config().view.k_max);
    for _ in 0..50 {
        ex.wheel(anchor, 10_000.0);
    }
    assert_eq!(ex.transform().k, ex.config().view.k_min);
}

#[test]
fn drag_pans_in_screen_space() {
    let mut ex = explorer(TWO_BRANCHES);
    let before = ex.transform();
    ex.drag(Vec2::new(15.0, -5.0));
    let after = ex.transform();
    assert_eq!(after.k, before.k);
    assert_eq!(after.translation() - before.translation(), Vec2::new(15.0, -5.0));
}

#[test]
fn hovering_sets_the_pointer_cursor() {
    let mut ex = explorer(TWO_BRANCHES);
    let a = idx(&ex, "a");
    assert_eq!(ex.cursor(), Cursor::Default);

    assert!(ex.pointer_move(screen_of(&ex, a)));
    assert_eq!(ex.hovered(), Some(a));
    assert_eq!(ex.hovered_node().map(|n| n.name.as_str()), Some("Birds"));
    assert_eq!(ex.cursor(), Cursor::Pointer);

    // Same node again: no repaint needed.
    assert!(!ex.pointer_move(screen_of(&ex, a) + Vec2::new(0.1, 0.0)));

    assert!(ex.pointer_move(Point::new(-400.0, -400.0)));
    assert_eq!(ex.hovered(), None);
    assert_eq!(ex.cursor(), Cursor::Default);
}

#[test]
fn hover_hits_only_within_the_screen_radius() {
    let mut ex = explorer(TWO_BRANCHES);
    let a = idx(&ex, "a");
    let radius = ex.config().view.hit_radius_px;
    let p = screen_of(&ex, a);

    ex.pointer_move(p + Vec2::new(-radius + 0.5, 0.0));
    assert_eq!(ex.hovered(), Some(a));
    ex.pointer_move(p + Vec2::new(-radius - 0.5, 0.0));
    assert_eq!(ex.hovered(), None);
}

#[test]
fn input_events_dispatch_to_the_session() {
    let mut ex = explorer(TWO_BRANCHES);
    let a = idx(&ex, "a");
    let p = screen_of(&ex, a);

    assert!(ex.handle(InputEvent::pointer_move(p.x, p.y), ms(0)));
    assert!(ex.handle(InputEvent::click(p.x, p.y, false), ms(0)));
    assert!(ex.tree().node(a).is_open());
    assert!(ex.handle(InputEvent::drag(1.0, 1.0), ms(0)));
    assert!(ex.handle(InputEvent::wheel(p.x, p.y, 1.0), ms(0)));
    assert!(!ex.handle(InputEvent::click(-900.0, -900.0, false), ms(0)));
}

#[test]
fn render_draws_the_current_frame() {
    let mut ex = explorer(TWO_BRANCHES);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    let stats = ex.render(&mut surface);
    assert_eq!(stats.links, 2);
    assert_eq!(stats.markers, 3);

    let a = idx(&ex, "a");
    ex.click(screen_of(&ex, a), false, ms(0));
    ex.frame(ms(125));
    surface.reset();
    let stats = ex.render(&mut surface);
    assert_eq!(stats.links, 3, "the entering child is drawn mid-flight");
}

//! Viewport renderer: links, markers and labels onto a [`Surface`].
//!
//! Every call is a full repaint. Node and text math stays in data space; the
//! device pixel ratio only enters through the surface transform set up at
//! the start of [`render`].

use crate::theme::{Color, Theme};
use kurbo::{Affine, BezPath, Point, Rect, Size};
use serde::Serialize;
use tocmap_core::{ExplorerConfig, FontSpec, NodeIndex, TextMeasure, TreeStore, ViewTransform};

/// Marker radius in data units.
pub const MARKER_RADIUS: f64 = 3.0;
/// Gap between a node's title and its first content column.
const CONTENT_GAP: f64 = 12.0;
/// Placeholder bar height relative to the font size.
const PLACEHOLDER_LEADING: f64 = 1.2;
/// Pointer ring radius in screen pixels.
const POINTER_RING_PX: f64 = 10.0;

// ─── Surface ─────────────────────────────────────────────────────────────

/// Text anchored at its left edge, vertically centred on the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle<'a> {
    pub font: &'a FontSpec,
    pub fill: Color,
    pub halo: Color,
    pub halo_width: f64,
}

/// Immediate-mode drawing target.
///
/// Geometry passed after [`Surface::set_transform`] is interpreted through
/// that transform, like a canvas 2D context.
pub trait Surface: TextMeasure {
    /// Size in logical (CSS) pixels.
    fn size(&self) -> Size;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Fill the whole surface, ignoring the current transform.
    fn clear(&mut self, color: Color);

    fn set_transform(&mut self, affine: Affine);

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);

    fn fill_circles(&mut self, centers: &[Point], radius: f64, color: Color);

    fn stroke_circles(&mut self, centers: &[Point], radius: f64, color: Color, width: f64);

    fn fill_rects(&mut self, rects: &[Rect], color: Color);

    /// Stroke `text` with the halo, then fill it.
    fn draw_text(&mut self, text: &str, anchor: Point, style: &TextStyle<'_>);
}

// ─── Frame ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub theme: Theme,
    /// Draw a ring at the pointer position.
    pub show_pointer: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::light(),
            show_pointer: false,
        }
    }
}

/// Everything one repaint reads.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub tree: &'a TreeStore,
    pub transform: ViewTransform,
    /// Pointer position in data space.
    pub pointer: Option<Point>,
    pub hovered: Option<NodeIndex>,
    /// Detached nodes still drawn while they animate into a collapsing
    /// ancestor.
    pub exiting: &'a [NodeIndex],
    pub config: &'a ExplorerConfig,
    pub options: &'a RenderOptions,
}

/// Counters describing what a repaint drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub links: usize,
    pub markers: usize,
    /// Nodes whose title or content was drawn as glyphs.
    pub labels: usize,
    /// Nodes whose text was drawn as skeleton bars.
    pub placeholders: usize,
    /// Drawn nodes excluded from text drawing.
    pub outside: usize,
}

/// Data-space rectangle covered by a `size` surface under `transform`,
/// grown by `padding` screen pixels on every side.
pub fn visible_rect(transform: &ViewTransform, size: Size, padding: f64) -> Rect {
    let p0 = transform.invert(Point::new(-padding, -padding));
    let p1 = transform.invert(Point::new(size.width + padding, size.height + padding));
    Rect::from_points(p0, p1)
}

/// Data-space box a node's marker, title and content lines occupy.
pub fn label_box<M: TextMeasure + ?Sized>(tree: &TreeStore, idx: NodeIndex, measure: &M, font: &FontSpec) -> Rect {
    let node = tree.node(idx);
    let half = node.height() / 2.0;
    let title = if node.name.is_empty() {
        0.0
    } else {
        measure.measure(&node.name, font) + CONTENT_GAP
    };
    Rect::new(
        node.pos.x - MARKER_RADIUS,
        node.pos.y - half,
        node.pos.x + MARKER_RADIUS * 2.0 + title + node.width(),
        node.pos.y + half,
    )
}

/// Inclusive overlap test; unlike `Rect::intersect` it treats degenerate
/// (zero-width or zero-height) boxes as regular geometry.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

fn link_path(path: &mut BezPath, from: Point, to: Point) {
    let mid = (from.x + to.x) / 2.0;
    path.move_to(from);
    path.curve_to(Point::new(mid, from.y), Point::new(mid, to.y), to);
}

// ─── Render ──────────────────────────────────────────────────────────────

/// Repaint the whole surface from `frame`.
pub fn render<S: Surface + ?Sized>(surface: &mut S, frame: &Frame<'_>) -> RenderStats {
    let Frame {
        tree,
        transform,
        config,
        options,
        ..
    } = *frame;
    let theme = &options.theme;
    let k = transform.k;
    let mut stats = RenderStats::default();

    let device = Affine::scale(surface.pixel_ratio());
    surface.set_transform(device);
    surface.clear(theme.background);
    surface.set_transform(device * transform.to_affine());

    let view = visible_rect(&transform, surface.size(), config.view.cull_padding_px);
    let mut drawn = tree.attached();
    drawn.extend_from_slice(frame.exiting);

    // Links: both ends drawn. Skip curves whose hull is off-screen.
    let mut links = BezPath::new();
    for &idx in &drawn {
        let Some(parent) = tree.parent(idx) else {
            continue;
        };
        let (from, to) = (tree.node(parent).pos, tree.node(idx).pos);
        if !overlaps(Rect::from_points(from, to), view) {
            continue;
        }
        link_path(&mut links, from, to);
        stats.links += 1;
    }
    if stats.links > 0 {
        surface.stroke_path(&links, theme.link, theme.link_width);
    }

    // Culling: off-screen or sub-pixel nodes get no text.
    let outside: Vec<bool> = drawn
        .iter()
        .map(|&idx| {
            let b = label_box(tree, idx, &*surface, &config.font);
            !overlaps(b, view) || tree.node(idx).height() * k < config.view.min_node_px
        })
        .collect();
    stats.outside = outside.iter().filter(|&&o| o).count();

    // Markers: branch and leaf fills, a ring around each, then the hover highlight.
    let (mut branches, mut leaves) = (Vec::new(), Vec::new());
    for &idx in &drawn {
        let pos = tree.node(idx).pos;
        if !view.contains(pos) {
            continue;
        }
        if tree.has_children(idx) {
            branches.push(pos);
        } else {
            leaves.push(pos);
        }
    }
    stats.markers = branches.len() + leaves.len();
    surface.fill_circles(&branches, MARKER_RADIUS, theme.branch_marker);
    surface.fill_circles(&leaves, MARKER_RADIUS, theme.leaf_marker);
    branches.append(&mut leaves);
    surface.stroke_circles(&branches, MARKER_RADIUS, theme.marker_ring, 1.0);
    if let Some(hovered) = frame.hovered.filter(|&h| tree.is_attached(h)) {
        surface.fill_circles(&[tree.node(hovered).pos], MARKER_RADIUS, theme.hover_marker);
    }

    // Text.
    let font = &config.font;
    let legible = font.size * k >= font.min_legible;
    let style = TextStyle {
        font,
        fill: theme.text,
        halo: theme.halo,
        halo_width: theme.halo_width,
    };
    let mut bars = Vec::new();
    for (&idx, _) in drawn.iter().zip(&outside).filter(|(_, o)| !**o) {
        let node = tree.node(idx);
        let title_x = node.pos.x + MARKER_RADIUS * 2.0;
        let mut runs: Vec<(&str, Point)> = Vec::with_capacity(node.lines.len() + 1);
        let mut content_x = title_x;
        if !node.name.is_empty() {
            runs.push((node.name.as_str(), Point::new(title_x, node.pos.y)));
            content_x += surface.measure(&node.name, font) + CONTENT_GAP;
        }
        if node.is_open() && !node.lines.is_empty() {
            let lh = config.node.line_height;
            let top = node.pos.y - ((node.lines.len() - 1) as f64 * lh / 2.0).floor();
            for (i, line) in node.lines.iter().enumerate() {
                runs.push((line.as_str(), Point::new(content_x, top + i as f64 * lh)));
            }
        }
        if runs.is_empty() {
            continue;
        }

        if legible {
            for (text, at) in runs {
                surface.draw_text(text, at, &style);
            }
            stats.labels += 1;
        } else {
            let bar_h = font.size * PLACEHOLDER_LEADING;
            for (text, at) in runs {
                let w = surface.measure(text, font);
                bars.push(Rect::new(at.x, at.y - bar_h / 2.0, at.x + w, at.y + bar_h / 2.0));
            }
            stats.placeholders += 1;
        }
    }
    if !bars.is_empty() {
        surface.fill_rects(&bars, theme.placeholder);
    }

    if options.show_pointer
        && let Some(p) = frame.pointer
    {
        surface.stroke_circles(&[p], POINTER_RING_PX / k, theme.pointer, 1.0 / k);
    }

    log::trace!(
        "rendered {} links, {} markers, {} labels, {} placeholders ({} outside)",
        stats.links,
        stats.markers,
        stats.labels,
        stats.placeholders,
        stats.outside
    );
    stats
}

//! Text collaborators: width measurement and greedy paragraph line breaking.
//!
//! The pipeline mirrors a box/glue paragraph model:
//! `layout_items` → `break_lines` → `position_items` → `build_lines`.
//! Lines are computed once per node at load time and cached on the node.

use crate::config::FontSpec;

// ─── Measurement ─────────────────────────────────────────────────────────

/// Font-metrics oracle: advance width of `text` set in `font`.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64;
}

/// Metric-free fallback: every char advances `em_ratio * size`.
///
/// Used for native builds and tests where no font backend exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxMeasure {
    pub em_ratio: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { em_ratio: 0.55 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * self.em_ratio
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        (**self).measure(text, font)
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

/// One unit of a paragraph: a word (box) or the stretchable space after it (glue).
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Box { text: String, width: f64 },
    Glue { width: f64 },
}

impl Item {
    pub fn width(&self) -> f64 {
        match self {
            Item::Box { width, .. } | Item::Glue { width } => *width,
        }
    }
}

/// A box item placed on a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedItem {
    /// Index into the item list.
    pub item: usize,
    pub line: usize,
    pub x_offset: f64,
}

/// Remove `<p>` / `</p>` wrappers that the document source leaves in content.
pub fn strip_paragraph_tags(text: &str) -> String {
    text.replace("<p>", " ").replace("</p>", " ").trim().to_string()
}

/// Split text on whitespace into measured boxes separated by glue.
pub fn layout_items(text: &str, measure: &dyn TextMeasure, font: &FontSpec) -> Vec<Item> {
    let space = measure.measure(" ", font);
    let mut items = Vec::new();
    for word in text.split_whitespace() {
        if !items.is_empty() {
            items.push(Item::Glue { width: space });
        }
        items.push(Item::Box {
            text: word.to_string(),
            width: measure.measure(word, font),
        });
    }
    items
}

/// Greedy first-fit line breaking.
///
/// Returns the index of the first box of every line, in order. A box wider
/// than `max_width` gets a line of its own rather than being split.
pub fn break_lines(items: &[Item], max_width: f64) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut line_width = 0.0;
    let mut pending_glue = 0.0;
    let mut line_open = false;

    for (i, item) in items.iter().enumerate() {
        match item {
            Item::Glue { width } => {
                if line_open {
                    pending_glue += width;
                }
            }
            Item::Box { width, .. } => {
                if !line_open || line_width + pending_glue + width > max_width {
                    breaks.push(i);
                    line_width = *width;
                    line_open = true;
                } else {
                    line_width += pending_glue + width;
                }
                pending_glue = 0.0;
            }
        }
    }
    breaks
}

/// Assign each box its line and horizontal offset given `breakpoints`.
pub fn position_items(items: &[Item], max_width: f64, breakpoints: &[usize]) -> Vec<PositionedItem> {
    let mut out = Vec::new();
    let Some(&first) = breakpoints.first() else {
        return out;
    };

    let mut line = 0;
    let mut x = 0.0;
    for (i, item) in items.iter().enumerate().skip(first) {
        if breakpoints.get(line + 1) == Some(&i) {
            line += 1;
            x = 0.0;
        }
        match item {
            Item::Glue { width } => {
                if x > 0.0 {
                    x += width;
                }
            }
            Item::Box { width, .. } => {
                out.push(PositionedItem {
                    item: i,
                    line,
                    x_offset: x.min(max_width),
                });
                x += width;
            }
        }
    }
    out
}

/// Collect positioned boxes into one string per line, words joined by a space.
pub fn build_lines(items: &[Item], positioned: &[PositionedItem]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for p in positioned {
        let Item::Box { text, .. } = &items[p.item] else {
            continue;
        };
        if lines.len() <= p.line {
            lines.resize_with(p.line + 1, String::new);
        }
        let line = &mut lines[p.line];
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(text);
    }
    lines
}

/// Full pipeline: normalize, itemize, break, position, and join.
pub fn wrap_text(text: &str, max_width: f64, measure: &dyn TextMeasure, font: &FontSpec) -> Vec<String> {
    let text = strip_paragraph_tags(text);
    let items = layout_items(&text, measure, font);
    let breakpoints = break_lines(&items, max_width);
    let positioned = position_items(&items, max_width, &breakpoints);
    build_lines(&items, &positioned)
}

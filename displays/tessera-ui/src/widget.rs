//! Widget tree
//!
//! Widgets live in a fixed-capacity arena indexed by [`WidgetId`]. A parent
//! is always created before its children, so a forward pass over the arena
//! visits parents first and a backward pass visits children first. Layout
//! relies on both orders.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor, Size};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;
use heapless::{String, Vec};

use crate::area::Area;
use crate::invalid::InvalidAreas;
use crate::style::Theme;
use crate::UiError;

/// Maximum number of widgets, including the screen
pub const MAX_WIDGETS: usize = 16;

/// Maximum label text length in bytes
pub const MAX_TEXT_LEN: usize = 48;

/// Handle to a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WidgetId(u8);

impl WidgetId {
    /// The screen root
    pub const SCREEN: WidgetId = WidgetId(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Placement of a widget relative to its parent's content box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    #[default]
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    Center,
    RightMid,
    BottomLeft,
    BottomMid,
    BottomRight,
}

impl Align {
    /// Position of a `size` box inside `parent`, shifted by `offset`
    pub fn place(self, parent: &Area, size: Size, offset: Point) -> Point {
        let free_w = parent.width() as i32 - size.width as i32;
        let free_h = parent.height() as i32 - size.height as i32;

        let x = match self {
            Align::TopLeft | Align::LeftMid | Align::BottomLeft => 0,
            Align::TopMid | Align::Center | Align::BottomMid => free_w / 2,
            Align::TopRight | Align::RightMid | Align::BottomRight => free_w,
        };
        let y = match self {
            Align::TopLeft | Align::TopMid | Align::TopRight => 0,
            Align::LeftMid | Align::Center | Align::RightMid => free_h / 2,
            Align::BottomLeft | Align::BottomMid | Align::BottomRight => free_h,
        };

        Point::new(parent.x1 + x + offset.x, parent.y1 + y + offset.y)
    }
}

/// Widget type and type-specific state
#[derive(Debug, Clone)]
pub enum WidgetKind {
    /// Root of the widget tree, covers the whole display
    Screen,
    /// Single line of text
    Label { text: String<MAX_TEXT_LEN> },
    /// Clickable box sized to its children
    Button { pressed: bool },
}

/// A node in the widget tree
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) kind: WidgetKind,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) align: Align,
    pub(crate) offset: Point,
    /// Absolute area from the last layout pass
    pub(crate) area: Area,
}

impl Widget {
    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Absolute screen area from the last layout pass
    pub fn area(&self) -> Area {
        self.area
    }

    /// Whether pointer presses target this widget
    pub fn is_clickable(&self) -> bool {
        matches!(self.kind, WidgetKind::Button { .. })
    }
}

/// Arena of widgets plus the areas waiting to be redrawn
pub struct WidgetTree {
    nodes: Vec<Widget, MAX_WIDGETS>,
    theme: Theme,
    layout_dirty: bool,
    invalid: InvalidAreas,
}

impl WidgetTree {
    pub(crate) fn new(theme: Theme) -> Self {
        let mut nodes = Vec::new();
        // Capacity is non-zero, the screen always fits
        let _ = nodes.push(Widget {
            kind: WidgetKind::Screen,
            parent: None,
            align: Align::TopLeft,
            offset: Point::zero(),
            area: Area::from_origin(0, 0, 0, 0),
        });
        Self {
            nodes,
            theme,
            layout_dirty: true,
            invalid: InvalidAreas::new(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Look up a widget
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.nodes.get(id.index())
    }

    /// Iterate widgets in creation order (parents before children)
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (WidgetId, &Widget)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, w)| (WidgetId(i as u8), w))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a widget under `parent`
    pub(crate) fn create(&mut self, parent: WidgetId, kind: WidgetKind) -> Result<WidgetId, UiError> {
        if self.get(parent).is_none() {
            return Err(UiError::InvalidWidget);
        }
        let id = WidgetId(self.nodes.len() as u8);
        self.nodes
            .push(Widget {
                kind,
                parent: Some(parent),
                align: Align::TopLeft,
                offset: Point::zero(),
                area: Area::from_origin(0, 0, 0, 0),
            })
            .map_err(|_| UiError::TooManyWidgets)?;
        self.layout_dirty = true;
        Ok(id)
    }

    /// Set the text of a label
    ///
    /// Text longer than [`MAX_TEXT_LEN`] is truncated at a character
    /// boundary. Setting the current text again is a no-op.
    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), UiError> {
        let node = self.nodes.get_mut(id.index()).ok_or(UiError::InvalidWidget)?;
        let WidgetKind::Label { text: current } = &mut node.kind else {
            return Err(UiError::NotALabel);
        };

        let text = truncate(text, MAX_TEXT_LEN);
        if current.as_str() == text {
            return Ok(());
        }

        current.clear();
        // Fits after truncation
        let _ = current.push_str(text);
        self.invalid.push(node.area);
        self.layout_dirty = true;
        Ok(())
    }

    /// Current text of a label
    pub fn text(&self, id: WidgetId) -> Option<&str> {
        match &self.get(id)?.kind {
            WidgetKind::Label { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Align a widget inside its parent with an offset
    pub fn align(&mut self, id: WidgetId, align: Align, x_ofs: i32, y_ofs: i32) -> Result<(), UiError> {
        let node = self.nodes.get_mut(id.index()).ok_or(UiError::InvalidWidget)?;
        node.align = align;
        node.offset = Point::new(x_ofs, y_ofs);
        self.layout_dirty = true;
        Ok(())
    }

    /// Mark a button pressed or released, invalidating it on change
    pub(crate) fn set_pressed(&mut self, id: WidgetId, value: bool) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            if let WidgetKind::Button { pressed } = &mut node.kind {
                if *pressed != value {
                    *pressed = value;
                    self.invalid.push(node.area);
                }
            }
        }
    }

    /// Topmost clickable widget under `point`
    pub fn hit_test(&self, point: Point) -> Option<WidgetId> {
        self.iter()
            .rev()
            .find(|(_, w)| w.is_clickable() && w.area.contains(point))
            .map(|(id, _)| id)
    }

    /// Resize the screen root and redraw everything
    pub(crate) fn set_resolution(&mut self, width: u16, height: u16) {
        let screen = Area::from_origin(0, 0, width as u32, height as u32);
        self.nodes[0].area = screen;
        self.invalid.set_screen(screen);
        self.invalid.push(screen);
        self.layout_dirty = true;
    }

    pub(crate) fn invalidate(&mut self, area: Area) {
        self.invalid.push(area);
    }

    pub(crate) fn invalid_mut(&mut self) -> &mut InvalidAreas {
        &mut self.invalid
    }

    /// Recompute widget areas if anything changed since the last pass
    ///
    /// Widgets whose area moved are invalidated at both positions.
    pub(crate) fn layout(&mut self) {
        if !self.layout_dirty {
            return;
        }
        self.layout_dirty = false;

        let mut sizes: [Size; MAX_WIDGETS] = [Size::zero(); MAX_WIDGETS];

        // Children first: a button is as large as its content plus padding
        for i in (0..self.nodes.len()).rev() {
            let size = match &self.nodes[i].kind {
                WidgetKind::Screen => self.nodes[0].area.to_rectangle().size,
                WidgetKind::Label { text } => measure(&self.theme, text.as_str()),
                WidgetKind::Button { .. } => {
                    let content = self
                        .nodes
                        .iter()
                        .enumerate()
                        .filter(|(_, w)| w.parent == Some(WidgetId(i as u8)))
                        .fold(Size::zero(), |acc, (c, _)| {
                            Size::new(acc.width.max(sizes[c].width), acc.height.max(sizes[c].height))
                        });
                    Size::new(
                        content.width + 2 * self.theme.pad_hor,
                        content.height + 2 * self.theme.pad_ver,
                    )
                }
            };
            sizes[i] = size;
        }

        // Parents first: place each widget inside its parent's content box
        for i in 1..self.nodes.len() {
            let Some(parent) = self.nodes[i].parent else {
                continue;
            };
            let parent_node = &self.nodes[parent.index()];
            let content = match parent_node.kind {
                WidgetKind::Button { .. } => Area {
                    x1: parent_node.area.x1 + self.theme.pad_hor as i32,
                    y1: parent_node.area.y1 + self.theme.pad_ver as i32,
                    x2: parent_node.area.x2 - self.theme.pad_hor as i32,
                    y2: parent_node.area.y2 - self.theme.pad_ver as i32,
                },
                _ => parent_node.area,
            };

            let node = &self.nodes[i];
            let origin = node.align.place(&content, sizes[i], node.offset);
            let area = Area::from_origin(origin.x, origin.y, sizes[i].width, sizes[i].height);

            if area != self.nodes[i].area {
                let old = self.nodes[i].area;
                if !old.is_empty() {
                    self.invalid.push(old);
                }
                self.invalid.push(area);
                self.nodes[i].area = area;
            }
        }
    }
}

/// Size of a single line of text in the theme font
pub(crate) fn measure(theme: &Theme, text: &str) -> Size {
    let style = MonoTextStyle::new(theme.font, Rgb565::BLACK);
    style
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> WidgetTree {
        let mut tree = WidgetTree::new(Theme::default());
        tree.set_resolution(800, 480);
        tree
    }

    #[test]
    fn test_label_measures_text() {
        let mut tree = tree();
        let label = tree
            .create(WidgetId::SCREEN, WidgetKind::Label { text: String::new() })
            .unwrap();
        tree.set_text(label, "Hello").unwrap();
        tree.layout();

        // FONT_10X20: 10 px per glyph, 20 px tall
        let area = tree.get(label).unwrap().area();
        assert_eq!(area.width(), 50);
        assert_eq!(area.height(), 20);
        assert_eq!(area.top_left(), Point::new(0, 0));
    }

    #[test]
    fn test_align_top_mid_with_offset() {
        let mut tree = tree();
        let label = tree
            .create(WidgetId::SCREEN, WidgetKind::Label { text: String::new() })
            .unwrap();
        tree.set_text(label, "0123456789").unwrap();
        tree.align(label, Align::TopMid, 0, 20).unwrap();
        tree.layout();

        let area = tree.get(label).unwrap().area();
        assert_eq!(area, Area::new(350, 20, 449, 39));
    }

    #[test]
    fn test_button_wraps_child_and_centers() {
        let mut tree = tree();
        let button = tree
            .create(WidgetId::SCREEN, WidgetKind::Button { pressed: false })
            .unwrap();
        tree.align(button, Align::Center, 0, 0).unwrap();
        let label = tree
            .create(button, WidgetKind::Label { text: String::new() })
            .unwrap();
        tree.set_text(label, "Click Me").unwrap();
        tree.layout();

        let theme = Theme::default();
        let b = tree.get(button).unwrap().area();
        assert_eq!(b.width(), 80 + 2 * theme.pad_hor);
        assert_eq!(b.height(), 20 + 2 * theme.pad_ver);

        // Centered on the 800x480 screen
        assert_eq!(b.x1 + b.x2, 799);
        assert_eq!(b.y1 + b.y2, 479);

        let l = tree.get(label).unwrap().area();
        assert!(b.covers(&l));
        assert_eq!(l.x1, b.x1 + theme.pad_hor as i32);
    }

    #[test]
    fn test_hit_test_only_clickable() {
        let mut tree = tree();
        let button = tree
            .create(WidgetId::SCREEN, WidgetKind::Button { pressed: false })
            .unwrap();
        tree.align(button, Align::Center, 0, 0).unwrap();
        let label = tree
            .create(button, WidgetKind::Label { text: String::new() })
            .unwrap();
        tree.set_text(label, "OK").unwrap();
        tree.layout();

        let center = Point::new(400, 240);
        assert_eq!(tree.hit_test(center), Some(button));
        assert_eq!(tree.hit_test(Point::new(5, 5)), None);
    }

    #[test]
    fn test_set_text_rejects_non_label() {
        let mut tree = tree();
        let button = tree
            .create(WidgetId::SCREEN, WidgetKind::Button { pressed: false })
            .unwrap();
        assert_eq!(tree.set_text(button, "x"), Err(UiError::NotALabel));
        assert_eq!(
            tree.set_text(WidgetId(9), "x"),
            Err(UiError::InvalidWidget)
        );
    }

    #[test]
    fn test_text_truncated_on_char_boundary() {
        let mut tree = tree();
        let label = tree
            .create(WidgetId::SCREEN, WidgetKind::Label { text: String::new() })
            .unwrap();
        let long = "é".repeat(40); // 80 bytes
        tree.set_text(label, &long).unwrap();
        let text = tree.text(label).unwrap();
        assert!(text.len() <= MAX_TEXT_LEN);
        assert_eq!(text.chars().count(), MAX_TEXT_LEN / 2);
    }

    #[test]
    fn test_capacity_limit() {
        let mut tree = tree();
        for _ in 1..MAX_WIDGETS {
            tree.create(WidgetId::SCREEN, WidgetKind::Button { pressed: false })
                .unwrap();
        }
        assert_eq!(
            tree.create(WidgetId::SCREEN, WidgetKind::Button { pressed: false }),
            Err(UiError::TooManyWidgets)
        );
    }
}

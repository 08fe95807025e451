//! Minimal 2D drawing capability and a recording surface.
//!
//! The layout code only talks to [`Canvas`], so it runs headlessly in tests
//! and against any real backend (egui's painter in the desktop app).

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn expand(&self, by: f32) -> Self {
        Self::new(
            self.x - by,
            self.y - by,
            self.width + by * 2.0,
            self.height + by * 2.0,
        )
    }

    pub fn with_width(&self, width: f32) -> Self {
        Self { width, ..*self }
    }
}

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same hue at `alpha` (0.0..=1.0).
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Text is always vertically centered on its anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgba,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            bold: false,
            color,
            align: TextAlign::Left,
        }
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Measures rendered text width in pixels.
pub trait TextMeasure: Send + Sync {
    fn text_width(&self, text: &str, size: f32, bold: bool) -> f32;
}

/// Every glyph is `ratio * size` wide. Used headlessly.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub ratio: f32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn text_width(&self, text: &str, size: f32, _bold: bool) -> f32 {
        text.chars().count() as f32 * size * self.ratio
    }
}

/// The drawing operations the timeline needs.
pub trait Canvas {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Vertical gradient from `top` to `bottom`.
    fn fill_gradient(&mut self, rect: Rect, top: Rgba, bottom: Rgba);
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: Rgba);
    fn line(&mut self, from: Point, to: Point, width: f32, color: Rgba);
    fn text(&mut self, pos: Point, text: &str, style: TextStyle);
    fn measure_text(&self, text: &str, size: f32, bold: bool) -> f32;
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    FillGradient {
        rect: Rect,
        top: Rgba,
        bottom: Rgba,
    },
    StrokeRoundedRect {
        rect: Rect,
        radius: f32,
        width: f32,
        color: Rgba,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgba,
    },
    Text {
        pos: Point,
        text: String,
        style: TextStyle,
    },
}

impl DrawCmd {
    pub fn replay(&self, target: &mut dyn Canvas) {
        match self {
            DrawCmd::FillRect { rect, color } => target.fill_rect(*rect, *color),
            DrawCmd::FillGradient { rect, top, bottom } => {
                target.fill_gradient(*rect, *top, *bottom)
            }
            DrawCmd::StrokeRoundedRect {
                rect,
                radius,
                width,
                color,
            } => target.stroke_rounded_rect(*rect, *radius, *width, *color),
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => target.line(*from, *to, *width, *color),
            DrawCmd::Text { pos, text, style } => target.text(*pos, text, *style),
        }
    }
}

/// An off-screen drawing surface backed by a display list.
#[derive(Clone)]
pub struct Surface {
    width: f32,
    height: f32,
    commands: Vec<DrawCmd>,
    measure: Arc<dyn TextMeasure>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("commands", &self.commands.len())
            .finish()
    }
}

impl Surface {
    pub fn new(width: f32, height: f32, measure: Arc<dyn TextMeasure>) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            measure,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resizing drops the contents.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Draw every recorded command onto `target`.
    pub fn blit(&self, target: &mut dyn Canvas) {
        for cmd in &self.commands {
            cmd.replay(target);
        }
    }

    /// Texts drawn on this surface, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for Surface {
    fn clear(&mut self) {
        self.commands.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCmd::FillRect { rect, color });
    }

    fn fill_gradient(&mut self, rect: Rect, top: Rgba, bottom: Rgba) {
        self.commands.push(DrawCmd::FillGradient { rect, top, bottom });
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::StrokeRoundedRect {
            rect,
            radius,
            width,
            color,
        });
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        self.commands.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn text(&mut self, pos: Point, text: &str, style: TextStyle) {
        self.commands.push(DrawCmd::Text {
            pos,
            text: text.to_string(),
            style,
        });
    }

    fn measure_text(&self, text: &str, size: f32, bold: bool) -> f32 {
        self.measure.text_width(text, size, bold)
    }
}

/// Shorten `text` with a trailing `...` until it fits in `max_width`.
///
/// Returns the text untouched when it already fits, and an empty string when
/// not even `...` fits.
pub fn truncate_to_width(
    canvas: &dyn Canvas,
    text: &str,
    max_width: f32,
    size: f32,
) -> String {
    if canvas.measure_text(text, size, false) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() {
        let candidate: String = chars.iter().chain(['.', '.', '.'].iter()).collect();
        if canvas.measure_text(&candidate, size, false) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(100.0, 100.0, Arc::new(FixedWidthMeasure { ratio: 1.0 }))
    }

    #[test]
    fn resize_is_destructive() {
        let mut s = surface();
        s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba::rgb(1, 2, 3));
        assert!(!s.is_empty());
        s.resize(200.0, 50.0);
        assert!(s.is_empty());
        assert_eq!(s.width(), 200.0);
    }

    #[test]
    fn blit_copies_commands_in_order() {
        let mut src = surface();
        src.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba::rgb(1, 1, 1));
        src.text(Point::new(0.0, 0.0), "hi", TextStyle::new(10.0, Rgba::rgb(0, 0, 0)));
        let mut dst = surface();
        src.blit(&mut dst);
        assert_eq!(dst.commands(), src.commands());
    }

    #[test]
    fn truncation_fits_width() {
        let s = surface();
        // One pixel per glyph at size 1.0.
        assert_eq!(truncate_to_width(&s, "short", 10.0, 1.0), "short");
        assert_eq!(truncate_to_width(&s, "a long task name", 10.0, 1.0), "a long ...");
        assert_eq!(truncate_to_width(&s, "abcdef", 3.0, 1.0), "...");
        assert_eq!(truncate_to_width(&s, "abcdef", 2.0, 1.0), "");
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(Point::new(10.0, 15.0)));
        assert!(!r.contains(Point::new(15.1, 12.0)));
    }
}

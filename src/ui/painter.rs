//! [`Canvas`] over an egui [`Painter`].

use egui::epaint::{Mesh, Shape};
use egui::{Align2, Color32, Context, FontId, Painter, Pos2, Rounding, Stroke, Vec2};

use crate::render::canvas::{Canvas, Point, Rect, Rgba, TextAlign, TextMeasure, TextStyle};
use crate::ui::theme;

/// Measures text with egui's font atlas.
#[derive(Clone)]
pub struct EguiTextMeasure {
    ctx: Context,
}

impl EguiTextMeasure {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for EguiTextMeasure {
    fn text_width(&self, text: &str, size: f32, _bold: bool) -> f32 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), FontId::proportional(size), Color32::BLACK)
                .size()
                .x
        })
    }
}

/// Paints canvas commands at `origin` in screen space.
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    origin: Pos2,
    measure: EguiTextMeasure,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self {
            painter,
            origin,
            measure: EguiTextMeasure::new(painter.ctx().clone()),
        }
    }

    fn pos(&self, p: Point) -> Pos2 {
        self.origin + Vec2::new(p.x, p.y)
    }

    fn rect(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_size(self.pos(Point::new(r.x, r.y)), Vec2::new(r.width, r.height))
    }
}

impl Canvas for EguiCanvas<'_> {
    // A fresh frame starts blank.
    fn clear(&mut self) {}

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.painter
            .rect_filled(self.rect(rect), 0.0, theme::color(color));
    }

    fn fill_gradient(&mut self, rect: Rect, top: Rgba, bottom: Rgba) {
        let r = self.rect(rect);
        let (top, bottom) = (theme::color(top), theme::color(bottom));
        let mut mesh = Mesh::default();
        mesh.colored_vertex(r.left_top(), top);
        mesh.colored_vertex(r.right_top(), top);
        mesh.colored_vertex(r.right_bottom(), bottom);
        mesh.colored_vertex(r.left_bottom(), bottom);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(Shape::mesh(mesh));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, width: f32, color: Rgba) {
        self.painter.rect_stroke(
            self.rect(rect),
            Rounding::same(radius),
            Stroke::new(width, theme::color(color)),
        );
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        self.painter.line_segment(
            [self.pos(from), self.pos(to)],
            Stroke::new(width, theme::color(color)),
        );
    }

    fn text(&mut self, pos: Point, text: &str, style: TextStyle) {
        let anchor = match style.align {
            TextAlign::Left => Align2::LEFT_CENTER,
            TextAlign::Center => Align2::CENTER_CENTER,
            TextAlign::Right => Align2::RIGHT_CENTER,
        };
        self.painter.text(
            self.pos(pos),
            anchor,
            text,
            FontId::proportional(style.size),
            theme::color(style.color),
        );
    }

    fn measure_text(&self, text: &str, size: f32, bold: bool) -> f32 {
        self.measure.text_width(text, size, bold)
    }
}

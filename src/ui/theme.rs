use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::binding::NotificationKind;
use crate::render::canvas::Rgba;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_APP: Color32 = Color32::from_rgb(245, 247, 250);
pub const BG_PANEL: Color32 = Color32::from_rgb(255, 255, 255);
pub const BG_ROW_ALT: Color32 = Color32::from_rgb(248, 250, 252);
pub const BG_SELECTED: Color32 = Color32::from_rgb(214, 234, 248);
pub const BG_FIELD: Color32 = Color32::from_rgb(250, 251, 253);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(221, 225, 230);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(51, 51, 51);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(102, 102, 102);
pub const TEXT_DIM: Color32 = Color32::from_rgb(150, 155, 165);

pub const ACCENT: Color32 = Color32::from_rgb(52, 152, 219);
pub const DANGER: Color32 = Color32::from_rgb(231, 76, 60);
pub const SUCCESS: Color32 = Color32::from_rgb(39, 174, 96);
pub const WARNING: Color32 = Color32::from_rgb(243, 156, 18);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const TOOLBAR_HEIGHT: f32 = 40.0;
pub const SIDE_PANEL_WIDTH: f32 = 280.0;
pub const DIALOG_WIDTH: f32 = 340.0;
pub const TOAST_WIDTH: f32 = 300.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_label() -> FontId {
    FontId::proportional(14.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(10.5)
}

pub fn color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

pub fn toast_fill(kind: NotificationKind) -> Color32 {
    match kind {
        NotificationKind::Success => SUCCESS,
        NotificationKind::Error => DANGER,
        NotificationKind::Info => ACCENT,
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::light();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_APP;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD;

    let rounding = Rounding::same(4.0);
    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.rounding = rounding;
        widget.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    }
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

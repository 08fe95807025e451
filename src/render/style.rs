use crate::render::canvas::Rgba;

// ── Chart palette ────────────────────────────────────────────────────────────

pub const HEADER_TOP: Rgba = Rgba::rgb(232, 244, 248);
pub const HEADER_BOTTOM: Rgba = Rgba::rgb(220, 236, 242);
pub const BODY_BG: Rgba = Rgba::rgb(240, 248, 255);
pub const TEXT: Rgba = Rgba::rgb(51, 51, 51);
pub const TEXT_MUTED: Rgba = Rgba::rgb(102, 102, 102);
pub const SEPARATOR: Rgba = Rgba::rgb(221, 221, 221);
pub const GRID_LINE: Rgba = Rgba::new(221, 221, 221, 128);
pub const WEEKEND_HEADER: Rgba = Rgba::new(255, 200, 200, 77);
pub const WEEKEND_BODY: Rgba = Rgba::new(255, 200, 200, 31);
pub const SELECTION: Rgba = Rgba::rgb(52, 152, 219);

pub const BAR_ALPHA: f32 = 0.25;
pub const PROGRESS_ALPHA: f32 = 0.7;

// ── Sizes ────────────────────────────────────────────────────────────────────

/// Vertical gap between a bar and the next row.
pub const BAR_GAP: f32 = 5.0;
pub const SELECTION_RADIUS: f32 = 6.0;
pub const SELECTION_WIDTH: f32 = 3.0;
pub const SELECTION_OUTSET: f32 = 2.0;
pub const LABEL_INSET: f32 = 5.0;
pub const BAR_FONT_SIZE: f32 = 12.0;

/// Columns at least this wide show weekday names.
pub const DAY_NAME_MIN_WIDTH: f32 = 60.0;
/// Columns at least this wide show month boundaries.
pub const MONTH_LABEL_MIN_WIDTH: f32 = 80.0;
/// Columns at least this wide show the full date.
pub const FULL_DATE_MIN_WIDTH: f32 = 100.0;

// ── Task color palette ───────────────────────────────────────────────────────

pub const TASK_COLORS: &[Rgba] = &[
    Rgba::rgb(142, 68, 173),  // Purple
    Rgba::rgb(22, 160, 133),  // Green sea
    Rgba::rgb(211, 84, 0),    // Pumpkin
    Rgba::rgb(39, 174, 96),   // Nephritis
    Rgba::rgb(192, 57, 43),   // Pomegranate
    Rgba::rgb(41, 128, 185),  // Belize blue
    Rgba::rgb(241, 196, 15),  // Sunflower
    Rgba::rgb(127, 140, 141), // Asbestos
];

/// Color for the bar drawn in visible row `row`.
pub fn task_color(row: usize) -> Rgba {
    TASK_COLORS[row % TASK_COLORS.len()]
}

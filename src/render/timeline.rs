//! Maps the active date window and task list onto pixels.
//!
//! Layout is computed once per pass into a [`TimelineGeometry`]; drawing and
//! hit-testing both read bar rectangles from it, so a click always lands on
//! exactly what was drawn.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::model::{DateRange, Task, TaskList, ViewState};
use crate::render::canvas::{truncate_to_width, Canvas, Point, Rect, TextAlign, TextStyle};
use crate::render::layers::{LayerCompositor, LayerKind, LayerStamp};
use crate::render::style;

/// Pixel layout of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineGeometry {
    pub window: DateRange,
    pub total_days: i64,
    pub col_width: f32,
    pub row_height: f32,
    pub padding: f32,
    pub font_size: f32,
    /// Canvas size.
    pub width: f32,
    pub height: f32,
}

impl TimelineGeometry {
    pub fn compute(view: &ViewState, container_width: f32, visible_rows: usize) -> Self {
        let window = view.window();
        let total_days = window.days();
        let metrics = view.metrics;
        let available = container_width - 2.0 * metrics.padding;
        let col_width = (available / total_days as f32).max(metrics.min_col_width);
        let width = 2.0 * metrics.padding + total_days as f32 * col_width;
        let height = (2.0 * metrics.padding + visible_rows as f32 * metrics.row_height)
            .max(metrics.min_height);
        Self {
            window,
            total_days,
            col_width,
            row_height: metrics.row_height,
            padding: metrics.padding,
            font_size: metrics.font_size,
            width,
            height,
        }
    }

    /// Left edge of day column `day`.
    pub fn column_x(&self, day: i64) -> f32 {
        self.padding + day as f32 * self.col_width
    }

    pub fn row_y(&self, row: usize) -> f32 {
        self.padding + row as f32 * self.row_height
    }

    /// The bar of `task` drawn in visible row `row`, clipped to the window.
    pub fn bar_rect(&self, row: usize, task: &Task) -> Rect {
        let start_day = self.window.offset_of(task.start).max(0);
        let end_day = self.window.offset_of(task.end).min(self.total_days - 1);
        Rect::new(
            self.column_x(start_day),
            self.row_y(row),
            (end_day - start_day + 1) as f32 * self.col_width,
            self.row_height - style::BAR_GAP,
        )
    }

    fn header_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.padding)
    }

    fn body_rect(&self) -> Rect {
        Rect::new(0.0, self.padding, self.width, self.height - self.padding)
    }
}

/// Draws the timeline into a [`LayerCompositor`] and answers hit tests.
#[derive(Debug, Clone)]
pub struct TimelineRenderer {
    container_width: f32,
    geometry: Option<TimelineGeometry>,
}

impl TimelineRenderer {
    pub fn new(container_width: f32) -> Self {
        Self {
            container_width,
            geometry: None,
        }
    }

    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = width;
    }

    /// Geometry of the last layout, if any.
    pub fn geometry(&self) -> Option<&TimelineGeometry> {
        self.geometry.as_ref()
    }

    /// Recompute geometry for the current state without drawing.
    pub fn layout(&mut self, view: &ViewState, tasks: &TaskList) -> &TimelineGeometry {
        let rows = tasks.visible_in(&view.window()).len();
        self.geometry
            .insert(TimelineGeometry::compute(view, self.container_width, rows))
    }

    /// Redraw whatever changed since the last pass and composite it.
    ///
    /// A full redraw repaints every layer; otherwise only layers whose inputs
    /// moved on are repainted. Returns the number of layers composited.
    pub fn draw(
        &mut self,
        view: &ViewState,
        tasks: &TaskList,
        compositor: &mut LayerCompositor,
        full_redraw: bool,
    ) -> usize {
        let window = view.window();
        let visible = tasks.visible_in(&window);
        let geometry = TimelineGeometry::compute(view, self.container_width, visible.len());

        if compositor.width() != geometry.width || compositor.height() != geometry.height {
            compositor.resize_all(geometry.width, geometry.height);
        }
        if full_redraw {
            compositor.mark_all_dirty();
        }

        let stamp = LayerStamp {
            view: view.version(),
            tasks: tasks.version(),
            selection: tasks.selection_version(),
        };
        for kind in LayerKind::ORDER {
            let layer = compositor.layer_mut(kind);
            if !layer.sync(stamp) {
                continue;
            }
            let canvas = layer.begin_draw();
            match kind {
                LayerKind::Background => draw_background(canvas, &geometry),
                LayerKind::Tasks => draw_bars(canvas, &geometry, &visible),
                LayerKind::Progress => draw_progress(canvas, &geometry, &visible),
                LayerKind::Text => {
                    draw_header_labels(canvas, &geometry);
                    draw_bar_labels(canvas, &geometry, &visible);
                }
            }
        }
        let composited = compositor.render_all();
        debug!(
            composited,
            rows = visible.len(),
            days = geometry.total_days,
            col_width = geometry.col_width,
            "render pass"
        );
        self.geometry = Some(geometry);
        composited
    }

    /// Id of the first visible task whose bar contains `point`.
    pub fn hit_test(&self, view: &ViewState, tasks: &TaskList, point: Point) -> Option<String> {
        let window = view.window();
        let visible = tasks.visible_in(&window);
        let geometry = TimelineGeometry::compute(view, self.container_width, visible.len());
        visible
            .iter()
            .enumerate()
            .find(|(row, task)| geometry.bar_rect(*row, task).contains(point))
            .map(|(_, task)| task.id.clone())
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn draw_background(canvas: &mut dyn Canvas, g: &TimelineGeometry) {
    canvas.fill_rect(g.body_rect(), style::BODY_BG);
    canvas.fill_gradient(g.header_rect(), style::HEADER_TOP, style::HEADER_BOTTOM);

    for (i, date) in g.window.iter_days().enumerate() {
        let x = g.column_x(i as i64);
        if is_weekend(date) {
            canvas.fill_rect(
                Rect::new(x, 0.0, g.col_width, g.padding),
                style::WEEKEND_HEADER,
            );
            canvas.fill_rect(
                Rect::new(x, g.padding, g.col_width, g.height - g.padding),
                style::WEEKEND_BODY,
            );
        }
        if (i as i64) < g.total_days - 1 {
            let sep = x + g.col_width;
            canvas.line(
                Point::new(sep, 0.0),
                Point::new(sep, g.padding),
                0.5,
                style::SEPARATOR,
            );
            canvas.line(
                Point::new(sep, g.padding),
                Point::new(sep, g.height),
                0.5,
                style::GRID_LINE,
            );
        }
    }
}

fn draw_header_labels(canvas: &mut dyn Canvas, g: &TimelineGeometry) {
    let show_day_name = g.col_width >= style::DAY_NAME_MIN_WIDTH;
    let show_full_date = g.col_width >= style::FULL_DATE_MIN_WIDTH;
    let show_month = g.col_width >= style::MONTH_LABEL_MIN_WIDTH;
    let label = TextStyle::new(g.font_size, style::TEXT).aligned(TextAlign::Center);
    let mid = g.padding / 2.0;

    for (i, date) in g.window.iter_days().enumerate() {
        let x = g.column_x(i as i64) + g.col_width / 2.0;

        if show_month && date.day() == 1 && i > 0 {
            let month = TextStyle {
                size: g.font_size + 1.0,
                color: style::TEXT_MUTED,
                ..label
            }
            .bold();
            canvas.text(Point::new(x, mid - 12.0), &date.format("%B").to_string(), month);
        }

        if show_day_name {
            let second = if show_full_date {
                date.format("%-m/%-d").to_string()
            } else {
                date.day().to_string()
            };
            canvas.text(Point::new(x, mid - 8.0), &date.format("%a").to_string(), label);
            canvas.text(Point::new(x, mid + 8.0), &second, label);
        } else {
            canvas.text(Point::new(x, mid), &date.day().to_string(), label);
        }
    }
}

fn draw_bars(canvas: &mut dyn Canvas, g: &TimelineGeometry, visible: &[&Task]) {
    for (row, task) in visible.iter().enumerate() {
        let bar = g.bar_rect(row, task);
        let color = style::task_color(row);
        canvas.fill_rect(bar, color.with_alpha(style::BAR_ALPHA));
        if task.selected {
            canvas.stroke_rounded_rect(
                bar.expand(style::SELECTION_OUTSET),
                style::SELECTION_RADIUS,
                style::SELECTION_WIDTH,
                style::SELECTION,
            );
        }
    }
}

fn draw_progress(canvas: &mut dyn Canvas, g: &TimelineGeometry, visible: &[&Task]) {
    for (row, task) in visible.iter().enumerate() {
        if task.progress == 0 {
            continue;
        }
        let bar = g.bar_rect(row, task);
        let filled = bar.width * f32::from(task.progress) / 100.0;
        canvas.fill_rect(
            bar.with_width(filled),
            style::task_color(row).with_alpha(style::PROGRESS_ALPHA),
        );
    }
}

fn draw_bar_labels(canvas: &mut dyn Canvas, g: &TimelineGeometry, visible: &[&Task]) {
    let name_style = TextStyle::new(style::BAR_FONT_SIZE, style::TEXT);
    for (row, task) in visible.iter().enumerate() {
        let bar = g.bar_rect(row, task);
        let y = bar.y + bar.height / 2.0;
        let name = truncate_to_width(
            &*canvas,
            &task.name,
            bar.width - 2.0 * style::LABEL_INSET,
            style::BAR_FONT_SIZE,
        );
        if !name.is_empty() {
            canvas.text(Point::new(bar.x + style::LABEL_INSET, y), &name, name_style);
        }
        if task.progress > 0 {
            canvas.text(
                Point::new(bar.right() - style::LABEL_INSET, y),
                &format!("{}%", task.progress),
                name_style.aligned(TextAlign::Right),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{ChartMetrics, ViewMode};
    use crate::render::canvas::{DrawCmd, FixedWidthMeasure};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, name: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task::with_id(id, name, start, end).unwrap()
    }

    fn week_view() -> ViewState {
        // 2024-03-11 is a Monday.
        ViewState::new(d(2024, 3, 13), ViewMode::Week, ChartMetrics::default())
    }

    fn compositor() -> LayerCompositor {
        LayerCompositor::new(Arc::new(FixedWidthMeasure::default()))
    }

    fn texts(c: &LayerCompositor) -> Vec<String> {
        c.visible_commands()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn week_column_width_fills_container() {
        let view = week_view();
        let g = TimelineGeometry::compute(&view, 760.0, 0);
        assert_eq!(g.total_days, 7);
        assert!((g.col_width - 710.0 / 7.0).abs() < 1e-3);
        assert!((g.width - 760.0).abs() < 1e-3);
        assert_eq!(g.height, 300.0);
    }

    #[test]
    fn column_width_clamps_to_minimum() {
        let mut metrics = ChartMetrics::default();
        metrics.min_col_width = 120.0;
        let view = ViewState::new(d(2024, 3, 13), ViewMode::Week, metrics);
        let g = TimelineGeometry::compute(&view, 760.0, 0);
        assert_eq!(g.col_width, 120.0);
        assert_eq!(g.width, 50.0 + 7.0 * 120.0);
    }

    #[test]
    fn height_grows_with_rows() {
        let view = week_view();
        let g = TimelineGeometry::compute(&view, 760.0, 10);
        assert_eq!(g.height, 50.0 + 10.0 * 55.0);
    }

    #[test]
    fn bars_clip_to_window() {
        let view = week_view();
        let g = TimelineGeometry::compute(&view, 760.0, 1);
        let t = task("a", "Long", d(2024, 3, 1), d(2024, 3, 30));
        let bar = g.bar_rect(0, &t);
        assert_eq!(bar.x, 25.0);
        assert!((bar.width - 7.0 * g.col_width).abs() < 1e-3);
        assert_eq!(bar.height, 50.0);
    }

    #[test]
    fn bar_center_hits_its_task() {
        let view = week_view();
        let tasks = TaskList::new(vec![
            task("a", "Before", d(2024, 3, 1), d(2024, 3, 12)),
            task("b", "Inside", d(2024, 3, 13), d(2024, 3, 14)),
            task("hidden", "Elsewhere", d(2024, 4, 1), d(2024, 4, 2)),
            task("c", "After", d(2024, 3, 16), d(2024, 3, 29)),
        ]);
        let mut renderer = TimelineRenderer::new(760.0);
        renderer.draw(&view, &tasks, &mut compositor(), true);
        let g = renderer.geometry().unwrap().clone();

        for (row, t) in tasks.visible_in(&view.window()).into_iter().enumerate() {
            let center = g.bar_rect(row, t).center();
            assert_eq!(renderer.hit_test(&view, &tasks, center).as_deref(), Some(t.id.as_str()));
        }
    }

    #[test]
    fn empty_space_hits_nothing() {
        let view = week_view();
        let tasks = TaskList::new(vec![task("a", "Only", d(2024, 3, 13), d(2024, 3, 13))]);
        let renderer = TimelineRenderer::new(760.0);
        assert_eq!(renderer.hit_test(&view, &tasks, Point::new(5.0, 5.0)), None);
        assert_eq!(renderer.hit_test(&view, &tasks, Point::new(700.0, 40.0)), None);
    }

    #[test]
    fn selection_change_redraws_tasks_layer_only() {
        let view = week_view();
        let mut tasks = TaskList::new(vec![task("a", "Design", d(2024, 3, 11), d(2024, 3, 12))]);
        let mut renderer = TimelineRenderer::new(760.0);
        let mut c = compositor();

        assert_eq!(renderer.draw(&view, &tasks, &mut c, false), 4);
        assert_eq!(renderer.draw(&view, &tasks, &mut c, false), 0);

        tasks.select_only("a");
        assert_eq!(renderer.draw(&view, &tasks, &mut c, false), 1);
        assert!(c
            .visible_commands()
            .any(|cmd| matches!(cmd, DrawCmd::StrokeRoundedRect { .. })));

        assert_eq!(renderer.draw(&view, &tasks, &mut c, true), 4);
    }

    #[test]
    fn wide_columns_label_weekdays_and_dates() {
        let view = week_view();
        let tasks = TaskList::default();
        let mut renderer = TimelineRenderer::new(760.0);
        let mut c = compositor();
        renderer.draw(&view, &tasks, &mut c, true);
        let labels = texts(&c);
        assert!(labels.contains(&"Mon".to_string()));
        assert!(labels.contains(&"3/11".to_string()));
        assert!(labels.contains(&"3/17".to_string()));
    }

    #[test]
    fn narrow_columns_show_day_numbers_only() {
        let mut metrics = ChartMetrics::default();
        metrics.min_col_width = 20.0;
        let view = ViewState::new(d(2024, 3, 13), ViewMode::Month, metrics);
        let mut renderer = TimelineRenderer::new(900.0);
        let mut c = compositor();
        renderer.draw(&view, &TaskList::default(), &mut c, true);
        let labels = texts(&c);
        assert_eq!(labels.len(), 31);
        assert_eq!(labels[0], "1");
        assert!(!labels.contains(&"Fri".to_string()));
    }

    #[test]
    fn month_boundary_gets_a_label() {
        // Week of Monday 2024-02-26 crosses into March.
        let view = ViewState::new(d(2024, 2, 28), ViewMode::Week, ChartMetrics::default());
        let mut renderer = TimelineRenderer::new(760.0);
        let mut c = compositor();
        renderer.draw(&view, &TaskList::default(), &mut c, true);
        assert!(texts(&c).contains(&"March".to_string()));
    }

    #[test]
    fn long_names_are_truncated_and_progress_labelled() {
        let view = week_view();
        let t = task(
            "a",
            "An extremely long task name that cannot fit",
            d(2024, 3, 11),
            d(2024, 3, 11),
        )
        .with_progress(40);
        let tasks = TaskList::new(vec![t]);
        let mut renderer = TimelineRenderer::new(760.0);
        let mut c = compositor();
        renderer.draw(&view, &tasks, &mut c, true);
        let labels = texts(&c);
        assert!(labels.iter().any(|l| l.starts_with("An ext") && l.ends_with("...")));
        assert!(labels.contains(&"40%".to_string()));
    }

    #[test]
    fn palette_follows_visible_row() {
        let view = week_view();
        let g = TimelineGeometry::compute(&view, 760.0, 9);
        let tasks: Vec<Task> = (0..9)
            .map(|i| task(&format!("t{i}"), "x", d(2024, 3, 11), d(2024, 3, 12)))
            .collect();
        let mut surface = crate::render::canvas::Surface::new(
            g.width,
            g.height,
            Arc::new(FixedWidthMeasure::default()),
        );
        let refs: Vec<&Task> = tasks.iter().collect();
        draw_bars(&mut surface, &g, &refs);
        let fills: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills[0], fills[8]);
        assert_ne!(fills[0], fills[1]);
    }
}

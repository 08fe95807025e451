use std::collections::HashSet;
use std::time::{Duration, Instant};

use egui::{Align2, Context, Frame, Margin, RichText, Rounding};

use crate::binding::{Notification, ViewBinding};
use crate::error::Control;
use crate::model::ViewMode;
use crate::ui::theme;

struct Toast {
    notification: Notification,
    expires: Instant,
}

/// The egui side of the chart: toolbar state, canvas width and toasts.
pub struct EguiBinding {
    controls: HashSet<Control>,
    container_width: f32,
    range_label: String,
    active_view: ViewMode,
    toasts: Vec<Toast>,
    toast_duration: Duration,
}

impl EguiBinding {
    pub fn new(controls: &[Control], container_width: f32, toast_duration: Duration) -> Self {
        Self {
            controls: controls.iter().copied().collect(),
            container_width,
            range_label: String::new(),
            active_view: ViewMode::Week,
            toasts: Vec::new(),
            toast_duration,
        }
    }

    pub fn range_label(&self) -> &str {
        &self.range_label
    }

    pub fn active_view(&self) -> ViewMode {
        self.active_view
    }

    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = width;
    }

    /// Draw live toasts in the bottom-right corner and drop expired ones.
    pub fn show_toasts(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        let Some(next_expiry) = self.toasts.iter().map(|t| t.expires).min() else {
            return;
        };
        ctx.request_repaint_after(next_expiry.saturating_duration_since(now));

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(theme::TOAST_WIDTH);
                for toast in &self.toasts {
                    Frame::none()
                        .fill(theme::toast_fill(toast.notification.kind))
                        .rounding(Rounding::same(6.0))
                        .inner_margin(Margin::symmetric(12.0, 8.0))
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(&toast.notification.message)
                                    .color(egui::Color32::WHITE),
                            );
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

impl ViewBinding for EguiBinding {
    fn has_control(&self, control: Control) -> bool {
        self.controls.contains(&control)
    }

    fn container_width(&self) -> f32 {
        self.container_width
    }

    fn set_range_label(&mut self, label: &str) {
        self.range_label = label.to_string();
    }

    fn set_active_view(&mut self, mode: ViewMode) {
        self.active_view = mode;
    }

    fn notify(&mut self, notification: Notification) {
        self.toasts.push(Toast {
            notification,
            expires: Instant::now() + self.toast_duration,
        });
    }
}

use egui::{Sense, Ui, Vec2};

use crate::binding::ClickModifiers;
use crate::controller::GanttController;
use crate::render::canvas::Point;
use crate::ui::binding::EguiBinding;
use crate::ui::painter::EguiCanvas;
use crate::ui::theme;

/// What happened in the chart area this frame.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// Width the chart had to work with.
    pub available_width: f32,
    /// Canvas click in chart coordinates.
    pub click: Option<(Point, ClickModifiers)>,
}

/// Paint the composited chart and report clicks. The chart itself is drawn
/// by the controller; this only hosts it in a scroll area.
pub fn show_gantt_chart(controller: &GanttController<EguiBinding>, ui: &mut Ui) -> ChartInteraction {
    let mut interaction = ChartInteraction {
        available_width: ui.available_width(),
        click: None,
    };

    let size = controller
        .geometry()
        .map(|g| Vec2::new(g.width, g.height))
        .unwrap_or_else(|| ui.available_size());

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(size, Sense::click());
            let origin = response.rect.min;

            painter.rect_filled(response.rect, 0.0, theme::BG_PANEL);
            let mut canvas = EguiCanvas::new(&painter, origin);
            controller.present(&mut canvas);

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let modifiers = ui.input(|i| ClickModifiers {
                        shift: i.modifiers.shift,
                        toggle: i.modifiers.ctrl || i.modifiers.command,
                    });
                    let local = pos - origin;
                    interaction.click = Some((Point::new(local.x, local.y), modifiers));
                }
            }
        });

    interaction
}

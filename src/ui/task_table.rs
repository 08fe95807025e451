use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::model::TaskList;
use crate::render::style;
use crate::ui::theme;

/// Actions that the task table can request.
pub enum TaskTableAction {
    None,
    Select(String),
    Edit(String),
    Add,
}

/// Render the left-side task list.
pub fn show_task_table(tasks: &TaskList, ui: &mut Ui) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Tasks").strong().size(15.0));
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("({})", tasks.len()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(
        RichText::new(format!("{}  Add Task", icons::PLUS))
            .color(Color32::WHITE)
            .size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = TaskTableAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, task) in tasks.tasks().iter().enumerate() {
                let row_bg = if task.selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_ROW_ALT
                };
                let frame = egui::Frame::none()
                    .fill(row_bg)
                    .rounding(egui::Rounding::same(4.0))
                    .inner_margin(egui::Margin::symmetric(6.0, 4.0));

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        ui.add(egui::Label::new(RichText::new(&task.name).size(12.0)).truncate());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            let edit = ui.add(
                                egui::Button::new(
                                    RichText::new(icons::PENCIL_SIMPLE).color(theme::TEXT_DIM),
                                )
                                .frame(false),
                            );
                            if edit.on_hover_text("Edit task").clicked() {
                                action = TaskTableAction::Edit(task.id.clone());
                            }

                            ui.add(
                                egui::ProgressBar::new(f32::from(task.progress) / 100.0)
                                    .desired_width(48.0)
                                    .fill(theme::color(style::task_color(i)))
                                    .rounding(egui::Rounding::same(3.0)),
                            );
                            ui.label(
                                RichText::new(format!(
                                    "{} → {}",
                                    task.start.format("%m/%d"),
                                    task.end.format("%m/%d")
                                ))
                                .size(10.0)
                                .color(theme::TEXT_SECONDARY),
                            );
                        });
                    });
                });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("task-row", &task.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = TaskTableAction::Select(task.id.clone());
                }
                ui.add_space(1.0);
            }
        });

    action
}

use egui::{Color32, Context, RichText, Window};
use egui_phosphor::regular as icons;

use crate::controller::TaskForm;
use crate::io::import::{ImportMode, PendingImport};
use crate::ui::theme;

/// Buttons pressed in the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFormAction {
    None,
    Save,
    Delete,
    Cancel,
}

/// Buttons pressed in the import preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    None,
    Confirm(ImportMode),
    Cancel,
}

/// Render the add/edit task dialog over `form`.
pub fn show_task_form(form: &mut TaskForm, ctx: &Context) -> TaskFormAction {
    let mut action = TaskFormAction::None;
    let title = if form.is_edit() { "Edit Task" } else { "Add Task" };

    Window::new(RichText::new(title).strong().size(14.0))
        .id(egui::Id::new("task_form"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("task_form_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.name).hint_text("Task name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.start).id_salt("form_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.end).id_salt("form_dp_end"));
                    ui.end_row();

                    if form.is_edit() {
                        ui.label(RichText::new("Progress").color(theme::TEXT_SECONDARY));
                        ui.add(egui::Slider::new(&mut form.progress, 0..=100).suffix("%"));
                        ui.end_row();
                    }
                });

            if form.start > form.end {
                ui.add_space(4.0);
                ui.label(
                    RichText::new("End date must not be before the start date")
                        .font(theme::font_small())
                        .color(theme::DANGER),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT);
                if ui.add_sized([80.0, 28.0], save).clicked() {
                    action = TaskFormAction::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = TaskFormAction::Cancel;
                }
                if form.is_edit() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let delete = egui::Button::new(
                            RichText::new(format!("{} Delete", icons::TRASH)).color(Color32::WHITE),
                        )
                        .fill(theme::DANGER);
                        if ui.add_sized([80.0, 28.0], delete).clicked() {
                            action = TaskFormAction::Delete;
                        }
                    });
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = TaskFormAction::Cancel;
    }
    action
}

/// Render the import confirmation. `mode` holds the radio choice between
/// frames.
pub fn show_import_preview(pending: &PendingImport, mode: &mut ImportMode, ctx: &Context) -> ImportAction {
    let mut action = ImportAction::None;
    let preview = &pending.preview;

    Window::new(RichText::new("Import Tasks").strong().size(14.0))
        .id(egui::Id::new("import_preview"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.label(format!(
                "Found {} task(s), {} valid, {} skipped.",
                preview.found, preview.valid, preview.skipped
            ));
            ui.add_space(6.0);

            for task in &preview.sample {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&task.name).strong());
                    ui.label(
                        RichText::new(format!(
                            "{} → {}",
                            task.start.format("%Y-%m-%d"),
                            task.end.format("%Y-%m-%d")
                        ))
                        .font(theme::font_small())
                        .color(theme::TEXT_SECONDARY),
                    );
                });
            }
            if preview.remaining > 0 {
                ui.label(
                    RichText::new(format!("...and {} more", preview.remaining))
                        .color(theme::TEXT_DIM),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.radio_value(mode, ImportMode::Replace, "Replace existing tasks");
            ui.radio_value(mode, ImportMode::Merge, "Add to existing tasks");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let confirm = egui::Button::new(RichText::new("Import").color(Color32::WHITE))
                    .fill(theme::ACCENT);
                if ui.add_sized([80.0, 28.0], confirm).clicked() {
                    action = ImportAction::Confirm(*mode);
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = ImportAction::Cancel;
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = ImportAction::Cancel;
    }
    action
}

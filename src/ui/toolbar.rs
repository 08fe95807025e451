use egui::{Button, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::model::ViewMode;
use crate::ui::binding::EguiBinding;
use crate::ui::theme;

/// What the user asked for from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    AddTask,
    DeleteSelected,
    SetView(ViewMode),
    Navigate(i32),
    Today,
    Import,
    Export,
    Recommended,
}

/// Render the toolbar. Returns the clicked action, if any.
pub fn show_toolbar(binding: &EguiBinding, has_selection: bool, ui: &mut Ui) -> Option<ToolbarAction> {
    let mut action = None;
    ui.horizontal_centered(|ui| {
        let add = Button::new(
            RichText::new(format!("{}  Add Task", icons::PLUS)).color(egui::Color32::WHITE),
        )
        .fill(theme::ACCENT);
        if ui.add(add).clicked() {
            action = Some(ToolbarAction::AddTask);
        }
        if ui
            .add_enabled(has_selection, Button::new(format!("{}  Delete", icons::TRASH)))
            .on_hover_text("Delete selected tasks")
            .clicked()
        {
            action = Some(ToolbarAction::DeleteSelected);
        }

        ui.separator();

        let active = binding.active_view();
        for (mode, label) in [(ViewMode::Week, "Week"), (ViewMode::Month, "Month")] {
            if ui.selectable_label(active == mode, label).clicked() && active != mode {
                action = Some(ToolbarAction::SetView(mode));
            }
        }

        ui.separator();

        if ui.button(icons::ARROW_LEFT).on_hover_text("Previous").clicked() {
            action = Some(ToolbarAction::Navigate(-1));
        }
        if ui.button("Today").clicked() {
            action = Some(ToolbarAction::Today);
        }
        if ui.button(icons::ARROW_RIGHT).on_hover_text("Next").clicked() {
            action = Some(ToolbarAction::Navigate(1));
        }
        ui.label(RichText::new(binding.range_label()).font(theme::font_label()).strong());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Export").clicked() {
                action = Some(ToolbarAction::Export);
            }
            if ui.button("Import").clicked() {
                action = Some(ToolbarAction::Import);
            }
            if ui
                .button(icons::STAR)
                .on_hover_text("Recommended tasks")
                .clicked()
            {
                action = Some(ToolbarAction::Recommended);
            }
        });
    });
    action
}

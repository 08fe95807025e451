use chrono::NaiveDateTime;
use egui::{Color32, Context, RichText, Ui, Window};
use egui_phosphor::regular as icons;

use crate::model::recommend::{recommend, Priority, RecommendFilter, RecommendStats, TimeRange};
use crate::model::TaskList;
use crate::ui::theme;

fn priority_color(priority: Priority) -> Color32 {
    match priority {
        Priority::High => theme::DANGER,
        Priority::Medium => theme::WARNING,
        Priority::Low => theme::SUCCESS,
    }
}

fn stat_card(ui: &mut Ui, value: usize, caption: &str) {
    egui::Frame::none()
        .fill(theme::BG_ROW_ALT)
        .rounding(egui::Rounding::same(5.0))
        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(value.to_string()).strong().size(18.0).color(theme::ACCENT));
                ui.label(RichText::new(caption).font(theme::font_small()).color(theme::TEXT_SECONDARY));
            });
        });
}

/// Render the recommended-tasks window. Clicking a card returns its task id.
/// `open` is cleared when the window is closed.
pub fn show_recommendations(
    tasks: &TaskList,
    filter: &mut RecommendFilter,
    open: &mut bool,
    now: NaiveDateTime,
    ctx: &Context,
) -> Option<String> {
    let mut picked = None;

    Window::new(RichText::new(format!("{}  Recommended", icons::STAR)).strong().size(14.0))
        .id(egui::Id::new("recommended_tasks"))
        .open(open)
        .collapsible(false)
        .default_width(theme::DIALOG_WIDTH)
        .show(ctx, |ui| {
            let stats = RecommendStats::collect(tasks.tasks(), now);
            ui.horizontal(|ui| {
                stat_card(ui, stats.today, "Today");
                stat_card(ui, stats.due_soon, "Due in 3 days");
                stat_card(ui, stats.completed, "Completed");
            });
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("recommend_range")
                    .selected_text(filter.range.label())
                    .show_ui(ui, |ui| {
                        for range in TimeRange::ALL {
                            ui.selectable_value(&mut filter.range, range, range.label());
                        }
                    });
                egui::ComboBox::from_id_salt("recommend_priority")
                    .selected_text(filter.priority.map_or("All priorities", Priority::label))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut filter.priority, None, "All priorities");
                        for priority in Priority::ALL {
                            ui.selectable_value(&mut filter.priority, Some(priority), priority.label());
                        }
                    });
            });
            ui.separator();

            let recommended = recommend(tasks.tasks(), filter, now);
            if recommended.is_empty() {
                ui.label(RichText::new("No recommended tasks for this filter").color(theme::TEXT_DIM));
                return;
            }

            egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                for rec in recommended {
                    let frame = egui::Frame::none()
                        .fill(if rec.task.selected { theme::BG_SELECTED } else { theme::BG_PANEL })
                        .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE))
                        .rounding(egui::Rounding::same(4.0))
                        .inner_margin(egui::Margin::symmetric(8.0, 6.0));
                    let card = frame.show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(&rec.task.name).strong());
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(format!(
                                    "{} - {}",
                                    rec.task.start.format("%Y-%m-%d"),
                                    rec.task.end.format("%Y-%m-%d")
                                ))
                                .font(theme::font_small())
                                .color(theme::TEXT_SECONDARY),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(
                                    RichText::new(rec.priority.label())
                                        .font(theme::font_small())
                                        .color(priority_color(rec.priority)),
                                );
                            });
                        });
                    });
                    let click = ui.interact(
                        card.response.rect,
                        egui::Id::new(("recommended-row", &rec.task.id)),
                        egui::Sense::click(),
                    );
                    if click.clicked() {
                        picked = Some(rec.task.id.clone());
                    }
                    ui.add_space(2.0);
                }
            });
        });

    picked
}

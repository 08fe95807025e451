use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::binding::{ClickModifiers, Notification, ViewBinding};
use crate::config::Settings;
use crate::controller::GanttController;
use crate::error::{Control, GanttError, Result};
use crate::io::exchange::export_file_name;
use crate::io::import::ImportMode;
use crate::io::store::{JsonFileStore, MemoryStore, TaskStore};
use crate::model::RecommendFilter;
use crate::render::canvas::Point;
use crate::render::scheduler::Debouncer;
use crate::ui;
use crate::ui::binding::EguiBinding;
use crate::ui::dialogs::{ImportAction, TaskFormAction};
use crate::ui::painter::EguiTextMeasure;
use crate::ui::task_table::TaskTableAction;
use crate::ui::toolbar::ToolbarAction;

/// Main application state.
pub struct GanttApp {
    controller: GanttController<EguiBinding>,
    runtime: tokio::runtime::Runtime,

    // Debounced input
    resize: Debouncer<f32>,
    last_width: f32,
    clicks: Debouncer<(Point, ClickModifiers)>,
    toolbar: Debouncer<ToolbarAction>,

    // Dialog state
    import_mode: ImportMode,
    recommend_open: bool,
    recommend_filter: RecommendFilter,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Result<Self> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| GanttError::storage("open", err))?;

        let store_dir = settings.store_dir();
        let (store, persistent): (Box<dyn TaskStore>, bool) =
            match runtime.block_on(JsonFileStore::open(&store_dir)) {
                Ok(store) => (Box::new(store), true),
                Err(err) => {
                    warn!(dir = %store_dir.display(), error = %err, "falling back to in-memory store");
                    (Box::new(MemoryStore::new()), false)
                }
            };

        let width = (cc.egui_ctx.screen_rect().width() - ui::theme::SIDE_PANEL_WIDTH).max(0.0);
        let binding = EguiBinding::new(Control::REQUIRED, width, settings.notification_duration());
        let resize = Debouncer::new(settings.resize_debounce());
        let clicks = Debouncer::new(settings.click_debounce());
        let toolbar = Debouncer::new(settings.toolbar_debounce());

        let mut controller = GanttController::new(
            binding,
            store,
            settings,
            Arc::new(EguiTextMeasure::new(cc.egui_ctx.clone())),
            chrono::Local::now().date_naive(),
        )?;
        if !persistent {
            controller
                .binding_mut()
                .notify(Notification::info("Storage unavailable. Changes will not be saved"));
        }
        if let Err(err) = runtime.block_on(controller.load()) {
            debug!(error = %err, "starting with an empty chart");
        }

        Ok(Self {
            controller,
            runtime,
            resize,
            last_width: width,
            clicks,
            toolbar,
            import_mode: ImportMode::default(),
            recommend_open: false,
            recommend_filter: RecommendFilter::default(),
        })
    }

    fn run_toolbar(&mut self, action: ToolbarAction) {
        debug!(?action, "toolbar");
        match action {
            ToolbarAction::AddTask => self.controller.open_create_form(),
            ToolbarAction::DeleteSelected => {
                let _ = self.runtime.block_on(self.controller.delete_selected());
            }
            ToolbarAction::SetView(mode) => self.controller.set_view_mode(mode),
            ToolbarAction::Navigate(delta) => self.controller.navigate(delta),
            ToolbarAction::Today => self.controller.jump_to_today(),
            ToolbarAction::Import => self.import_file(),
            ToolbarAction::Export => self.export_file(),
            ToolbarAction::Recommended => self.recommend_open = !self.recommend_open,
        }
    }

    pub fn import_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON Files", &["json"])
            .pick_file()
        else {
            return;
        };
        match self.runtime.block_on(tokio::fs::read_to_string(&path)) {
            Ok(text) => {
                info!(path = %path.display(), "import file selected");
                self.import_mode = ImportMode::default();
                let _ = self.controller.import_json(&text);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read import file");
                self.controller
                    .binding_mut()
                    .notify(Notification::error("Import failed: could not read file"));
            }
        }
    }

    pub fn export_file(&mut self) {
        let default_name = export_file_name(chrono::Local::now().date_naive());
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON Files", &["json"])
            .set_file_name(&default_name)
            .save_file()
        {
            let _ = self.runtime.block_on(self.controller.export_to(&path));
        }
    }

    fn poll_debounced(&mut self, now: Instant) {
        if let Some(width) = self.resize.poll(now) {
            self.controller.binding_mut().set_container_width(width);
            self.controller.resize();
        }
        if let Some((point, modifiers)) = self.clicks.poll(now) {
            self.controller.click(point, modifiers);
        }
        if let Some(action) = self.toolbar.poll(now) {
            self.run_toolbar(action);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if self.recommend_open {
            let picked = ui::recommend::show_recommendations(
                self.controller.tasks(),
                &mut self.recommend_filter,
                &mut self.recommend_open,
                chrono::Local::now().naive_local(),
                ctx,
            );
            if let Some(id) = picked {
                self.controller.select_task(&id);
            }
        }

        let form_action = match self.controller.form_mut() {
            Some(form) => ui::dialogs::show_task_form(form, ctx),
            None => TaskFormAction::None,
        };
        match form_action {
            TaskFormAction::Save => {
                let _ = self.runtime.block_on(self.controller.submit_form());
            }
            TaskFormAction::Delete => {
                let _ = self.runtime.block_on(self.controller.delete_form_task());
            }
            TaskFormAction::Cancel => self.controller.close_form(),
            TaskFormAction::None => {}
        }

        let import_action = match self.controller.pending_import() {
            Some(pending) => ui::dialogs::show_import_preview(pending, &mut self.import_mode, ctx),
            None => ImportAction::None,
        };
        match import_action {
            ImportAction::Confirm(mode) => {
                let _ = self.runtime.block_on(self.controller.confirm_import(mode));
            }
            ImportAction::Cancel => {
                self.controller.cancel_import();
            }
            ImportAction::None => {}
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll_debounced(now);

        let dialog_open = self.controller.form().is_some() || self.controller.pending_import().is_some();
        if !dialog_open
            && !ctx.wants_keyboard_input()
            && ctx.input(|i| i.key_pressed(egui::Key::Delete))
            && self.controller.tasks().selected().next().is_some()
        {
            self.toolbar.trigger(ToolbarAction::DeleteSelected, now);
        }

        self.controller.draw_frame();

        // Top panel: toolbar
        let has_selection = self.controller.tasks().selected().next().is_some();
        egui::TopBottomPanel::top("toolbar")
            .exact_height(ui::theme::TOOLBAR_HEIGHT)
            .show(ctx, |ui| {
                if let Some(action) =
                    ui::toolbar::show_toolbar(self.controller.binding(), has_selection, ui)
                {
                    self.toolbar.trigger(action, now);
                }
            });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let view = self.controller.view();
                ui.label(
                    egui::RichText::new(format!("{} view", view.view_mode.as_str()))
                        .font(ui::theme::font_small())
                        .color(ui::theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "Tasks: {} · Selected: {}",
                            self.controller.tasks().len(),
                            self.controller.tasks().selected().count()
                        ))
                        .font(ui::theme::font_small())
                        .color(ui::theme::TEXT_DIM),
                    );
                });
            });
        });

        // Left panel: task table
        let mut table_action = TaskTableAction::None;
        egui::SidePanel::left("task_panel")
            .exact_width(ui::theme::SIDE_PANEL_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                table_action = ui::task_table::show_task_table(self.controller.tasks(), ui);
            });
        match table_action {
            TaskTableAction::Select(id) => self.controller.select_task(&id),
            TaskTableAction::Edit(id) => {
                let _ = self.controller.open_edit_form(&id);
            }
            TaskTableAction::Add => self.controller.open_create_form(),
            TaskTableAction::None => {}
        }

        // Central panel: the chart
        let interaction = egui::CentralPanel::default()
            .show(ctx, |ui| ui::gantt_chart::show_gantt_chart(&self.controller, ui))
            .inner;
        if (interaction.available_width - self.last_width).abs() >= 1.0 {
            self.last_width = interaction.available_width;
            self.resize.trigger(interaction.available_width, now);
        }
        if let Some(click) = interaction.click {
            self.clicks.trigger(click, now);
        }

        self.show_dialogs(ctx);
        self.controller.binding_mut().show_toasts(ctx);

        if self.controller.render_pending() {
            ctx.request_repaint();
        }
        let wake = [
            self.resize.remaining(now),
            self.clicks.remaining(now),
            self.toolbar.remaining(now),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(wait) = wake {
            ctx.request_repaint_after(wait);
        }
    }
}

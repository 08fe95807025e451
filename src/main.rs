#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use gantt_timeline::app::GanttApp;
use gantt_timeline::config::Settings;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let settings = Settings::load();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Timeline",
        options,
        Box::new(move |cc| {
            let app = GanttApp::new(cc, settings).map_err(|err| {
                error!(error = %err, "startup failed");
                rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("Gantt Timeline")
                    .set_description(err.user_message())
                    .show();
                err
            })?;
            Ok(Box::new(app))
        }),
    )
}

mod domain;
mod infrastructure;
mod presentation;

use domain::settings::SettingsService;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    let settings_service = SettingsService::new()?;

    let logging_guard = infrastructure::logging::init_logger(&settings_service.get().log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    tracing::info!("Starting Beacon Pages");
    for issue in settings_service.load_issues() {
        tracing::warn!("{}", issue);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_title("Beacon Pages"),
        ..Default::default()
    };

    eframe::run_native(
        "Beacon Pages",
        options,
        Box::new(move |cc| {
            Ok(Box::new(presentation::app::BeaconApp::new(
                cc,
                settings_service,
                logging_guard,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))
}

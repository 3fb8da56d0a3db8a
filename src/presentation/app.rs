use crate::domain::models::{AppEvent, BeaconReading, MessageSeverity, StatusMessage};
use crate::domain::settings::SettingsService;
use crate::infrastructure::logging::LoggingGuard;
use crate::infrastructure::service;
use crate::presentation::components::Components;
use crate::presentation::pages::{PageContainers, SharedPages};
use eframe::egui;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

pub struct BeaconApp {
    pub(crate) pages: SharedPages,

    // Proximity service
    pub(crate) events_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub(crate) ready_tx: Option<oneshot::Sender<()>>,
    pub(crate) _service: Option<std::thread::JoinHandle<()>>,

    // State
    pub(crate) alerts: VecDeque<String>,
    pub(crate) status_message: Option<StatusMessage>,
    pub(crate) readings: Vec<BeaconReading>,
    pub(crate) current_beacon: Option<String>,

    // UI Options
    pub(crate) is_dark_mode: bool,
    pub(crate) show_beacon_panel: bool,

    // Logging guard
    pub(crate) _logging_guard: Option<LoggingGuard>,
}

impl BeaconApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings_service: SettingsService,
        logging_guard: Option<LoggingGuard>,
    ) -> Self {
        crate::presentation::theme::apply(&cc.egui_ctx, false);

        let settings = settings_service.get();
        info!(path = %settings_service.path().display(), "Loaded settings");

        let pages =
            PageContainers::new(settings.page_definitions(), &settings.default_page).shared();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let mut status_message = settings_service
            .load_issues()
            .last()
            .map(|issue| StatusMessage {
                message: issue.clone(),
                severity: MessageSeverity::Warning,
            });
        let service = match service::spawn(settings, pages.clone(), events_tx, ready_rx) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start proximity service: {}", e);
                status_message = Some(StatusMessage {
                    message: format!("Failed to start proximity service: {}", e),
                    severity: MessageSeverity::Error,
                });
                None
            }
        };

        Self {
            pages,
            events_rx,
            ready_tx: Some(ready_tx),
            _service: service,
            alerts: VecDeque::new(),
            status_message,
            readings: Vec::new(),
            current_beacon: None,
            is_dark_mode: false,
            show_beacon_panel: true,
            _logging_guard: logging_guard,
        }
    }

    fn process_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Alert(text) => self.alerts.push_back(text),
            AppEvent::LogMessage(msg) => self.status_message = Some(msg),
            AppEvent::Readings(readings) => self.readings = readings,
            AppEvent::PageChanged { beacon, page } => {
                self.status_message = Some(match &beacon {
                    Some(b) => StatusMessage {
                        message: format!("Closest beacon: {} ({})", b, page),
                        severity: MessageSeverity::Success,
                    },
                    None => StatusMessage::info("No beacons in range"),
                });
                self.current_beacon = beacon;
            }
        }
    }

    fn ui_status_bar(&self, ui: &mut egui::Ui) {
        if let Some(msg) = &self.status_message {
            let (bg, fg) = match msg.severity {
                MessageSeverity::Info => (egui::Color32::from_gray(100), egui::Color32::WHITE),
                MessageSeverity::Success => {
                    (egui::Color32::from_rgb(0, 200, 0), egui::Color32::BLACK)
                }
                MessageSeverity::Warning => {
                    (egui::Color32::from_rgb(255, 200, 0), egui::Color32::BLACK)
                }
                MessageSeverity::Error => {
                    (egui::Color32::from_rgb(255, 50, 50), egui::Color32::WHITE)
                }
            };
            Components::status_banner(ui, &msg.message, bg, fg);
        }
    }

    fn ui_beacon_panel(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Nearby Beacons").strong().size(18.0));
        ui.separator();
        if self.readings.is_empty() {
            ui.label("None in range");
            return;
        }

        let now = Instant::now();
        for reading in &self.readings {
            let is_closest = self.current_beacon.as_deref() == Some(reading.identifier.as_str());
            Components::beacon_row(ui, reading, is_closest, now);
            ui.add_space(6.0);
        }
    }

    /// Modal for the oldest pending alert. Returns `true` while one is open.
    fn ui_alert(&mut self, ctx: &egui::Context) -> bool {
        let Some(text) = self.alerts.front().cloned() else {
            return false;
        };

        let mut dismissed = false;
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(text);
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.alerts.pop_front();
        }
        true
    }
}

impl eframe::App for BeaconApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // First frame: the page containers exist, let the service start
        if let Some(ready) = self.ready_tx.take() {
            let _ = ready.send(());
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.process_event(event);
        }

        ctx.request_repaint_after(Duration::from_millis(100));

        let alert_open = self.ui_alert(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_enabled_ui(!alert_open, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.toggle_value(&mut self.show_beacon_panel, "Beacons");

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let switch_icon = if self.is_dark_mode {
                            "☀ Light"
                        } else {
                            "🌙 Dark"
                        };
                        if ui.button(switch_icon).clicked() {
                            self.is_dark_mode = !self.is_dark_mode;
                            crate::presentation::theme::apply(ctx, self.is_dark_mode);
                        }
                    });
                });
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            self.ui_status_bar(ui);
        });

        if self.show_beacon_panel {
            egui::SidePanel::right("beacon_panel")
                .resizable(false)
                .exact_width(240.0)
                .show(ctx, |ui| self.ui_beacon_panel(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!alert_open, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(700.0);
                    ui.add_space(30.0);
                    match self.pages.lock() {
                        Ok(pages) => pages.render(ui),
                        Err(_) => {
                            ui.label("Page containers unavailable");
                        }
                    }
                });
            });
        });
    }
}

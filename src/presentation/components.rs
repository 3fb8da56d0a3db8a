use crate::domain::models::BeaconReading;
use eframe::egui;
use std::time::Instant;

/// Weakest RSSI drawn on the signal meter; anything below shows empty.
const METER_FLOOR_DBM: f32 = -100.0;
/// Strongest RSSI drawn on the signal meter.
const METER_CEIL_DBM: f32 = -30.0;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    /// Bordered box holding the body of a page
    pub fn page_card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;
        let bg = ui.style().visuals.widgets.noninteractive.bg_fill;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(24.0))
            .stroke(stroke)
            .fill(bg)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                add_contents(ui)
            })
            .inner
    }

    pub fn status_banner(
        ui: &mut egui::Ui,
        text: &str,
        bg_color: egui::Color32,
        text_color: egui::Color32,
    ) {
        ui.add_sized(
            [ui.available_width(), 30.0],
            egui::Label::new(
                egui::RichText::new(text)
                    .color(text_color)
                    .background_color(bg_color)
                    .size(14.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Extend),
        );
    }

    /// One row of the nearby beacons list: name, RSSI meter and age
    pub fn beacon_row(ui: &mut egui::Ui, reading: &BeaconReading, is_closest: bool, now: Instant) {
        let age = now.saturating_duration_since(reading.observed_at);
        let name = if is_closest {
            egui::RichText::new(&reading.identifier).strong()
        } else {
            egui::RichText::new(&reading.identifier)
        };

        ui.horizontal(|ui| {
            ui.label(name);
            ui.label(format!("{} dBm", reading.signal_strength));
        });
        ui.add(
            egui::ProgressBar::new(signal_fraction(reading.signal_strength))
                .desired_width(ui.available_width())
                .text(format!("{:.1}s ago", age.as_secs_f32())),
        );
    }
}

/// Map RSSI to 0..=1 for the signal meter
fn signal_fraction(rssi: i16) -> f32 {
    ((rssi as f32 - METER_FLOOR_DBM) / (METER_CEIL_DBM - METER_FLOOR_DBM)).clamp(0.0, 1.0)
}

use eframe::egui;

/// Square corners, outlined page cards and a red frame around the scan alert
pub fn apply(ctx: &egui::Context, is_dark: bool) {
    let (mut visuals, outline) = if is_dark {
        (egui::Visuals::dark(), egui::Color32::WHITE)
    } else {
        (egui::Visuals::light(), egui::Color32::BLACK)
    };

    let widgets = &mut visuals.widgets;
    for w in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
    ] {
        w.rounding = egui::Rounding::ZERO;
    }
    // Page cards draw with the noninteractive stroke
    widgets.noninteractive.bg_stroke = egui::Stroke::new(2.0, outline);

    visuals.window_rounding = egui::Rounding::ZERO;
    visuals.window_stroke = egui::Stroke::new(3.0, egui::Color32::from_rgb(255, 50, 50));

    let mut style = (*ctx.style()).clone();
    style.visuals = visuals;
    if let Some(font) = style.text_styles.get_mut(&egui::TextStyle::Heading) {
        font.size = 32.0;
    }
    if let Some(font) = style.text_styles.get_mut(&egui::TextStyle::Body) {
        font.size = 16.0;
    }

    ctx.set_style(style);
}

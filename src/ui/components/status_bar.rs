//! Header with title, commander, link status and coordinates

use crate::ui::state::UiSnapshot;
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub const TITLE: &str = "sumY TACTICAL COMMAND";
pub const COMMANDER_LINE: &str = "CMD: CPT. PRADEEP CHAUDHARY";

pub fn status_text(online: bool) -> &'static str {
    if online {
        "SYSTEM ONLINE"
    } else {
        "SYSTEM OFFLINE"
    }
}

pub struct StatusBar<'a> {
    snapshot: &'a UiSnapshot,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(snapshot: &'a UiSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let online = self.snapshot.is_online();
        let (lat, lng) = self.snapshot.unit.geo_readout();

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(TITLE)
                        .size(20.0)
                        .strong()
                        .color(self.theme.saffron),
                );
                ui.label(
                    RichText::new(COMMANDER_LINE)
                        .size(11.0)
                        .color(self.theme.text_secondary),
                );
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!("LAT: {}  LNG: {}", lat, lng))
                        .size(11.0)
                        .color(self.theme.signal),
                );

                ui.add_space(self.theme.spacing);

                egui::Frame::none()
                    .stroke(egui::Stroke::new(1.0, self.theme.status_color(online)))
                    .rounding(self.theme.button_rounding)
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(status_text(online))
                                .size(12.0)
                                .strong()
                                .color(self.theme.status_color(online)),
                        );
                    });
            });
        });
    }
}

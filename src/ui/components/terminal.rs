//! Communication log panel

use crate::messages::{LogEntry, LogSource};
use crate::ui::theme::Theme;
use chrono::{DateTime, Local, Utc};
use egui::{self, Align, Layout, RichText};

pub const EMPTY_LOG_TEXT: &str = "Awaiting system activation...";

pub fn source_label(source: LogSource) -> &'static str {
    match source {
        LogSource::User => "HUMAN",
        LogSource::Agent => "SUMY SYSTEM",
    }
}

/// `HH:MM:SS` in local time
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub struct Terminal<'a> {
    logs: &'a [LogEntry],
    theme: &'a Theme,
}

impl<'a> Terminal<'a> {
    pub fn new(logs: &'a [LogEntry], theme: &'a Theme) -> Self {
        Self { logs, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("COMMUNICATION LOG")
                .size(12.0)
                .strong()
                .color(self.theme.signal),
        );
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("communication_log")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if self.logs.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(self.theme.spacing_lg);
                        ui.label(
                            RichText::new(EMPTY_LOG_TEXT)
                                .italics()
                                .color(self.theme.text_muted),
                        );
                    });
                    return;
                }

                for entry in self.logs {
                    self.show_entry(ui, entry);
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }

    fn show_entry(&self, ui: &mut egui::Ui, entry: &LogEntry) {
        let (align, accent) = match entry.source {
            LogSource::User => (Align::RIGHT, self.theme.user_accent),
            LogSource::Agent => (Align::LEFT, self.theme.saffron),
        };

        ui.with_layout(Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(format!(
                    "{} [{}]",
                    source_label(entry.source),
                    format_timestamp(&entry.timestamp)
                ))
                .size(10.0)
                .color(accent),
            );

            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .stroke(egui::Stroke::new(1.0, accent.gamma_multiply(0.5)))
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing_sm)
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.9);
                    let response = ui.label(
                        RichText::new(&entry.text).color(self.theme.text_primary),
                    );
                    let label = format!("{}: {}", source_label(entry.source), entry.text);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                });
        });
    }
}

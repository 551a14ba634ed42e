use crate::session::ConnectionState;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

/// What the operator asked for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkIntent {
    Connect,
    Disconnect,
}

pub fn button_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected | ConnectionState::Error => "INITIALIZE",
        ConnectionState::Connecting => "CONNECTING...",
        ConnectionState::Connected => "ABORT LINK",
    }
}

/// Single connect/abort button; disabled while a connection is being set up
pub struct LinkToggle<'a> {
    state: ConnectionState,
    theme: &'a Theme,
}

impl<'a> LinkToggle<'a> {
    pub fn new(state: ConnectionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<LinkIntent> {
        let label = button_label(self.state);
        let enabled = self.state != ConnectionState::Connecting;
        let fill = match self.state {
            ConnectionState::Connected => self.theme.error.gamma_multiply(0.7),
            ConnectionState::Connecting => self.theme.bg_tertiary,
            _ => self.theme.flag_green,
        };

        let button = egui::Button::new(
            RichText::new(label)
                .size(14.0)
                .strong()
                .color(self.theme.text_primary),
        )
        .fill(fill)
        .rounding(self.theme.button_rounding)
        .min_size(Vec2::new(160.0, 40.0));

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, label));

        if !response.clicked() {
            return None;
        }

        match self.state {
            ConnectionState::Connected => Some(LinkIntent::Disconnect),
            ConnectionState::Connecting => None,
            ConnectionState::Disconnected | ConnectionState::Error => Some(LinkIntent::Connect),
        }
    }
}

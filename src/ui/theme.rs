//! Palette and styling for the command console

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

#[derive(Clone, Debug)]
pub struct Theme {
    /// Saffron accent, used for the unit and agent entries
    pub saffron: Color32,
    /// Signal green for HUD text and the grid
    pub signal: Color32,
    /// Flag green
    pub flag_green: Color32,
    pub warning: Color32,
    pub error: Color32,

    /// Map terrain
    pub bg_map: Color32,
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Human entries in the log
    pub user_accent: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::tactical()
    }
}

impl Theme {
    pub fn tactical() -> Self {
        Self {
            saffron: Color32::from_rgb(255, 153, 51),
            signal: Color32::from_rgb(74, 222, 128),
            flag_green: Color32::from_rgb(19, 136, 8),
            warning: Color32::from_rgb(234, 179, 8),
            error: Color32::from_rgb(239, 68, 68),

            bg_map: Color32::from_rgb(11, 16, 11),
            bg_primary: Color32::from_rgb(10, 12, 10),
            bg_secondary: Color32::from_rgb(18, 24, 18),
            bg_tertiary: Color32::from_rgb(45, 63, 35),

            text_primary: Color32::from_rgb(229, 231, 235),
            text_secondary: Color32::from_rgb(163, 176, 160),
            text_muted: Color32::from_rgb(107, 114, 128),

            user_accent: Color32::from_rgb(96, 165, 250),

            button_rounding: Rounding::same(2.0),
            card_rounding: Rounding::same(4.0),

            spacing: 12.0,
            spacing_lg: 20.0,
            spacing_sm: 6.0,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_map;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_muted);

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.hovered.bg_fill = self.flag_green.gamma_multiply(0.8);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.active.bg_fill = self.flag_green;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.selection.bg_fill = self.saffron.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.saffron);

        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(self.spacing, self.spacing_sm);

        // Console look: monospace everywhere
        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(20.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(13.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Monospace,
            FontId::new(13.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(14.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(11.0, FontFamily::Monospace),
        );

        ctx.set_style(style);
    }

    pub fn status_color(&self, online: bool) -> Color32 {
        if online {
            self.signal
        } else {
            self.error
        }
    }
}

//! Voice level rings

use crate::ui::theme::Theme;
use egui::{self, Sense, Stroke, Vec2};

const BASE_RADIUS: f32 = 18.0;

/// Per-ring growth at full volume
const RING_GAIN: [f32; 3] = [0.6, 1.2, 1.8];

/// Radii of the three rings. Rings stay at rest while the link is down.
pub fn ring_radii(volume: f32, active: bool) -> [f32; 3] {
    let level = if active { volume.clamp(0.0, 1.0) } else { 0.0 };
    let mut radii = [0.0; 3];
    for (i, gain) in RING_GAIN.iter().enumerate() {
        radii[i] = BASE_RADIUS * (1.0 + i as f32 * 0.35) * (1.0 + level * gain);
    }
    radii
}

pub struct Visualizer<'a> {
    volume: f32,
    active: bool,
    theme: &'a Theme,
    size: f32,
}

impl<'a> Visualizer<'a> {
    pub fn new(volume: f32, active: bool, theme: &'a Theme) -> Self {
        Self {
            volume,
            active,
            theme,
            size: 110.0,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(self.size), Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let center = rect.center();
            let color = if self.active {
                self.theme.saffron
            } else {
                self.theme.text_muted
            };

            painter.circle_filled(center, self.size / 2.0, self.theme.bg_secondary);
            for (i, radius) in ring_radii(self.volume, self.active).iter().enumerate() {
                let alpha = 1.0 - i as f32 * 0.3;
                painter.circle_stroke(
                    center,
                    radius.min(self.size / 2.0),
                    Stroke::new(2.0, color.gamma_multiply(alpha)),
                );
            }
            painter.circle_filled(center, BASE_RADIUS * 0.4, color);
        }

        let percent = if self.active {
            (self.volume.clamp(0.0, 1.0) * 100.0).round() as u32
        } else {
            0
        };
        response.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Other,
                true,
                format!("Voice level {}%", percent),
            )
        });
        response
    }
}

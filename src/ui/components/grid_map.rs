//! Tactical map: grid, trail and the unit's heading
//!
//! The camera stays centered on the origin. One world metre is
//! `PIXELS_PER_METRE` pixels, grid lines every `GRID_SPACING` metres.

use crate::robot::{TrailPoint, UnitState};
use crate::ui::theme::Theme;
use egui::{self, Align2, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};

pub const PIXELS_PER_METRE: f32 = 10.0;
const GRID_SPACING: f32 = 10.0;
const ARROW_LENGTH: f32 = 28.0;

/// Map a world point to the screen with the origin at `center`
pub fn world_to_screen(center: Pos2, point: TrailPoint) -> Pos2 {
    Pos2::new(
        center.x + point.x as f32 * PIXELS_PER_METRE,
        center.y + point.y as f32 * PIXELS_PER_METRE,
    )
}

/// Unit vector of a heading in screen space (0 = up, clockwise)
pub fn heading_vector(angle_degrees: f64) -> Vec2 {
    let rad = angle_degrees.to_radians() as f32;
    Vec2::new(rad.sin(), -rad.cos())
}

pub struct GridMap<'a> {
    unit: &'a UnitState,
    theme: &'a Theme,
}

impl<'a> GridMap<'a> {
    pub fn new(unit: &'a UnitState, theme: &'a Theme) -> Self {
        Self { unit, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, self.theme.bg_map);
            self.draw_grid(&painter, rect);
            self.draw_trail(&painter, rect.center());
            self.draw_unit(&painter, rect.center());
            self.draw_overlay(&painter, rect);
        }

        let (lat, lng) = self.unit.geo_readout();
        response.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Other,
                true,
                format!("Tactical map, unit at {} {}", lat, lng),
            )
        });
        response
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect) {
        let step = GRID_SPACING * PIXELS_PER_METRE;
        let stroke = Stroke::new(0.5, self.theme.signal.gamma_multiply(0.15));
        let center = rect.center();

        let columns = (rect.width() / 2.0 / step).ceil() as i32;
        for i in -columns..=columns {
            let x = center.x + i as f32 * step;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        }

        let rows = (rect.height() / 2.0 / step).ceil() as i32;
        for i in -rows..=rows {
            let y = center.y + i as f32 * step;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        }
    }

    fn draw_trail(&self, painter: &egui::Painter, center: Pos2) {
        if self.unit.trail.len() < 2 {
            return;
        }

        let points: Vec<Pos2> = self
            .unit
            .trail
            .iter()
            .map(|p| world_to_screen(center, *p))
            .collect();
        painter.add(Shape::line(
            points,
            Stroke::new(2.0, self.theme.saffron.gamma_multiply(0.4)),
        ));
    }

    fn draw_unit(&self, painter: &egui::Painter, center: Pos2) {
        let position = world_to_screen(
            center,
            TrailPoint {
                x: self.unit.x,
                y: self.unit.y,
            },
        );
        let heading = heading_vector(self.unit.angle);

        painter.circle_filled(position, 8.0, self.theme.bg_tertiary);
        painter.circle_stroke(position, 8.0, Stroke::new(1.5, self.theme.saffron));
        painter.arrow(position, heading * ARROW_LENGTH, Stroke::new(2.5, self.theme.saffron));
        painter.text(
            position + Vec2::new(0.0, 20.0),
            Align2::CENTER_TOP,
            "sumY",
            FontId::monospace(10.0),
            self.theme.saffron,
        );
    }

    fn draw_overlay(&self, painter: &egui::Painter, rect: Rect) {
        let anchor = rect.right_top() + Vec2::new(-12.0, 12.0);
        painter.text(
            anchor,
            Align2::RIGHT_TOP,
            "LIVE BATTLEFIELD FEED",
            FontId::monospace(11.0),
            self.theme.signal,
        );
        painter.text(
            anchor + Vec2::new(0.0, 14.0),
            Align2::RIGHT_TOP,
            "SECTOR: 7G",
            FontId::monospace(11.0),
            self.theme.signal,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_screen_scales_from_center() {
        let center = Pos2::new(100.0, 100.0);
        let p = world_to_screen(center, TrailPoint { x: 2.0, y: -3.0 });
        assert_eq!(p, Pos2::new(120.0, 70.0));
    }

    #[test]
    fn test_heading_vector() {
        let north = heading_vector(0.0);
        assert!(north.x.abs() < 1e-6 && (north.y + 1.0).abs() < 1e-6);

        let east = heading_vector(90.0);
        assert!((east.x - 1.0).abs() < 1e-6 && east.y.abs() < 1e-6);
    }
}

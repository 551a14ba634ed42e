//! Unit position and heading updates
//!
//! Heading is in degrees with 0 = north, increasing clockwise. The map's
//! vertical axis grows downward, so moving north decreases `y`.

use serde::{Deserialize, Serialize};

/// Result reported to the agent after a move
pub const MOVE_RESULT: &str = "Maneuver Complete";

/// Result reported to the agent after a turn
pub const TURN_RESULT: &str = "Bearing Adjusted";

/// A past position of the unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
}

/// Position, heading and trail of the controlled unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, always in [0, 360)
    pub angle: f64,
    /// Append-only history; the last point is the current position after a move
    pub trail: Vec<TrailPoint>,
}

impl Default for UnitState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            trail: vec![TrailPoint { x: 0.0, y: 0.0 }],
        }
    }
}

impl UnitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// HUD coordinate readout as `(latitude, longitude)` strings
    pub fn geo_readout(&self) -> (String, String) {
        (
            format!("{:.6}", 34.0 + self.y / 1000.0),
            format!("{:.6}", 74.0 + self.x / 1000.0),
        )
    }
}

/// Quarter-turn direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Case-insensitive parse. Anything other than "right" turns left.
    pub fn parse(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("right") {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    /// Whether the token literally names a direction
    pub fn is_recognized(token: &str) -> bool {
        let token = token.trim();
        token.eq_ignore_ascii_case("right") || token.eq_ignore_ascii_case("left")
    }

    pub fn degrees(self) -> f64 {
        match self {
            TurnDirection::Left => -90.0,
            TurnDirection::Right => 90.0,
        }
    }
}

/// Advance the unit along its heading and record the new position.
///
/// Negative distances move backwards; zero appends a duplicate trail point.
pub fn move_forward(state: &mut UnitState, distance: f64) -> &'static str {
    let rad = state.angle.to_radians();

    let dx = rad.sin() * distance;
    let dy = -rad.cos() * distance;

    state.x += dx;
    state.y += dy;
    state.trail.push(TrailPoint {
        x: state.x,
        y: state.y,
    });

    MOVE_RESULT
}

/// Rotate the unit by a quarter turn.
pub fn turn(state: &mut UnitState, direction: &str) -> &'static str {
    let delta = TurnDirection::parse(direction).degrees();
    state.angle = normalize_angle(state.angle + delta);
    TURN_RESULT
}

/// Normalize an angle into [0, 360)
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_state() {
        let state = UnitState::default();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.angle, 0.0);
        assert_eq!(state.trail, vec![TrailPoint { x: 0.0, y: 0.0 }]);
    }

    #[test]
    fn test_move_north() {
        let mut state = UnitState::default();
        let result = move_forward(&mut state, 10.0);

        assert_eq!(result, MOVE_RESULT);
        assert!(state.x.abs() < EPS);
        assert!((state.y + 10.0).abs() < EPS);
        assert_eq!(state.trail.len(), 2);
    }

    #[test]
    fn test_move_matches_formula_for_many_headings() {
        for heading in [0.0, 30.0, 45.0, 90.0, 135.0, 180.0, 270.0, 359.5] {
            for distance in [-7.5, 0.0, 1.0, 12.25] {
                let mut state = UnitState {
                    x: 3.0,
                    y: -4.0,
                    angle: heading,
                    trail: vec![TrailPoint { x: 3.0, y: -4.0 }],
                };
                let before = state.trail.len();

                move_forward(&mut state, distance);

                let rad = heading * std::f64::consts::PI / 180.0;
                let expected_x = 3.0 + distance * rad.sin();
                let expected_y = -4.0 - distance * rad.cos();
                assert!((state.x - expected_x).abs() < EPS);
                assert!((state.y - expected_y).abs() < EPS);
                assert_eq!(state.trail.len(), before + 1);

                let last = state.trail.last().copied().unwrap();
                assert_eq!(last, TrailPoint { x: state.x, y: state.y });
            }
        }
    }

    #[test]
    fn test_zero_move_appends_duplicate() {
        let mut state = UnitState::default();
        move_forward(&mut state, 0.0);
        assert_eq!(state.trail.len(), 2);
        assert_eq!(state.trail[0], state.trail[1]);
    }

    #[test]
    fn test_turn_right_and_left() {
        let mut state = UnitState::default();
        assert_eq!(turn(&mut state, "right"), TURN_RESULT);
        assert_eq!(state.angle, 90.0);

        turn(&mut state, "LEFT");
        assert_eq!(state.angle, 0.0);

        turn(&mut state, "left");
        assert_eq!(state.angle, 270.0);
    }

    #[test]
    fn test_four_turns_return_to_start() {
        for start in [0.0, 15.0, 90.0, 271.5] {
            let mut state = UnitState {
                angle: start,
                ..UnitState::default()
            };
            for _ in 0..4 {
                turn(&mut state, "right");
            }
            assert!((state.angle - start).abs() < EPS);

            for _ in 0..4 {
                turn(&mut state, "left");
            }
            assert!((state.angle - start).abs() < EPS);
        }
    }

    #[test]
    fn test_unknown_direction_turns_left() {
        let mut state = UnitState::default();
        turn(&mut state, "rihgt");
        assert_eq!(state.angle, 270.0);
        assert!(!TurnDirection::is_recognized("rihgt"));
        assert!(TurnDirection::is_recognized(" Right "));
    }

    #[test]
    fn test_turn_does_not_move() {
        let mut state = UnitState::default();
        turn(&mut state, "right");
        assert_eq!(state.trail.len(), 1);
        assert_eq!((state.x, state.y), (0.0, 0.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(450.0), 90.0);
        assert!(normalize_angle(-1e-20) < 360.0);
    }

    #[test]
    fn test_geo_readout() {
        let mut state = UnitState::default();
        move_forward(&mut state, 10.0);
        let (lat, lng) = state.geo_readout();
        assert_eq!(lat, "33.990000");
        assert_eq!(lng, "74.000000");
    }
}

pub mod geometry;

pub use geometry::{move_forward, turn, TrailPoint, TurnDirection, UnitState, MOVE_RESULT, TURN_RESULT};

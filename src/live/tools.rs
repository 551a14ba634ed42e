//! Tool declarations offered to the agent and parsing of its calls

use crate::live::protocol::FunctionCall;
use serde::Serialize;
use serde_json::{json, Value};

pub const MOVE_TOOL: &str = "moveRobot";
pub const TURN_TOOL: &str = "turnRobot";

/// Result returned for tools this client does not know
pub const DEFAULT_TOOL_RESULT: &str = "OK";

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// The forward-move and quarter-turn capabilities
pub fn declarations() -> Vec<Tool> {
    vec![Tool {
        function_declarations: vec![
            FunctionDeclaration {
                name: MOVE_TOOL.to_string(),
                description: "Move the tactical unit forward by a specific number of metres. \
                              Use this when asked to advance, patrol, or move."
                    .to_string(),
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "steps": {
                            "type": "NUMBER",
                            "description": "The distance in metres."
                        }
                    },
                    "required": ["steps"]
                }),
            },
            FunctionDeclaration {
                name: TURN_TOOL.to_string(),
                description: "Turn the tactical unit 90 degrees to the left or right.".to_string(),
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "direction": {
                            "type": "STRING",
                            "description": "The direction to turn. Must be either \"left\" or \"right\"."
                        }
                    },
                    "required": ["direction"]
                }),
            },
        ],
    }]
}

/// A tool call mapped onto a local command
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCommand {
    /// `steps` is `None` when the argument was missing or not numeric
    Move { steps: Option<f64> },
    Turn { direction: String },
    Unknown { name: String },
}

impl ToolCommand {
    pub fn from_call(call: &FunctionCall) -> Self {
        match call.name.as_str() {
            MOVE_TOOL => ToolCommand::Move {
                steps: call.args.get("steps").and_then(number_arg),
            },
            TURN_TOOL => ToolCommand::Turn {
                direction: call
                    .args
                    .get("direction")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => ToolCommand::Unknown {
                name: other.to_string(),
            },
        }
    }
}

/// Accept JSON numbers and numeric strings
fn number_arg(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

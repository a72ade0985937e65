//! Action types and action spaces

use serde::{Deserialize, Serialize};

/// An action sent by the controlling agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    /// Discrete action code
    Discrete(i64),
    /// Raw scalar policy output, floored to a code
    Scalar(f64),
    /// Action vector; only the first element is read
    Continuous(Vec<f64>),
    /// Named action with a Type field, e.g. `{"Type": "Left"}`
    Named {
        #[serde(rename = "Type")]
        action_type: String,
    },
}

/// Locomotion intent reachable from the agent path
///
/// Jump and slide are deliberately absent: only manual input drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LaneAction {
    Left,
    Right,
    Stay,
}

impl LaneAction {
    /// Map a discrete action code: 0 moves left, 1 moves right, anything else stays
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => LaneAction::Left,
            1 => LaneAction::Right,
            _ => LaneAction::Stay,
        }
    }
}

impl Action {
    /// Discrete code carried by this action, if any
    pub fn code(&self) -> Option<i64> {
        match self {
            Action::Discrete(code) => Some(*code),
            Action::Scalar(value) => floor_code(*value),
            Action::Continuous(values) => values.first().copied().and_then(floor_code),
            Action::Named { action_type } => match action_type.to_ascii_lowercase().as_str() {
                "left" => Some(0),
                "right" => Some(1),
                _ => None,
            },
        }
    }

    /// Resolve to a lane intent
    pub fn lane_action(&self) -> LaneAction {
        self.code().map_or(LaneAction::Stay, LaneAction::from_code)
    }
}

fn floor_code(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.floor() as i64)
}

/// Description of an action space
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "PascalCase")]
pub enum ActionSpace {
    /// Discrete action space
    Discrete {
        /// Number of discrete actions
        n: usize,
        /// Optional action names
        #[serde(skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
    /// Continuous action space (Box)
    Continuous {
        /// Action vector shape
        shape: Vec<usize>,
        /// Lower bounds
        low: Vec<f64>,
        /// Upper bounds
        high: Vec<f64>,
    },
}

impl ActionSpace {
    /// The lane-changing space exposed to agents
    pub fn lanes() -> Self {
        ActionSpace::Discrete {
            n: 3,
            names: Some(vec!["Left".into(), "Right".into(), "Stay".into()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_map_to_lanes() {
        assert_eq!(Action::Discrete(0).lane_action(), LaneAction::Left);
        assert_eq!(Action::Discrete(1).lane_action(), LaneAction::Right);
        assert_eq!(Action::Discrete(2).lane_action(), LaneAction::Stay);
        assert_eq!(Action::Discrete(-1).lane_action(), LaneAction::Stay);
    }

    #[test]
    fn test_scalar_action_is_floored() {
        assert_eq!(Action::Scalar(1.9).lane_action(), LaneAction::Right);
        assert_eq!(Action::Scalar(0.2).lane_action(), LaneAction::Left);
        assert_eq!(Action::Scalar(-0.5).lane_action(), LaneAction::Stay);
        assert_eq!(Action::Scalar(f64::NAN).lane_action(), LaneAction::Stay);
        assert_eq!(Action::Continuous(vec![]).lane_action(), LaneAction::Stay);
    }

    #[test]
    fn test_action_from_json() {
        let action: Action = serde_json::from_str("1").unwrap();
        assert_eq!(action, Action::Discrete(1));

        let action: Action = serde_json::from_str("0.75").unwrap();
        assert_eq!(action.lane_action(), LaneAction::Left);

        let action: Action = serde_json::from_str("[1.2, 5.0]").unwrap();
        assert_eq!(action.lane_action(), LaneAction::Right);

        let action: Action = serde_json::from_str(r#"{"Type": "Right"}"#).unwrap();
        assert_eq!(action.lane_action(), LaneAction::Right);

        let action: Action = serde_json::from_str(r#"{"Type": "Jump"}"#).unwrap();
        assert_eq!(action.lane_action(), LaneAction::Stay);
    }
}

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parses an administrative single-shot token. Accepts any casing of
    /// UP/DOWN/LEFT/RIGHT; everything else is rejected.
    pub fn parse_token(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One directional input event. More than one flag may be set by a sloppy
/// client; resolution priority is up > down > left > right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionIntent {
    pub fn resolve(self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    pub fn from_direction(dir: Direction) -> Self {
        let mut intent = Self::default();
        match dir {
            Direction::Up => intent.up = true,
            Direction::Down => intent.down = true,
            Direction::Left => intent.left = true,
            Direction::Right => intent.right = true,
        }
        intent
    }
}

/// Where a directional event came from. Bridge variants always drive
/// player 1; the engine itself never inspects the variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    NetworkPlayer,
    HardwareBridge,
    SimulatedBridge,
}

impl InputSource {
    pub fn is_bridge(self) -> bool {
        matches!(self, Self::HardwareBridge | Self::SimulatedBridge)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub score: i32,
    pub lives: i32,
    pub invulnerable: bool,
    #[serde(rename = "invulnerableUntilMs")]
    pub invulnerable_until_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub role: usize,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub color: String,
    pub vulnerable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    #[serde(rename = "powerActive")]
    pub power_active: bool,
    #[serde(rename = "powerUntilMs")]
    pub power_until_ms: u64,
    pub players: Vec<PlayerView>,
    pub ghosts: Vec<GhostView>,
    pub dots: Vec<(i32, i32)>,
    pub pellets: Vec<(i32, i32)>,
    pub ended: bool,
    pub winner: Option<String>,
}

/// Display names handed to a fresh session. Empty or whitespace-only names
/// fall back to positional defaults inside the engine.
#[derive(Clone, Debug, Default)]
pub struct StartNames {
    pub player1: Option<String>,
    pub player2: Option<String>,
}

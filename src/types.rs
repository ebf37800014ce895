use crate::config::RulesConfig;
use crate::game::RunState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================== Enums ====================
// String values are what the page side sends and expects, keep them stable.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ready,
    Playing,
    Paused,
    Ended,
}

impl From<RunState> for GameStatus {
    fn from(state: RunState) -> Self {
        match state {
            RunState { running: false, .. } => GameStatus::Ended,
            RunState { paused: true, .. } => GameStatus::Paused,
            _ => GameStatus::Playing,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Mouse,
    Keyboard,
    Touch,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Sfx,
    Music,
    Voice,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Player,
    Enemy,
    Projectile,
    Pickup,
    Environment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    GameStart,
    GameEnd,
    ScoreUpdate,
    LevelComplete,
    PlayerHit,
    ObjectCollision,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

// ==================== Data ====================

#[derive(Debug, Copy, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

/// World-space extent of an object, unlike `engine::Size` which is pixels
#[derive(Debug, Copy, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub status: GameStatus,
}

impl GameState {
    pub fn new(rules: &RulesConfig) -> Self {
        GameState {
            score: rules.initial_score,
            lives: rules.max_lives,
            level: 1,
            status: GameStatus::Ready,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameObject {
    pub id: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Dimensions>,
    pub active: bool,
}

/// Action posted from the page UI layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

use crate::browser;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ==================== Game Config ====================
// Every section is `#[serde(default)]`, so a partial JSON file only needs the
// fields it overrides:
//   { "canvas": { "defaultWidth": 1024 }, "loop": { "title": "hi" } }

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub canvas: CanvasConfig,
    pub game: RulesConfig,
    pub ui: UiConfig,
    pub colors: Colors,
    #[serde(rename = "loop")]
    pub loop_config: LoopConfig,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Could not parse game config")
    }

    /// Fetches and parses a JSON config served next to the wasm bundle
    pub async fn fetch(path: &str) -> Result<Self> {
        browser::fetch_json::<GameConfig>(path)
            .await
            .with_context(|| format!("Failed to load game config from : {}", path))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub default_width: u32,
    pub default_height: u32,
    pub fps: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            default_width: 800,
            default_height: 600,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
    pub initial_score: u32,
    pub score_increment: u32,
    pub max_lives: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            initial_score: 0,
            score_increment: 10,
            max_lives: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub animation_duration_ms: u32,
    pub z_index: ZIndex,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            animation_duration_ms: 300,
            z_index: ZIndex::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZIndex {
    pub canvas: i32,
    pub ui_overlay: i32,
    pub modal: i32,
}

impl Default for ZIndex {
    fn default() -> Self {
        ZIndex {
            canvas: 1,
            ui_overlay: 10,
            modal: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub danger: String,
    pub warning: String,
    pub success: String,
    pub background: String,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            primary: "#4CAF50".into(),
            secondary: "#2196F3".into(),
            danger: "#f44336".into(),
            warning: "#ff9800".into(),
            success: "#4CAF50".into(),
            background: "#242424".into(),
        }
    }
}

/// Everything the loop manager draws or reacts to that isn't game logic
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoopConfig {
    pub clear_color: String,
    pub title: String,
    pub title_font: String,
    pub title_color: String,
    pub subtitle: String,
    pub subtitle_font: String,
    pub subtitle_color: String,
    /// vertical gap between title and subtitle baselines
    pub subtitle_offset: f64,
    /// `KeyboardEvent.key` values that toggle pause
    pub pause_keys: Vec<String>,
    pub max_frame_delta_ms: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            clear_color: "#1a1a1a".into(),
            title: "canvas ready".into(),
            title_font: "24px Arial".into(),
            title_color: "rgba(255, 255, 255, 0.8)".into(),
            subtitle: "click or press a key to begin".into(),
            subtitle_font: "16px Arial".into(),
            subtitle_color: "rgba(255, 255, 255, 0.6)".into(),
            subtitle_offset: 40.0,
            pause_keys: vec![" ".into(), "Escape".into()],
            max_frame_delta_ms: 250.0,
        }
    }
}

impl LoopConfig {
    pub fn is_pause_key(&self, key: &str) -> bool {
        self.pause_keys.iter().any(|pause| pause == key)
    }
}

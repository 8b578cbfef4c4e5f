use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Viewport transform and per-node position snapshot carried across runs.
/// Every field has a fallback so a partial or stale file still mounts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
    pub node_positions: HashMap<String, (f32, f32)>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 0.8,
            node_positions: HashMap::new(),
        }
    }
}

pub fn default_view_state_path(world_path: &Path) -> PathBuf {
    world_path.with_extension("view.json")
}

/// Any failure here (missing file, bad JSON) falls back to defaults; a broken
/// snapshot must never prevent the graph from mounting.
pub fn load_view_state(path: &Path) -> ViewState {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn save_view_state(path: &Path, state: &ViewState) -> Result<()> {
    let raw = serde_json::to_string_pretty(state).context("failed to serialize view state")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write view state {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_documented_defaults() {
        let state: ViewState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.pan_x, 0.0);
        assert_eq!(state.pan_y, 0.0);
        assert_eq!(state.zoom, 0.8);
        assert!(state.node_positions.is_empty());
    }

    #[test]
    fn partial_snapshot_keeps_remaining_defaults() {
        let state: ViewState = serde_json::from_str(r#"{"zoom": 1.5}"#).unwrap();
        assert_eq!(state.zoom, 1.5);
        assert_eq!(state.pan_x, 0.0);
        assert!(state.node_positions.is_empty());
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let state = load_view_state(Path::new("/nonexistent/loreweave.view.json"));
        assert_eq!(state.zoom, 0.8);

        let dir = std::env::temp_dir().join("loreweave-view-state-test");
        fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.view.json");
        fs::write(&broken, "not json at all").unwrap();
        let state = load_view_state(&broken);
        assert_eq!(state.zoom, 0.8);
        assert!(state.node_positions.is_empty());
    }

    #[test]
    fn snapshot_round_trips_transform_and_positions() {
        let dir = std::env::temp_dir().join("loreweave-view-state-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.view.json");

        let mut state = ViewState {
            pan_x: 42.0,
            pan_y: -17.5,
            zoom: 1.25,
            node_positions: HashMap::new(),
        };
        state.node_positions.insert("aria".into(), (120.0, -64.0));
        state.node_positions.insert("ravenhold".into(), (-3.0, 9.5));

        save_view_state(&path, &state).unwrap();
        let restored = load_view_state(&path);
        assert_eq!(restored.pan_x, 42.0);
        assert_eq!(restored.pan_y, -17.5);
        assert_eq!(restored.zoom, 1.25);
        assert_eq!(restored.node_positions, state.node_positions);
    }

    #[test]
    fn view_state_path_sits_beside_the_world_file() {
        let path = default_view_state_path(Path::new("/vault/world.json"));
        assert_eq!(path, PathBuf::from("/vault/world.view.json"));
    }
}

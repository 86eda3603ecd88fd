use crate::palette::Palette;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Nominal box registered with the rank assignment; real sizes are
    /// only known after render and handled by collision resolution.
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between depth columns on the primary axis.
    pub horizontal_gap: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 172.0,
            node_height: 36.0,
            horizontal_gap: 150.0,
            node_spacing: 50.0,
            rank_spacing: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    pub max_iterations: usize,
    /// Overlap ratio (intersection over smaller box) above which a
    /// pair counts as colliding.
    pub overlap_threshold: f32,
    /// Extra separation applied beyond the threshold when displacing.
    pub margin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            overlap_threshold: 0.5,
            margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Quiet period after the last edit before compilation fires.
    pub debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub layout: LayoutConfig,
    pub collision: CollisionConfig,
    pub palette: Palette,
    pub session: SessionConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutFile>,
    collision: Option<CollisionFile>,
    palette: Option<Palette>,
    debounce_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    horizontal_gap: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollisionFile {
    max_iterations: Option<usize>,
    overlap_threshold: Option<f32>,
    margin: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<GraphConfig> {
    let mut config = GraphConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.horizontal_gap {
            config.layout.horizontal_gap = v;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
    }
    if let Some(collision) = parsed.collision {
        if let Some(v) = collision.max_iterations {
            config.collision.max_iterations = v;
        }
        if let Some(v) = collision.overlap_threshold {
            config.collision.overlap_threshold = v;
        }
        if let Some(v) = collision.margin {
            config.collision.margin = v;
        }
    }
    if let Some(palette) = parsed.palette {
        config.palette = palette;
    }
    if let Some(v) = parsed.debounce_ms {
        config.session.debounce_ms = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_renderer_constants() {
        let config = GraphConfig::default();
        assert_eq!(config.layout.node_width, 172.0);
        assert_eq!(config.layout.node_height, 36.0);
        assert_eq!(config.layout.horizontal_gap, 150.0);
        assert_eq!(config.collision.max_iterations, 500);
        assert_eq!(config.collision.overlap_threshold, 0.5);
        assert_eq!(config.collision.margin, 20.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, GraphConfig::default());
    }
}

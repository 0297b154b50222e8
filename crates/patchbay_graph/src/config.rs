// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Capacity limits, camera bounds, grid settings and default node geometry.
//! Stored as RON; every field has a default so partial files load.

use crate::camera::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::graph::{GraphError, GraphLimits};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "patchbay.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Values parsed but make no sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Graph does not fit the configured limits
    #[error("Graph does not fit the configuration: {0}")]
    Graph(#[from] GraphError),
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of nodes
    pub max_nodes: usize,
    /// Maximum number of connections
    pub max_connections: usize,
    /// Lower zoom bound
    pub min_zoom: f32,
    /// Upper zoom bound
    pub max_zoom: f32,
    /// Zoom multiplier per scroll notch
    pub zoom_step: f32,
    /// Grid pitch in world units
    pub grid_pitch: f32,
    /// Snap dragged and created nodes to the grid
    pub snap_to_grid: bool,
    /// Draw the background grid
    pub show_grid: bool,
    /// Size of newly created nodes
    pub default_node_size: [f32; 2],
    /// Title bar height
    pub header_height: f32,
    /// Port hit and draw radius in world units
    pub port_radius: f32,
    /// Input ports on newly created nodes
    pub default_inputs: usize,
    /// Output ports on newly created nodes
    pub default_outputs: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let limits = GraphLimits::default();
        Self {
            max_nodes: limits.max_nodes,
            max_connections: limits.max_connections,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: 1.1,
            grid_pitch: 20.0,
            snap_to_grid: false,
            show_grid: true,
            default_node_size: [100.0, 100.0],
            header_height: 20.0,
            port_radius: 6.0,
            default_inputs: 1,
            default_outputs: 1,
        }
    }
}

impl EditorConfig {
    /// Capacity limits for the graph
    pub fn limits(&self) -> GraphLimits {
        GraphLimits {
            max_nodes: self.max_nodes,
            max_connections: self.max_connections,
        }
    }

    /// Reject values the editor cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..={} is empty or not positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoom_step must be positive".into()));
        }
        if self.grid_pitch.is_nan() || self.grid_pitch <= 0.0 {
            return Err(ConfigError::Invalid("grid_pitch must be positive".into()));
        }
        let [width, height] = self.default_node_size;
        if width <= 0.0 || height <= self.header_height || self.header_height < 0.0 {
            return Err(ConfigError::Invalid(
                "default_node_size must be positive and taller than header_height".into(),
            ));
        }
        if self.port_radius.is_nan() || self.port_radius <= 0.0 {
            return Err(ConfigError::Invalid("port_radius must be positive".into()));
        }
        Ok(())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format and validate
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Load configuration from a file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EditorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.grid_pitch, 20.0);
        assert!(!config.snap_to_grid);
    }

    #[test]
    fn test_serialization() {
        let config = EditorConfig {
            snap_to_grid: true,
            max_nodes: 10,
            ..EditorConfig::default()
        };
        let ron_str = config.to_ron().unwrap();
        let loaded = EditorConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = EditorConfig::from_ron("(grid_pitch: 25.0, snap_to_grid: true)").unwrap();
        assert_eq!(loaded.grid_pitch, 25.0);
        assert!(loaded.snap_to_grid);
        assert_eq!(loaded.max_nodes, EditorConfig::default().max_nodes);
    }

    #[test]
    fn test_invalid_zoom_range_rejected() {
        let result = EditorConfig::from_ron("(min_zoom: 2.0, max_zoom: 1.0)");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_pitch_rejected() {
        for grid_pitch in [0.0, -20.0, f32::NAN] {
            let config = EditorConfig {
                grid_pitch,
                ..EditorConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!(
            "patchbay-missing-{}.ron",
            uuid::Uuid::new_v4()
        ));
        let config = EditorConfig::load_or_default(&path).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "patchbay-config-{}.ron",
            uuid::Uuid::new_v4()
        ));
        let config = EditorConfig {
            port_radius: 8.0,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = EditorConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

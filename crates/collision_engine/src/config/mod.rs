//! Configuration system
//!
//! Collision settings can be loaded from TOML or RON files; the format is
//! chosen by file extension.

pub use serde::{Serialize, Deserialize};
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Depth used by [`Mesh::accelerate`](crate::physics::collision::Mesh::accelerate)
pub const DEFAULT_BVH_DEPTH: u32 = 3;

/// Tuning for mesh acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Requested octree depth (number of subdivision levels below the root)
    pub bvh_depth: u32,

    /// Upper bound on `bvh_depth`; the node count grows as `8^depth`
    pub max_bvh_depth: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            bvh_depth: DEFAULT_BVH_DEPTH,
            max_bvh_depth: 6,
        }
    }
}

impl CollisionConfig {
    /// Create a config with the given octree depth
    pub fn with_bvh_depth(mut self, depth: u32) -> Self {
        self.bvh_depth = depth;
        self
    }

    /// Octree depth actually used for construction
    pub fn effective_depth(&self) -> u32 {
        if self.bvh_depth > self.max_bvh_depth {
            log::warn!(
                "bvh_depth {} exceeds max_bvh_depth {}, clamping",
                self.bvh_depth,
                self.max_bvh_depth
            );
            return self.max_bvh_depth;
        }
        self.bvh_depth
    }
}

impl Config for CollisionConfig {}

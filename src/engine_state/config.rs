//! # Engine Configuration
//!
//! Startup configuration for the terrain engine. The configuration is a plain
//! value passed into `World`, `ChunkBuilder` and the terrain factory; nothing
//! reads it through global state.
//!
//! Configurations are loaded from JSON. Every field has a default, so a file
//! only needs to name what it changes:
//!
//! ```json
//! { "view_range": 4, "cache_range": 5, "cache_extra_chunks": true, "terrain": "mountainous" }
//! ```
//!
//! Validation runs once, before anything else is built. A failed validation is
//! a programmer or deployment error and aborts startup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::chunk::ChunkDimensions;

/// Errors raised while loading or validating an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A chunk dimension was zero.
    #[error("chunk {axis} must be non-zero")]
    ZeroChunkDimension {
        /// Which dimension was zero
        axis: &'static str,
    },

    /// The rendered radius is larger than the resident radius.
    #[error("view range {view_range} exceeds cache range {cache_range}")]
    ViewRangeExceedsCacheRange {
        /// Configured view range
        view_range: u32,
        /// Configured cache range
        cache_range: u32,
    },

    /// `cache_extra_chunks` disagrees with the two ranges.
    #[error(
        "cache_extra_chunks is {cache_extra_chunks} but view range is {view_range} and cache range is {cache_range}"
    )]
    InconsistentCacheExtraChunks {
        /// Configured view range
        view_range: u32,
        /// Configured cache range
        cache_range: u32,
        /// Configured flag
        cache_extra_chunks: bool,
    },

    /// The tasked build strategy was given an empty worker pool.
    #[error("tasked build strategy needs at least one worker")]
    NoWorkers,

    /// The configuration file was not valid JSON for `EngineConfig`.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Which terrain generator fills new chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Flat rock and dirt layers, for debugging and tests
    Flat,
    /// Rolling hills
    Standard,
    /// Tall, steep peaks
    Mountainous,
    /// Low, wide valleys with a thick soil layer
    Valley,
}

/// How the chunk builder drains its work queues.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    /// The builder thread drains every discovered item itself, one at a time.
    Queued,
    /// Every discovered item becomes a task on a worker pool.
    Tasked {
        /// Number of pool threads
        workers: usize,
    },
}

/// The complete startup configuration of the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of every chunk in blocks
    pub chunk: ChunkDimensions,
    /// Radius, in chunks, of the rendered window around the observer
    pub view_range: u32,
    /// Radius, in chunks, of the resident window around the observer
    pub cache_range: u32,
    /// Must be `true` exactly when `cache_range > view_range`
    pub cache_extra_chunks: bool,
    /// Whether the resident window follows the observer
    pub infinite_world: bool,
    /// Terrain seed. `None` draws a random seed at startup.
    pub seed: Option<u32>,
    /// Terrain generator used for new chunks
    pub terrain: TerrainKind,
    /// How queued work is drained
    pub build_strategy: BuildStrategy,
    /// How long the builder thread sleeps between ticks
    pub worker_idle_millis: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            chunk: ChunkDimensions::default(),
            view_range: 3,
            cache_range: 3,
            cache_extra_chunks: false,
            infinite_world: true,
            seed: None,
            terrain: TerrainKind::Standard,
            build_strategy: BuildStrategy::Queued,
            worker_idle_millis: 10,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks the invariants every other component relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [
            ("width", self.chunk.width),
            ("height", self.chunk.height),
            ("length", self.chunk.length),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroChunkDimension { axis });
            }
        }

        if self.view_range > self.cache_range {
            return Err(ConfigError::ViewRangeExceedsCacheRange {
                view_range: self.view_range,
                cache_range: self.cache_range,
            });
        }

        if self.cache_extra_chunks != (self.cache_range > self.view_range) {
            return Err(ConfigError::InconsistentCacheExtraChunks {
                view_range: self.view_range,
                cache_range: self.cache_range,
                cache_extra_chunks: self.cache_extra_chunks,
            });
        }

        if let BuildStrategy::Tasked { workers: 0 } = self.build_strategy {
            return Err(ConfigError::NoWorkers);
        }

        Ok(())
    }

    /// Radius, in chunks, of the resident window.
    pub fn resident_radius(&self) -> i32 {
        self.cache_range as i32
    }

    /// Number of chunks resident at any time.
    pub fn resident_chunk_count(&self) -> usize {
        let side = 2 * self.cache_range as usize + 1;
        side * side
    }

    /// The configured seed, or a freshly drawn one.
    pub fn seed_or_random(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resident_chunk_count(), 49);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "view_range": 2, "cache_range": 4, "cache_extra_chunks": true, "terrain": "valley" }"#,
        )
        .unwrap();
        assert_eq!(config.view_range, 2);
        assert_eq!(config.terrain, TerrainKind::Valley);
        assert_eq!(config.chunk, ChunkDimensions::default());
        assert_eq!(config.resident_radius(), 4);
    }

    #[test]
    fn tasked_strategy_parses() {
        let config =
            EngineConfig::from_json_str(r#"{ "build_strategy": { "tasked": { "workers": 3 } } }"#)
                .unwrap();
        assert_eq!(config.build_strategy, BuildStrategy::Tasked { workers: 3 });
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut config = EngineConfig::default();
        config.chunk.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroChunkDimension { axis: "height" })
        ));
    }

    #[test]
    fn view_range_must_fit_in_cache_range() {
        let mut config = EngineConfig::default();
        config.view_range = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ViewRangeExceedsCacheRange { .. })
        ));
    }

    #[test]
    fn extra_chunks_flag_must_match_ranges() {
        let mut config = EngineConfig::default();
        config.cache_extra_chunks = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InconsistentCacheExtraChunks { .. })
        ));

        config.cache_extra_chunks = false;
        config.cache_range = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_worker_pool_is_rejected() {
        let result = EngineConfig::from_json_str(r#"{ "build_strategy": { "tasked": { "workers": 0 } } }"#);
        assert!(matches!(result, Err(ConfigError::NoWorkers)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ view_range: "),
            Err(ConfigError::Parse(_))
        ));
    }
}

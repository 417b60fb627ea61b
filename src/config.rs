use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toroid_blocks::AtlasLayout;
use toroid_runtime::RuntimeConfig;
use toroid_world::WindowDims;

use crate::raycast::TraceParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("window.{0} must be positive")]
    ZeroDimension(&'static str),
    #[error("window.height {0} exceeds {max}", max = u16::MAX)]
    HeightTooLarge(usize),
    #[error("trace.epsilon {0} must be in [0, 0.5)")]
    Epsilon(f32),
    #[error("atlas.tiles_per_row must be positive")]
    ZeroTilesPerRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub task_budget_ms: u64,
    pub poll_interval_ms: u64,
    pub stop_timeout_ms: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        let d = RuntimeConfig::default();
        Self {
            task_budget_ms: d.task_budget.as_millis() as u64,
            poll_interval_ms: d.poll_interval.as_millis() as u64,
            stop_timeout_ms: d.stop_timeout.as_millis() as u64,
        }
    }
}

impl From<RuntimeSection> for RuntimeConfig {
    fn from(s: RuntimeSection) -> Self {
        RuntimeConfig {
            task_budget: Duration::from_millis(s.task_budget_ms),
            poll_interval: Duration::from_millis(s.poll_interval_ms),
            stop_timeout: Duration::from_millis(s.stop_timeout_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasSection {
    pub tiles_per_row: u16,
    pub inset: f32,
}

impl Default for AtlasSection {
    fn default() -> Self {
        let d = AtlasLayout::default();
        Self {
            tiles_per_row: d.tiles_per_row,
            inset: d.inset,
        }
    }
}

impl From<AtlasSection> for AtlasLayout {
    fn from(s: AtlasSection) -> Self {
        AtlasLayout {
            tiles_per_row: s.tiles_per_row,
            inset: s.inset,
        }
    }
}

/// Engine settings, usually loaded from a TOML file. Every section and field is optional.
///
/// ```toml
/// [window]
/// chunk_size = 16
/// chunks_per_side = 8
/// height = 128
///
/// [runtime]
/// task_budget_ms = 8
///
/// [trace]
/// max_steps = 256
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowDims,
    pub runtime: RuntimeSection,
    pub trace: TraceConfig,
    pub atlas: AtlasSection,
}

/// Trace limits; `max_height` defaults to the window height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub max_steps: Option<usize>,
    pub max_height: Option<i32>,
    pub epsilon: Option<f32>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.window;
        if w.chunk_size == 0 {
            return Err(ConfigError::ZeroDimension("chunk_size"));
        }
        if w.chunks_per_side == 0 {
            return Err(ConfigError::ZeroDimension("chunks_per_side"));
        }
        if w.height == 0 {
            return Err(ConfigError::ZeroDimension("height"));
        }
        if w.height > u16::MAX as usize {
            return Err(ConfigError::HeightTooLarge(w.height));
        }
        let eps = self.trace_params().epsilon;
        if !(0.0..0.5).contains(&eps) {
            return Err(ConfigError::Epsilon(eps));
        }
        if self.atlas.tiles_per_row == 0 {
            return Err(ConfigError::ZeroTilesPerRow);
        }
        Ok(())
    }

    pub fn trace_params(&self) -> TraceParams {
        let d = TraceParams::default();
        TraceParams {
            max_steps: self.trace.max_steps.unwrap_or(d.max_steps),
            max_height: self.trace.max_height.unwrap_or(self.window.height as i32),
            epsilon: self.trace.epsilon.unwrap_or(d.epsilon),
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        self.runtime.into()
    }

    pub fn atlas_layout(&self) -> AtlasLayout {
        self.atlas.into()
    }
}

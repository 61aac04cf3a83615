use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors raised while locating or parsing `config.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("render.palette must contain at least one color")]
    EmptyPalette,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensumConfig {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Accept upstream levels when they pass the consistency check.
    #[serde(default = "default_true")]
    pub trust_precomputed: bool,
    /// Pull corequisites of prerequisites into a closure.
    #[serde(default = "default_true")]
    pub include_prerequisite_corequisites: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            trust_precomputed: default_true(),
            include_prerequisite_corequisites: default_true(),
        }
    }
}

/// Diagram orientation handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Up-to-down hierarchy.
    #[default]
    Tree,
    /// Left-to-right hierarchy.
    Horizontal,
}

impl ViewMode {
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::Tree => "UD",
            Self::Horizontal => "LR",
        }
    }

    #[must_use]
    pub const fn level_separation(self) -> u32 {
        match self {
            Self::Tree => 120,
            Self::Horizontal => 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Level colors; levels past the end reuse the last color.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_target_color")]
    pub target_color: String,
    #[serde(default)]
    pub view: ViewMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            target_color: default_target_color(),
            view: ViewMode::default(),
        }
    }
}

impl RenderConfig {
    /// Palette slot for a level: `min(level, len - 1)`.
    #[must_use]
    pub fn color_index(&self, level: u32) -> usize {
        let last = self.palette.len().saturating_sub(1);
        usize::try_from(level).map_or(last, |level| level.min(last))
    }
}

impl PensumConfig {
    /// Parse a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::EmptyPalette`] if the palette is empty.
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.render.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(config)
    }
}

/// Load the project config at `<root>/.pensum/config.toml`, or defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<PensumConfig>, ConfigError> {
    load_if_exists(&project_root.join(".pensum/config.toml"))
}

/// Load `<config_dir>/pensum/config.toml` if the platform has a config dir.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<PensumConfig>, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };
    load_if_exists(&config_dir.join("pensum/config.toml"))
}

/// Resolve the effective config.
///
/// Precedence: `explicit` path (must exist), project config, user config,
/// built-in defaults.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn resolve_config(
    explicit: Option<&Path>,
    project_root: &Path,
) -> Result<PensumConfig, ConfigError> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "using explicit config");
        return PensumConfig::from_toml(path, &content);
    }

    if let Some(config) = load_project_config(project_root)? {
        return Ok(config);
    }

    Ok(load_user_config()?.unwrap_or_default())
}

fn load_if_exists(path: &Path) -> Result<Option<PensumConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    PensumConfig::from_toml(path, &content).map(Some)
}

const fn default_true() -> bool {
    true
}

fn default_palette() -> Vec<String> {
    [
        "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#d35400", "#8e44ad", "#2980b9",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_target_color() -> String {
    "#e74c3c".to_string()
}

//! Generator configuration.
//!
//! Sources, highest priority first:
//! 1. Command-line flags (applied by the binary)
//! 2. A JSON configuration file (`--config`)
//! 3. Built-in defaults

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::parser::ParseOptions;
use crate::render::preamble;

/// Output format of the generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Python module driving the library through ctypes
    #[default]
    #[value(alias = "py")]
    Python,
    /// Manifest of the binding model
    Json,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Python => "python",
            OutputFormat::Json => "json",
        }
    }
}

/// Native library the generated module loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Display name used in loader messages
    pub name: String,
    pub windows: String,
    pub linux: String,
    pub macos: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: "raylib".to_string(),
            windows: "raylib.dll".to_string(),
            linux: "libraylib.so.2.5.0".to_string(),
            macos: "libraylib.2.5.0.dylib".to_string(),
        }
    }
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Annotated header to translate
    pub header: Option<PathBuf>,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Name of the library handle in generated code
    pub handle_name: String,
    /// Macro that marks exported function declarations
    pub api_macro: String,
    pub library: LibraryConfig,
    /// Preamble template replacing the built-in loader
    pub preamble: Option<PathBuf>,
    /// List palette colors in `__all__`
    pub export_palette: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            header: None,
            output: None,
            format: OutputFormat::default(),
            handle_name: "_rl".to_string(),
            api_macro: "RLAPI".to_string(),
            library: LibraryConfig::default(),
            preamble: None,
            export_palette: false,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            api_macro: self.api_macro.clone(),
            export_palette: self.export_palette,
        }
    }

    /// The loader preamble with `${...}` placeholders expanded.
    pub fn preamble_text(&self) -> Result<String, ConfigError> {
        let template = match self.preamble {
            Some(ref path) => {
                debug!("Using preamble template {}", path.display());
                fs::read_to_string(path).map_err(|source| ConfigError::Preamble {
                    path: path.clone(),
                    source,
                })?
            }
            None => preamble::DEFAULT_TEMPLATE.to_string(),
        };
        Ok(preamble::expand(&template, &self.library, &self.handle_name))
    }
}

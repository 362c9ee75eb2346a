//! Content identifier rules
//!
//! Loaded from the `[content]` table of a TOML file. Every field has a
//! default, so an empty file (or no file) yields the stock rules:
//!
//! ```toml
//! [content]
//! delimiter = "|"
//! texture_extensions = [".png"]
//! font_extension = ".ttf"
//! audio_extensions = [".ogg", ".mp3"]
//! default_fonts = ["DejaVuSans.ttf", "DejaVuSansMono.ttf", "LiberationSans-Regular.ttf"]
//! protected_prefix = "default:"
//! ```

use flint_core::{FlintError, ResourceKind, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-kind validation rules shared by the key resolver and the caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRules {
    /// Separates the base path from the metadata parameter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_texture_extensions")]
    pub texture_extensions: Vec<String>,
    #[serde(default = "default_font_extension")]
    pub font_extension: String,
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
    /// Font file names whose atlas keys get `protected_prefix`
    #[serde(default = "default_fonts")]
    pub default_fonts: Vec<String>,
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
}

fn default_delimiter() -> char {
    '|'
}
fn default_texture_extensions() -> Vec<String> {
    vec![".png".to_string()]
}
fn default_font_extension() -> String {
    ".ttf".to_string()
}
fn default_audio_extensions() -> Vec<String> {
    vec![".ogg".to_string(), ".mp3".to_string()]
}
fn default_fonts() -> Vec<String> {
    vec![
        "DejaVuSans.ttf".to_string(),
        "DejaVuSansMono.ttf".to_string(),
        "LiberationSans-Regular.ttf".to_string(),
    ]
}
fn default_protected_prefix() -> String {
    "default:".to_string()
}

impl Default for ContentRules {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            texture_extensions: default_texture_extensions(),
            font_extension: default_font_extension(),
            audio_extensions: default_audio_extensions(),
            default_fonts: default_fonts(),
            protected_prefix: default_protected_prefix(),
        }
    }
}

/// TOML file structure
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContentRulesFile {
    #[serde(default)]
    content: ContentRules,
}

impl ContentRules {
    /// Parse rules from a TOML document with a `[content]` table
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: ContentRulesFile = toml::from_str(s)?;
        file.content.validate()?;
        Ok(file.content)
    }

    /// Load rules from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            FlintError::ConfigError(format!("Failed to load rules {}: {}", path.display(), e))
        })
    }

    /// Render as a TOML document that `from_toml_str` accepts
    pub fn to_toml_string(&self) -> Result<String> {
        let file = ContentRulesFile {
            content: self.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Reject rule sets that would make identifiers ambiguous
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_whitespace() || matches!(self.delimiter, '/' | '\\' | '.' | ':') {
            return Err(FlintError::ConfigError(format!(
                "delimiter '{}' collides with path syntax",
                self.delimiter
            )));
        }

        let all_extensions = self
            .texture_extensions
            .iter()
            .chain(&self.audio_extensions)
            .chain(std::iter::once(&self.font_extension));
        for ext in all_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(FlintError::ConfigError(format!(
                    "extension '{}' must start with '.'",
                    ext
                )));
            }
        }

        if self.texture_extensions.is_empty() || self.audio_extensions.is_empty() {
            return Err(FlintError::ConfigError(
                "texture and audio extension lists must not be empty".into(),
            ));
        }

        if self.protected_prefix.is_empty() || self.protected_prefix.contains(self.delimiter) {
            return Err(FlintError::ConfigError(format!(
                "protected prefix '{}' must be non-empty and free of the delimiter",
                self.protected_prefix
            )));
        }

        Ok(())
    }

    /// Extensions accepted for a resource kind
    pub fn extensions_for(&self, kind: ResourceKind) -> Vec<String> {
        match kind {
            ResourceKind::StandardTexture => self.texture_extensions.clone(),
            ResourceKind::FontAtlasTexture => vec![self.font_extension.clone()],
            ResourceKind::AudioClip => self.audio_extensions.clone(),
        }
    }

    /// Check if a file name is on the default-font allow-list
    pub fn is_default_font(&self, file_name: &str) -> bool {
        self.default_fonts.iter().any(|f| f == file_name)
    }
}

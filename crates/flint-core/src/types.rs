//! Shared content types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of natively-backed content the caches manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A decoded image texture
    StandardTexture,
    /// A generated glyph-atlas texture for one font at one size
    FontAtlasTexture,
    /// A decoded or streamed audio clip
    AudioClip,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::StandardTexture,
        ResourceKind::FontAtlasTexture,
        ResourceKind::AudioClip,
    ];

    /// Short lowercase name used in logs and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::StandardTexture => "texture",
            ResourceKind::FontAtlasTexture => "font",
            ResourceKind::AudioClip => "audio",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "texture" | "standard_texture" => Ok(ResourceKind::StandardTexture),
            "font" | "font_atlas" | "font_atlas_texture" => Ok(ResourceKind::FontAtlasTexture),
            "audio" | "audio_clip" => Ok(ResourceKind::AudioClip),
            other => Err(format!(
                "unknown resource kind '{}' (expected texture, font or audio)",
                other
            )),
        }
    }
}

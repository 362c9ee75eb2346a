//! Typed forms of a content identifier

use flint_core::ResourceKind;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Canonical identity of one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    key: String,
    protected: bool,
}

impl CacheKey {
    pub(crate) fn new(key: String, protected: bool) -> Self {
        Self { key, protected }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Whether the key carries the default-font protection prefix.
    ///
    /// This is a naming convention only; unloading a protected key is allowed.
    pub fn is_protected(&self) -> bool {
        self.protected
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// How an audio clip's samples are held once constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioBufferType {
    /// Fully decoded into memory up front
    Static,
    /// Decoded incrementally from disk during playback
    Streaming,
}

impl AudioBufferType {
    pub const ALL: [AudioBufferType; 2] = [AudioBufferType::Static, AudioBufferType::Streaming];

    pub fn name(&self) -> &'static str {
        match self {
            AudioBufferType::Static => "static",
            AudioBufferType::Streaming => "streaming",
        }
    }
}

impl fmt::Display for AudioBufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioBufferType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A validated construction request, produced once from the identifier string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRequest {
    Texture { path: PathBuf },
    FontAtlas { path: PathBuf, size: u32 },
    Audio { path: PathBuf, buffer: AudioBufferType },
}

impl ResourceRequest {
    /// File the resource is built from
    pub fn path(&self) -> &Path {
        match self {
            ResourceRequest::Texture { path }
            | ResourceRequest::FontAtlas { path, .. }
            | ResourceRequest::Audio { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRequest::Texture { .. } => ResourceKind::StandardTexture,
            ResourceRequest::FontAtlas { .. } => ResourceKind::FontAtlasTexture,
            ResourceRequest::Audio { .. } => ResourceKind::AudioClip,
        }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRequest::Texture { path } => write!(f, "texture {}", path.display()),
            ResourceRequest::FontAtlas { path, size } => {
                write!(f, "font atlas {} at {}px", path.display(), size)
            }
            ResourceRequest::Audio { path, buffer } => {
                write!(f, "{} audio clip {}", buffer, path.display())
            }
        }
    }
}

/// Output of key resolution: where to store it and what to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: CacheKey,
    pub request: ResourceRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_type_parse() {
        assert_eq!("Static".parse::<AudioBufferType>(), Ok(AudioBufferType::Static));
        assert_eq!(
            "STREAMING".parse::<AudioBufferType>(),
            Ok(AudioBufferType::Streaming)
        );
        assert!("looping".parse::<AudioBufferType>().is_err());
        assert!("".parse::<AudioBufferType>().is_err());
    }

    #[test]
    fn test_request_kind_and_path() {
        let request = ResourceRequest::FontAtlas {
            path: PathBuf::from("/fonts/mono.ttf"),
            size: 16,
        };
        assert_eq!(request.kind(), ResourceKind::FontAtlasTexture);
        assert_eq!(request.path(), Path::new("/fonts/mono.ttf"));
        assert_eq!(request.to_string(), "font atlas /fonts/mono.ttf at 16px");
    }
}

//! Cache key resolution
//!
//! Turns a parsed identifier into a canonical [`CacheKey`] and a typed
//! [`ResourceRequest`], applying the rules for the requested kind. Check order
//! matters: it decides which error a caller sees when several things are wrong.

use crate::config::ContentRules;
use crate::metadata::MetadataKeyParser;
use crate::types::{AudioBufferType, CacheKey, ResolvedKey, ResourceRequest};
use flint_core::{FlintError, ResourceKind, Result};
use std::path::{Path, PathBuf};

const SIZE_PREFIX: &str = "size:";

/// Validates identifiers against [`ContentRules`] and produces cache keys
#[derive(Debug, Clone)]
pub struct CacheKeyResolver {
    rules: ContentRules,
    parser: MetadataKeyParser,
}

impl Default for CacheKeyResolver {
    fn default() -> Self {
        Self::with_checked_rules(ContentRules::default())
    }
}

impl CacheKeyResolver {
    /// Fails with [`FlintError::ConfigError`] if `rules` do not validate
    pub fn new(rules: ContentRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self::with_checked_rules(rules))
    }

    fn with_checked_rules(rules: ContentRules) -> Self {
        let parser = MetadataKeyParser::new(rules.delimiter);
        Self { rules, parser }
    }

    pub fn rules(&self) -> &ContentRules {
        &self.rules
    }

    /// Parse and resolve a raw identifier string
    pub fn resolve_identifier(&self, identifier: &str, kind: ResourceKind) -> Result<ResolvedKey> {
        if identifier.trim().is_empty() {
            return Err(FlintError::InvalidArgument(
                "content identifier must not be empty".into(),
            ));
        }
        let parsed = self.parser.parse(identifier);
        self.resolve(parsed.base_path, parsed.parameter, kind)
    }

    /// Resolve already-split identifier parts
    pub fn resolve(
        &self,
        base_path: &str,
        parameter: Option<&str>,
        kind: ResourceKind,
    ) -> Result<ResolvedKey> {
        match kind {
            ResourceKind::FontAtlasTexture => self.resolve_font(base_path, parameter),
            ResourceKind::StandardTexture => self.resolve_texture(base_path, parameter),
            ResourceKind::AudioClip => self.resolve_audio(base_path, parameter),
        }
    }

    fn resolve_font(&self, base_path: &str, parameter: Option<&str>) -> Result<ResolvedKey> {
        let identifier = self.display(base_path, parameter);
        let expected = format!("'{}{}<n>'", self.rules.delimiter, SIZE_PREFIX);

        let parameter = parameter.ok_or_else(|| FlintError::MissingMetadata {
            identifier: identifier.clone(),
            expected: format!("{} after the font path", expected),
        })?;

        let size = parse_size(parameter).ok_or_else(|| FlintError::MalformedMetadata {
            identifier: identifier.clone(),
            parameter: parameter.to_string(),
            expected: format!("{} with a positive integer size", expected),
        })?;

        if !has_extension(base_path, &self.rules.font_extension) {
            return Err(FlintError::InvalidShape {
                identifier,
                reason: format!(
                    "font atlases are built from {} files",
                    self.rules.font_extension
                ),
            });
        }
        self.require_rooted(base_path, &identifier)?;

        let protected = self.rules.is_default_font(file_name(base_path));
        let prefix = if protected {
            self.rules.protected_prefix.as_str()
        } else {
            ""
        };
        let key = format!(
            "{}{}{}{}{}",
            prefix, base_path, self.rules.delimiter, SIZE_PREFIX, size
        );

        Ok(ResolvedKey {
            key: CacheKey::new(key, protected),
            request: ResourceRequest::FontAtlas {
                path: PathBuf::from(base_path),
                size,
            },
        })
    }

    fn resolve_texture(&self, base_path: &str, parameter: Option<&str>) -> Result<ResolvedKey> {
        let identifier = self.display(base_path, parameter);

        if let Some(parameter) = parameter {
            return Err(FlintError::InvalidShape {
                identifier,
                reason: format!("textures take no metadata (found '{}')", parameter),
            });
        }

        // A font file requested as a plain texture almost always means the
        // caller forgot the size parameter.
        if has_extension(base_path, &self.rules.font_extension) {
            return Err(FlintError::MissingMetadata {
                identifier,
                expected: format!(
                    "'{}{}<n>' to load {} files as font atlases",
                    self.rules.delimiter, SIZE_PREFIX, self.rules.font_extension
                ),
            });
        }

        if !self
            .rules
            .texture_extensions
            .iter()
            .any(|ext| has_extension(base_path, ext))
        {
            return Err(FlintError::InvalidShape {
                identifier,
                reason: format!(
                    "textures must end in {}",
                    self.rules.texture_extensions.join(", ")
                ),
            });
        }
        self.require_rooted(base_path, &identifier)?;

        Ok(ResolvedKey {
            key: CacheKey::new(base_path.to_string(), false),
            request: ResourceRequest::Texture {
                path: PathBuf::from(base_path),
            },
        })
    }

    fn resolve_audio(&self, base_path: &str, parameter: Option<&str>) -> Result<ResolvedKey> {
        let identifier = self.display(base_path, parameter);

        if !self
            .rules
            .audio_extensions
            .iter()
            .any(|ext| has_extension(base_path, ext))
        {
            return Err(FlintError::UnsupportedFormat {
                path: PathBuf::from(base_path),
                supported: self.rules.extensions_for(ResourceKind::AudioClip),
            });
        }

        let names: Vec<&str> = AudioBufferType::ALL.iter().map(|b| b.name()).collect();
        let expected = format!(
            "'{}' followed by one of {}",
            self.rules.delimiter,
            names.join(", ")
        );

        let parameter = parameter.ok_or_else(|| FlintError::MissingMetadata {
            identifier: identifier.clone(),
            expected: expected.clone(),
        })?;
        let buffer: AudioBufferType =
            parameter
                .parse()
                .map_err(|_| FlintError::MalformedMetadata {
                    identifier: identifier.clone(),
                    parameter: parameter.to_string(),
                    expected,
                })?;
        self.require_rooted(base_path, &identifier)?;

        // The buffer type is a construction option, not part of the identity
        Ok(ResolvedKey {
            key: CacheKey::new(base_path.to_string(), false),
            request: ResourceRequest::Audio {
                path: PathBuf::from(base_path),
                buffer,
            },
        })
    }

    fn require_rooted(&self, base_path: &str, identifier: &str) -> Result<()> {
        if is_rooted(base_path) {
            Ok(())
        } else {
            Err(FlintError::InvalidShape {
                identifier: identifier.to_string(),
                reason: "content paths must be absolute".into(),
            })
        }
    }

    fn display(&self, base_path: &str, parameter: Option<&str>) -> String {
        match parameter {
            Some(p) => format!("{}{}{}", base_path, self.rules.delimiter, p),
            None => base_path.to_string(),
        }
    }
}

/// `size:<n>` with n a positive decimal integer
fn parse_size(parameter: &str) -> Option<u32> {
    let digits = parameter.strip_prefix(SIZE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&size| size > 0)
}

/// Case-insensitive extension match that requires a non-empty stem
fn has_extension(path: &str, ext: &str) -> bool {
    let name = file_name(path);
    name.len() > ext.len()
        && name
            .get(name.len() - ext.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Absolute on any host: `/x`, `\x`, `\\server\x` or `C:/x`
fn is_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\');
    drive || path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_core::ErrorCategory;

    fn resolve(identifier: &str, kind: ResourceKind) -> Result<ResolvedKey> {
        CacheKeyResolver::default().resolve_identifier(identifier, kind)
    }

    #[test]
    fn test_font_key_embeds_size() {
        let small = resolve("/fonts/Roboto.ttf|size:12", ResourceKind::FontAtlasTexture).unwrap();
        let large = resolve("/fonts/Roboto.ttf|size:24", ResourceKind::FontAtlasTexture).unwrap();

        assert_eq!(small.key.as_str(), "/fonts/Roboto.ttf|size:12");
        assert_ne!(small.key, large.key);
        assert!(!small.key.is_protected());
        assert_eq!(
            large.request,
            ResourceRequest::FontAtlas {
                path: PathBuf::from("/fonts/Roboto.ttf"),
                size: 24
            }
        );
    }

    #[test]
    fn test_default_font_is_protected() {
        let resolved =
            resolve("C:/fonts/DejaVuSans.ttf|size:16", ResourceKind::FontAtlasTexture).unwrap();
        assert_eq!(resolved.key.as_str(), "default:C:/fonts/DejaVuSans.ttf|size:16");
        assert!(resolved.key.is_protected());
        // The request path never carries the prefix
        assert_eq!(resolved.request.path(), Path::new("C:/fonts/DejaVuSans.ttf"));
    }

    #[test]
    fn test_font_without_size_is_metadata_error() {
        let err = resolve("arial.ttf", ResourceKind::FontAtlasTexture).unwrap_err();
        assert!(matches!(err, FlintError::MissingMetadata { .. }));
        assert_eq!(err.category(), ErrorCategory::Metadata);
    }

    #[test]
    fn test_font_malformed_size() {
        for bad in ["size:", "size:abc", "size:-3", "size:+3", "size:0", "sz:12", "size:99999999999"] {
            let id = format!("/fonts/Roboto.ttf|{}", bad);
            let err = resolve(&id, ResourceKind::FontAtlasTexture).unwrap_err();
            assert!(
                matches!(err, FlintError::MalformedMetadata { .. }),
                "{} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_font_shape_errors() {
        let wrong_ext = resolve("/fonts/Roboto.otf|size:12", ResourceKind::FontAtlasTexture).unwrap_err();
        assert_eq!(wrong_ext.category(), ErrorCategory::Shape);

        let relative = resolve("fonts/Roboto.ttf|size:12", ResourceKind::FontAtlasTexture).unwrap_err();
        assert_eq!(relative.category(), ErrorCategory::Shape);
    }

    #[test]
    fn test_texture_with_metadata_is_shape_error() {
        let err = resolve("hero.png|size:12", ResourceKind::StandardTexture).unwrap_err();
        assert!(matches!(err, FlintError::InvalidShape { .. }));
    }

    #[test]
    fn test_texture_with_font_extension_is_metadata_error() {
        let err = resolve("/fonts/Roboto.ttf", ResourceKind::StandardTexture).unwrap_err();
        assert!(matches!(err, FlintError::MissingMetadata { .. }));
    }

    #[test]
    fn test_texture_key_is_path() {
        let resolved = resolve("C:/content/hero.png", ResourceKind::StandardTexture).unwrap();
        assert_eq!(resolved.key.as_str(), "C:/content/hero.png");

        let upper = resolve("/content/HERO.PNG", ResourceKind::StandardTexture).unwrap();
        assert_eq!(upper.key.as_str(), "/content/HERO.PNG");
    }

    #[test]
    fn test_texture_shape_errors() {
        let wrong_ext = resolve("/content/hero.bmp", ResourceKind::StandardTexture).unwrap_err();
        assert_eq!(wrong_ext.category(), ErrorCategory::Shape);

        let relative = resolve("content/hero.png", ResourceKind::StandardTexture).unwrap_err();
        assert_eq!(relative.category(), ErrorCategory::Shape);

        let bare_ext = resolve("/content/.png", ResourceKind::StandardTexture).unwrap_err();
        assert_eq!(bare_ext.category(), ErrorCategory::Shape);
    }

    #[test]
    fn test_unsupported_audio_extension() {
        let err = resolve("clip.wav", ResourceKind::AudioClip).unwrap_err();
        match &err {
            FlintError::UnsupportedFormat { supported, .. } => {
                assert_eq!(supported, &vec![".ogg".to_string(), ".mp3".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.category(), ErrorCategory::Construction);
        assert!(err.to_string().contains(".ogg"));
        assert!(err.to_string().contains(".mp3"));
    }

    #[test]
    fn test_audio_key_ignores_buffer_type() {
        let a = resolve("/sfx/door.ogg|static", ResourceKind::AudioClip).unwrap();
        let b = resolve("/sfx/door.ogg|Streaming", ResourceKind::AudioClip).unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.key.as_str(), "/sfx/door.ogg");
        assert_ne!(a.request, b.request);
    }

    #[test]
    fn test_audio_metadata_errors() {
        let missing = resolve("/sfx/door.mp3", ResourceKind::AudioClip).unwrap_err();
        assert!(matches!(missing, FlintError::MissingMetadata { .. }));

        let malformed = resolve("/sfx/door.mp3|looping", ResourceKind::AudioClip).unwrap_err();
        assert!(matches!(malformed, FlintError::MalformedMetadata { .. }));
    }

    #[test]
    fn test_empty_identifier_is_argument_error() {
        for id in ["", "   ", "\t"] {
            let err = resolve(id, ResourceKind::StandardTexture).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Argument);
        }
    }

    #[test]
    fn test_empty_font_extension_is_rejected() {
        let rules = ContentRules {
            font_extension: String::new(),
            ..ContentRules::default()
        };
        let err = CacheKeyResolver::new(rules).unwrap_err();
        assert!(matches!(err, FlintError::ConfigError(_)));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ContentRules {
            delimiter: '#',
            texture_extensions: vec![".png".into(), ".jpg".into()],
            ..ContentRules::default()
        };
        let resolver = CacheKeyResolver::new(rules).unwrap();

        let tex = resolver
            .resolve_identifier("/content/sky.jpg", ResourceKind::StandardTexture)
            .unwrap();
        assert_eq!(tex.key.as_str(), "/content/sky.jpg");

        let font = resolver
            .resolve_identifier("/fonts/Roboto.ttf#size:10", ResourceKind::FontAtlasTexture)
            .unwrap();
        assert_eq!(font.key.as_str(), "/fonts/Roboto.ttf#size:10");
    }

    #[test]
    fn test_is_rooted() {
        assert!(is_rooted("/content/a.png"));
        assert!(is_rooted("C:/content/a.png"));
        assert!(is_rooted("d:\\content\\a.png"));
        assert!(is_rooted("\\\\server\\share\\a.png"));
        assert!(!is_rooted("content/a.png"));
        assert!(!is_rooted("C:a.png"));
    }
}

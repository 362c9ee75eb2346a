//! CPU-side texture decoding for the standard texture cache
//!
//! Produces RGBA8 pixel data ready for upload. The upload itself, and the
//! destruction of the GPU texture on disposal, belong to the renderer.

use crate::factory::{CachedResource, ResourceFactory};
use crate::types::ResourceRequest;
use flint_core::{FlintError, IdAllocator, ResourceId, ResourceKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded texture with RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Size of the pixel buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

impl CachedResource for TextureData {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn source_path(&self) -> &Path {
        &self.path
    }
}

/// Decodes image files with the `image` crate
pub struct ImageTextureFactory {
    ids: Arc<IdAllocator>,
}

impl ImageTextureFactory {
    /// Ids come from `ids`, which may be shared with other factories
    pub fn new(ids: Arc<IdAllocator>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }
}

impl ResourceFactory for ImageTextureFactory {
    type Resource = TextureData;

    fn create(&self, request: &ResourceRequest) -> Result<TextureData> {
        let ResourceRequest::Texture { path } = request else {
            return Err(FlintError::ConstructionFailed(format!(
                "image decoder cannot build a {}",
                request.kind()
            )));
        };

        let img = image::open(path).map_err(|e| {
            FlintError::ImageError(format!("Failed to open image '{}': {}", path.display(), e))
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        // Failed decodes must not consume ids
        let id = self.ids.allocate();
        tracing::debug!(%id, path = %path.display(), width, height, "decoded texture");

        Ok(TextureData {
            id,
            kind: ResourceKind::StandardTexture,
            path: path.clone(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentRules;
    use crate::cache::ResourceCache;
    use crate::factory::DiskProbe;
    use flint_runtime::DisposalNotifier;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flint_texture_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_decode_png() {
        let dir = temp_dir();
        let path = dir.join("brick.png");
        write_png(&path, 3, 2);

        let factory = ImageTextureFactory::new(Arc::new(IdAllocator::new()));
        let tex = factory
            .create(&ResourceRequest::Texture { path: path.clone() })
            .unwrap();

        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.byte_len(), 3 * 2 * 4);
        assert_eq!(&tex.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(tex.id, ResourceId::from_raw(1));
        assert_eq!(tex.source_path(), path.as_path());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_does_not_consume_id() {
        let dir = temp_dir();
        let path = dir.join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let ids = Arc::new(IdAllocator::new());
        let factory = ImageTextureFactory::new(Arc::clone(&ids));
        let err = factory
            .create(&ResourceRequest::Texture { path })
            .unwrap_err();

        assert!(matches!(err, FlintError::ImageError(_)));
        assert_eq!(ids.allocated(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rejects_non_texture_request() {
        let factory = ImageTextureFactory::new(Arc::new(IdAllocator::new()));
        let err = factory
            .create(&ResourceRequest::FontAtlas {
                path: PathBuf::from("/fonts/a.ttf"),
                size: 12,
            })
            .unwrap_err();
        assert!(matches!(err, FlintError::ConstructionFailed(_)));
    }

    #[test]
    fn test_cache_over_disk() {
        let dir = temp_dir();
        let path = dir.join("hero.png");
        write_png(&path, 4, 4);

        let cache = ResourceCache::new(
            ResourceKind::StandardTexture,
            ContentRules::default(),
            ImageTextureFactory::new(Arc::new(IdAllocator::new())),
            Arc::new(DiskProbe),
            Arc::new(DisposalNotifier::new()),
        )
        .unwrap();

        let identifier = path.to_str().unwrap();
        let a = cache.get_item(identifier).unwrap();
        let b = cache.get_item(identifier).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.factory().ids().allocated(), 1);

        let missing = dir.join("missing.png");
        let err = cache.get_item(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, FlintError::NotFound(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Media dimension probing for the mosaic gallery engine.
//!
//! The engine needs intrinsic media dimensions before it can pack an item;
//! this crate resolves them for raster images by decoding only the header,
//! and memoizes results by URI so re-probing after a reset is cheap.
//!
//! Video metadata is out of scope here: probing a video container needs a
//! demuxer, which hosts wire in by implementing
//! [`mosaic_engine::Prober`] themselves. [`ImageProber`] reports video and
//! unsupported kinds as [`ProbeError::UnsupportedKind`], which the engine
//! resolves with fallback dimensions rather than stalling.
#![deny(missing_docs, clippy::unwrap_used)]

use std::{io::Cursor, num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::trace;

use mosaic_engine::{IntrinsicSize, MediaKind, ProbeError, ProbeRequest, Prober};

/// Why media dimensions could not be resolved.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The media file could not be read.
    #[error("failed to read media: {0}")]
    Io(#[from] std::io::Error),
    /// The media data could not be decoded.
    #[error("failed to decode media: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes the intrinsic dimensions of an image file without decoding its
/// pixel data.
pub fn image_dimensions_from_path(path: &str) -> Result<IntrinsicSize, MediaError> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    Ok(IntrinsicSize::new(width as f32, height as f32))
}

/// Decodes the intrinsic dimensions of an in-memory image.
pub fn image_dimensions_from_bytes(bytes: &[u8]) -> Result<IntrinsicSize, MediaError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    Ok(IntrinsicSize::new(width as f32, height as f32))
}

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Image prober with a URI-keyed dimension cache.
///
/// Clones share one cache, so several gallery surfaces probing the same
/// assets only decode each header once.
#[derive(Clone)]
pub struct ImageProber {
    cache: Arc<Mutex<LruCache<String, IntrinsicSize>>>,
}

impl Default for ImageProber {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProber {
    /// Creates a prober with the default cache capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a prober caching up to `capacity` resolved URIs.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }
}

impl Prober for ImageProber {
    fn probe(&mut self, request: &ProbeRequest) -> Result<IntrinsicSize, ProbeError> {
        match request.media_kind {
            MediaKind::Image => {
                if let Some(size) = self.cache.lock().get(&request.media_uri) {
                    trace!(uri = %request.media_uri, "dimension cache hit");
                    return Ok(*size);
                }
                let size = image_dimensions_from_path(&request.media_uri)
                    .map_err(|error| ProbeError::LoadFailed(error.to_string()))?;
                self.cache.lock().put(request.media_uri.clone(), size);
                Ok(size)
            }
            MediaKind::Video | MediaKind::Unsupported => Err(ProbeError::UnsupportedKind),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mosaic_engine::{EngineArgs, ItemDescriptor, MasonryEngine, drive};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn temp_png(name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, png_bytes(width, height)).unwrap();
        path
    }

    #[test]
    fn test_dimensions_from_bytes() {
        let bytes = png_bytes(3, 5);
        let size = image_dimensions_from_bytes(&bytes).unwrap();
        assert_eq!(size, IntrinsicSize::new(3.0, 5.0));
    }

    #[test]
    fn test_undecodable_bytes_report_decode_error() {
        let result = image_dimensions_from_bytes(b"not an image");
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[test]
    fn test_dimensions_from_path() {
        let path = temp_png("mosaic-media-test-dims.png", 7, 2);
        let size = image_dimensions_from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(size, IntrinsicSize::new(7.0, 2.0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_engine_packs_probed_image() {
        // A 100x50 image at column width w renders w/2 high.
        let path = temp_png("mosaic-media-test-pack.png", 100, 50);
        let items = vec![ItemDescriptor::new(
            0usize,
            MediaKind::Image,
            path.to_str().unwrap(),
        )];
        let mut engine = MasonryEngine::new(EngineArgs::default(), items);
        drive(&mut engine, &mut ImageProber::new());
        let placed = engine.placed(0).unwrap();
        assert_eq!(placed.rendered_height, engine.column_width() / 2.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_video_kind_falls_back_in_engine() {
        // The prober declines video; the engine packs fallback dimensions
        // instead of stalling the cursor.
        let items = vec![ItemDescriptor::new(0usize, MediaKind::Video, "clip.mp4")];
        let mut engine = MasonryEngine::new(EngineArgs::default(), items);
        drive(&mut engine, &mut ImageProber::new());
        assert_eq!(engine.window().next_index, 1);
        let placed = engine.placed(0).unwrap();
        assert_eq!(placed.rendered_height, engine.column_width());
    }

    #[test]
    fn test_prober_caches_by_uri() {
        let path = temp_png("mosaic-media-test-cache.png", 4, 4);
        let uri = path.to_str().unwrap().to_owned();
        let items = vec![ItemDescriptor::new(0usize, MediaKind::Image, uri)];

        let mut prober = ImageProber::new();
        let mut engine = MasonryEngine::new(EngineArgs::default(), items);
        drive(&mut engine, &mut prober);
        let first = engine.placed(0).unwrap().rendered_height;

        // Delete the file: after a reset the probe must be served from the
        // shared cache.
        std::fs::remove_file(&path).unwrap();
        engine.reset();
        drive(&mut engine, &mut prober.clone());
        assert_eq!(engine.placed(0).unwrap().rendered_height, first);
    }
}

//! Dimension probing: one asynchronous measurement at a time.
//!
//! The engine never touches media itself. It emits at most one
//! [`ProbeRequest`] at a time via [`crate::engine::MasonryEngine::take_probe`];
//! the host resolves it (decode an image header, read video metadata) and
//! reports back through [`crate::engine::MasonryEngine::complete_probe`].
//! Hosts that resolve synchronously can use [`drive`] with a [`Prober`].
use thiserror::Error;

use crate::{
    engine::MasonryEngine,
    item::{GalleryItem, ItemId, MediaKind},
};

/// Intrinsic media dimensions, as decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicSize {
    /// Decoded width in source pixels.
    pub width: f32,
    /// Decoded height in source pixels.
    pub height: f32,
}

impl IntrinsicSize {
    /// Creates an intrinsic size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Why a probe could not resolve dimensions.
///
/// None of these are fatal: the engine answers every failure with fallback
/// dimensions so the pipeline always makes forward progress.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The media could not be fetched or decoded.
    #[error("media failed to load: {0}")]
    LoadFailed(String),
    /// The prober does not handle this media kind.
    #[error("unsupported media kind")]
    UnsupportedKind,
}

/// One outstanding measurement request.
///
/// Requests carry the reset epoch they were issued under; completions from
/// a previous epoch are discarded silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    /// Position of the item in the current filtered sequence.
    pub original_index: usize,
    /// Stable identity of the item.
    pub identity: ItemId,
    /// What kind of media to measure.
    pub media_kind: MediaKind,
    /// Where the media lives.
    pub media_uri: String,
    pub(crate) epoch: u64,
}

/// Resolves intrinsic dimensions for probe requests.
pub trait Prober {
    /// Resolves the intrinsic dimensions of the requested media.
    fn probe(&mut self, request: &ProbeRequest) -> Result<IntrinsicSize, ProbeError>;
}

impl<F> Prober for F
where
    F: FnMut(&ProbeRequest) -> Result<IntrinsicSize, ProbeError>,
{
    fn probe(&mut self, request: &ProbeRequest) -> Result<IntrinsicSize, ProbeError> {
        self(request)
    }
}

/// Drains the engine's probe queue with a synchronous prober.
///
/// Each iteration resolves exactly one request before the next is issued,
/// which is what keeps packing deterministic. The loop ends when the cursor
/// leaves the loaded window or runs out of items.
///
/// # Examples
///
/// ```
/// use mosaic_engine::{
///     engine::{EngineArgs, MasonryEngine},
///     item::{ItemDescriptor, MediaKind},
///     probe::{IntrinsicSize, ProbeError, ProbeRequest, drive},
/// };
///
/// let items: Vec<_> = (0..8)
///     .map(|i| ItemDescriptor::new(i, MediaKind::Image, format!("media/{i}.png")))
///     .collect();
/// let mut engine = MasonryEngine::new(EngineArgs::default(), items);
/// let mut prober = |_req: &ProbeRequest| -> Result<IntrinsicSize, ProbeError> {
///     Ok(IntrinsicSize::new(400.0, 300.0))
/// };
/// drive(&mut engine, &mut prober);
/// assert_eq!(engine.window().next_index, 8);
/// ```
pub fn drive<T, P>(engine: &mut MasonryEngine<T>, prober: &mut P)
where
    T: GalleryItem,
    P: Prober,
{
    while let Some(request) = engine.take_probe() {
        let outcome = prober.probe(&request);
        engine.complete_probe(&request, outcome);
    }
}

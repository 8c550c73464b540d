//! Incremental masonry virtualization for large media galleries.
//!
//! A gallery surface hands this crate the filtered, ordered sequence of
//! item descriptors and a scroll position; the engine decides which slice
//! of the sequence to materialize, measures each item's media one at a
//! time, and packs measured items into balanced columns. Items outside the
//! virtual window are represented as fixed-height placeholders so the page
//! never collapses while scrolling.
//!
//! # Usage
//!
//! ```
//! use mosaic_engine::{
//!     EngineArgs, IntrinsicSize, ItemDescriptor, MasonryEngine, MediaKind, ProbeError,
//!     ProbeRequest, drive,
//! };
//!
//! let items: Vec<_> = (0..40)
//!     .map(|i| ItemDescriptor::new(i, MediaKind::Image, format!("media/{i}.jpg")))
//!     .collect();
//! let mut engine = MasonryEngine::new(EngineArgs::default(), items);
//!
//! // Resolve one measurement at a time until the window is filled.
//! let mut prober = |_req: &ProbeRequest| -> Result<IntrinsicSize, ProbeError> {
//!     Ok(IntrinsicSize::new(1600.0, 900.0))
//! };
//! drive(&mut engine, &mut prober);
//! assert_eq!(engine.window().next_index, 32);
//! ```
//!
//! Hosts with asynchronous media loading use [`MasonryEngine::take_probe`]
//! and [`MasonryEngine::complete_probe`] directly; the engine guarantees at
//! most one request is outstanding and tolerates completions that arrive
//! after a reset.
#![deny(missing_docs, clippy::unwrap_used)]

mod cache;
mod chunks;

pub mod columns;
pub mod debounce;
pub mod engine;
pub mod item;
pub mod probe;

pub use columns::{ColumnState, PlacedItem};
pub use debounce::Debounce;
pub use engine::{EngineArgs, MasonryEngine, Slot, WindowState};
pub use item::{GalleryItem, ItemDescriptor, ItemId, MediaKind, ViewMode};
pub use probe::{IntrinsicSize, ProbeError, ProbeRequest, Prober, drive};

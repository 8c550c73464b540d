//! The incremental masonry virtualization engine.
//!
//! ## Usage
//!
//! One engine instance per gallery surface. Feed it the filtered item
//! sequence, drain probe requests (see [`crate::probe::drive`]), and feed it
//! scroll positions; read placements and placeholders back per index with
//! [`MasonryEngine::slot`].
use std::time::{Duration, Instant};

use derive_setters::Setters;
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::{
    cache::PositionCache,
    chunks::{ChunkIndex, list_chunk_span},
    columns::{ColumnPacker, ColumnState, PlacedItem, scaled_height},
    debounce::Debounce,
    item::{GalleryItem, ItemId, MediaKind, ViewMode},
    probe::{IntrinsicSize, ProbeError, ProbeRequest},
};

/// Configuration for a [`MasonryEngine`].
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct EngineArgs {
    /// Number of items per chunk for viewport-visibility testing.
    pub chunk_size: usize,
    /// Vertical gap between stacked items, and horizontal slack per column.
    pub column_gap: f32,
    /// Live width of the gallery container in pixels.
    pub container_width: f32,
    /// Fixed row height used in list mode instead of measurement.
    pub list_row_height: f32,
    /// Height assumed for items with no cached measurement.
    pub placeholder_height: f32,
    /// Minimum interval between scroll-driven window recomputes.
    pub debounce_interval: Duration,
    /// Display mode; changing it forces a full reset.
    pub view_mode: ViewMode,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            column_gap: 8.0,
            container_width: 1280.0,
            list_row_height: 120.0,
            placeholder_height: 120.0,
            debounce_interval: Duration::from_millis(500),
            view_mode: ViewMode::default(),
        }
    }
}

impl EngineArgs {
    fn sanitized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self.column_gap = self.column_gap.max(0.0);
        self.container_width = self.container_width.max(1.0);
        self.list_row_height = self.list_row_height.max(1.0);
        self.placeholder_height = self.placeholder_height.max(1.0);
        self
    }
}

/// The engine's virtual window over the item sequence.
///
/// Invariant: `loaded_start <= next_index <= loaded_end <= total_items`,
/// and `total_visible >= loaded_end`. Indices below `total_visible` are
/// present in the surface as real content or placeholders; indices at or
/// beyond it are absent entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// First index materialized as real content.
    pub loaded_start: usize,
    /// One past the last index targeted for real content.
    pub loaded_end: usize,
    /// One past the last index present in the surface at all.
    pub total_visible: usize,
    /// The sequential probe cursor.
    pub next_index: usize,
}

/// What the rendering surface should show at one index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// Real content at the recorded column and offset.
    Placed(&'a PlacedItem),
    /// A lightweight placeholder of the given height.
    Placeholder {
        /// Last known height of the item, or the configured default.
        height: f32,
    },
}

/// Incremental masonry layout over a virtualized item window.
///
/// The engine owns all mutable layout state for one gallery surface and is
/// driven entirely by its host: probe completions and scroll events execute
/// synchronously, one at a time, so there is exactly one measurement in
/// flight and packing order is deterministic.
pub struct MasonryEngine<T> {
    args: EngineArgs,
    items: Vec<T>,
    packer: ColumnPacker,
    chunks: ChunkIndex,
    cache: PositionCache,
    window: WindowState,
    processed: FxHashSet<ItemId>,
    in_flight: Option<(usize, ItemId)>,
    epoch: u64,
    debounce: Debounce,
}

impl<T: GalleryItem> MasonryEngine<T> {
    /// Creates an engine over the given filtered item sequence.
    pub fn new(args: EngineArgs, items: Vec<T>) -> Self {
        let args = args.sanitized();
        let debounce = Debounce::new(args.debounce_interval);
        let mut engine = Self {
            packer: ColumnPacker::new(args.view_mode.column_count(), args.column_gap),
            chunks: ChunkIndex::default(),
            cache: PositionCache::default(),
            window: WindowState {
                loaded_start: 0,
                loaded_end: 0,
                total_visible: 0,
                next_index: 0,
            },
            processed: FxHashSet::default(),
            in_flight: None,
            epoch: 0,
            debounce,
            args,
            items,
        };
        engine.apply_reset("init");
        engine
    }

    /// Replaces the item sequence, as the item source does on any filter or
    /// dataset change. Always a full reset.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.apply_reset("items-changed");
    }

    /// Switches display mode. A changed column count invalidates every
    /// packing decision, so this is a full reset; setting the current mode
    /// again is a no-op.
    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if view_mode == self.args.view_mode {
            return;
        }
        self.args.view_mode = view_mode;
        self.apply_reset("view-mode-changed");
    }

    /// Updates the live container width.
    ///
    /// Only future placements pick the new width up; already-placed items
    /// keep their column and offset until the next reset.
    pub fn set_container_width(&mut self, container_width: f32) {
        self.args.container_width = container_width.max(1.0);
    }

    /// Discards all layout state and restarts loading from index 0.
    pub fn reset(&mut self) {
        self.apply_reset("explicit");
    }

    fn apply_reset(&mut self, reason: &str) {
        self.epoch = self.epoch.wrapping_add(1);
        let columns = self.args.view_mode.column_count();
        self.packer.reset(columns, self.args.column_gap);
        self.chunks.clear();
        self.cache.clear();
        self.processed.clear();
        self.in_flight = None;
        self.debounce.reset();
        let loaded_end = (self.args.chunk_size * 2).min(self.items.len());
        self.window = WindowState {
            loaded_start: 0,
            loaded_end,
            total_visible: loaded_end,
            next_index: 0,
        };
        debug!(
            reason,
            epoch = self.epoch,
            total_items = self.items.len(),
            columns,
            "engine reset"
        );
    }

    /// Issues the next measurement request, if one is due.
    ///
    /// At most one request is outstanding at a time: while a request issued
    /// here has not been answered via [`Self::complete_probe`], this
    /// returns `None`. Items that need no measurement (list mode, empty
    /// URIs, unsupported kinds) are resolved inline and never surface as
    /// requests.
    pub fn take_probe(&mut self) -> Option<ProbeRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        while self.window.next_index < self.window.loaded_end {
            let index = self.window.next_index;
            let identity = self.items[index].identity();
            if self.processed.contains(&identity) {
                self.window.next_index = index + 1;
                continue;
            }
            if self.args.view_mode.is_fixed_row() {
                self.commit_placement(index, identity, self.args.list_row_height);
                continue;
            }
            let media_kind = self.items[index].media_kind();
            if media_kind == MediaKind::Unsupported || self.items[index].media_uri().is_empty() {
                trace!(index, "skipping item with no probeable media");
                self.processed.insert(identity);
                self.window.next_index = index + 1;
                continue;
            }
            self.in_flight = Some((index, identity));
            return Some(ProbeRequest {
                original_index: index,
                identity,
                media_kind,
                media_uri: self.items[index].media_uri().to_owned(),
                epoch: self.epoch,
            });
        }
        None
    }

    /// Reports the outcome of an issued request.
    ///
    /// Resolution is total: failures are packed with fallback dimensions (a
    /// square at the column width) rather than left unplaced. Completions
    /// from a previous epoch, or for an identity that was already handled,
    /// are dropped silently.
    pub fn complete_probe(
        &mut self,
        request: &ProbeRequest,
        outcome: Result<IntrinsicSize, ProbeError>,
    ) {
        if request.epoch != self.epoch {
            trace!(
                index = request.original_index,
                "dropping probe completion from a previous epoch"
            );
            return;
        }
        let Some((index, identity)) = self.in_flight else {
            trace!(
                index = request.original_index,
                "dropping duplicate probe completion"
            );
            return;
        };
        if index != request.original_index
            || identity != request.identity
            || self.processed.contains(&identity)
        {
            trace!(
                index = request.original_index,
                "dropping probe completion for an item no longer in flight"
            );
            return;
        }
        self.in_flight = None;
        let column_width = self.column_width();
        let rendered_height = match outcome {
            Ok(size) => scaled_height(size.width, size.height, column_width),
            Err(error) => {
                warn!(index, %error, "media resolution failed, using fallback dimensions");
                column_width
            }
        };
        self.commit_placement(index, identity, rendered_height);
    }

    fn commit_placement(&mut self, index: usize, identity: ItemId, rendered_height: f32) {
        let placed = self.packer.place(index, identity, rendered_height);
        let chunk = index / self.args.chunk_size;
        if self.args.view_mode.is_fixed_row() {
            let span = list_chunk_span(
                chunk,
                self.args.chunk_size,
                self.args.list_row_height,
                self.args.column_gap,
            );
            self.chunks.record_span(chunk, span.start, span.end);
        } else {
            self.chunks.record_span(chunk, placed.y_offset, placed.y_end());
        }
        self.cache.record(identity, rendered_height);
        self.processed.insert(identity);
        self.window.next_index = index + 1;
        trace!(
            index,
            column = placed.column,
            y = placed.y_offset,
            height = rendered_height,
            "placed item"
        );
    }

    /// Feeds a scroll position to the viewport window state machine.
    ///
    /// Returns whether the loaded window changed. Recomputes are debounced;
    /// brief scroll spikes inside the interval are deliberately missed.
    pub fn on_scroll(&mut self, scroll_top: f32, viewport_height: f32, now: Instant) -> bool {
        if !self.debounce.try_begin(now) {
            return false;
        }
        let changed = self.recompute_window(scroll_top, viewport_height);
        self.debounce.finish();
        changed
    }

    fn recompute_window(&mut self, scroll_top: f32, viewport_height: f32) -> bool {
        let viewport_end = scroll_top + viewport_height.max(0.0);
        let visible = self.chunks.visible_chunks(scroll_top, viewport_end);
        let chunk_size = self.args.chunk_size;
        let (start_item, end_item) = if visible.is_empty() {
            let past_all_content = self
                .chunks
                .max_recorded_end()
                .is_some_and(|end| scroll_top > end);
            if past_all_content {
                // Loading is sequential; the window never jumps past the
                // last fully-resolved chunk.
                return false;
            }
            (0, chunk_size * 2)
        } else {
            let min_chunk = visible[0].saturating_sub(1);
            let max_chunk = visible[visible.len() - 1] + 1;
            (min_chunk * chunk_size, (max_chunk + 1) * chunk_size)
        };
        let total = self.items.len();
        let loaded_start = start_item.min(self.window.next_index);
        let loaded_end = end_item.min(total).max(self.window.next_index);
        if loaded_start == self.window.loaded_start && loaded_end == self.window.loaded_end {
            return false;
        }
        self.snapshot_positions();
        self.window.loaded_start = loaded_start;
        self.window.loaded_end = loaded_end;
        self.window.total_visible = self.window.total_visible.max(loaded_end);
        debug!(
            loaded_start,
            loaded_end,
            total_visible = self.window.total_visible,
            cached = self.cache.len(),
            "virtual window moved"
        );
        true
    }

    fn snapshot_positions(&mut self) {
        for column in self.packer.columns() {
            for placed in column.items() {
                self.cache.record(placed.identity, placed.rendered_height);
            }
        }
    }

    /// What to render at `index`, or `None` if the index is beyond the
    /// surface entirely.
    ///
    /// Placed items outside the loaded window are demoted to placeholders
    /// sized from the position cache, so unmounting them does not shift the
    /// page.
    pub fn slot(&self, index: usize) -> Option<Slot<'_>> {
        if index >= self.window.total_visible {
            return None;
        }
        if index >= self.window.loaded_start && index < self.window.loaded_end
            && let Some(placed) = self.packer.get(index)
        {
            return Some(Slot::Placed(placed));
        }
        let identity = self.items[index].identity();
        let height = self
            .cache
            .height_for(identity)
            .unwrap_or(self.args.placeholder_height);
        Some(Slot::Placeholder { height })
    }

    /// Current window state.
    pub fn window(&self) -> WindowState {
        self.window
    }

    /// Number of items in the current sequence.
    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// The packed columns, in column order.
    pub fn columns(&self) -> &[ColumnState] {
        self.packer.columns()
    }

    /// Number of columns in the current view mode.
    pub fn column_count(&self) -> usize {
        self.packer.column_count()
    }

    /// Number of items placed so far in this epoch.
    pub fn placed_count(&self) -> usize {
        self.packer.placed_count()
    }

    /// The placement of an item, if it has been packed this epoch.
    pub fn placed(&self, index: usize) -> Option<&PlacedItem> {
        self.packer.get(index)
    }

    /// Whether a measurement request is currently outstanding.
    pub fn has_probe_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Current engine configuration.
    pub fn args(&self) -> &EngineArgs {
        &self.args
    }

    /// Pixel width one column offers to items in the current mode.
    pub fn column_width(&self) -> f32 {
        match self.args.view_mode {
            ViewMode::List => self.args.container_width,
            ViewMode::Grid { .. } => {
                let columns = self.packer.column_count() as f32;
                (self.args.container_width / columns - self.args.column_gap).max(1.0)
            }
        }
    }

    /// Human-readable status line for a diagnostics panel.
    ///
    /// Informational only; the format is not a stable contract.
    pub fn status(&self) -> String {
        format!(
            "visible {}/{} | window [{}, {}) | cursor {}",
            self.window.total_visible,
            self.items.len(),
            self.window.loaded_start,
            self.window.loaded_end,
            self.window.next_index
        )
    }
}

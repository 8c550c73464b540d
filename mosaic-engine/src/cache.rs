//! Durable height cache for unmounted items.
//!
//! When the virtual window moves, items that leave it are demoted to
//! placeholders; their last-known heights are served from here so the page
//! does not collapse or jump.
use rustc_hash::FxHashMap;

use crate::item::ItemId;

/// Identity → last-known rendered height.
///
/// Entries only grow within a dataset epoch; the map is fully cleared on
/// reset.
#[derive(Debug, Clone, Default)]
pub(crate) struct PositionCache {
    heights: FxHashMap<ItemId, f32>,
}

impl PositionCache {
    pub(crate) fn record(&mut self, identity: ItemId, height: f32) {
        self.heights.insert(identity, height);
    }

    pub(crate) fn height_for(&self, identity: ItemId) -> Option<f32> {
        self.heights.get(&identity).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.heights.len()
    }

    pub(crate) fn clear(&mut self) {
        self.heights.clear();
    }
}

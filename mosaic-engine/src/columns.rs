//! Shortest-column-first packing for the masonry grid.
//!
//! ## Usage
//!
//! The packer is driven by the engine; hosts read placements back through
//! [`ColumnState`] and [`PlacedItem`].
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::item::ItemId;

/// One item after packing.
///
/// A placed item never moves columns; it is only ever unmounted (demoted to
/// a placeholder) or kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    /// Position of the item in the current filtered sequence.
    pub original_index: usize,
    /// Stable identity of the item.
    pub identity: ItemId,
    /// Column the item was packed into.
    pub column: usize,
    /// Vertical offset of the item's top edge inside its column.
    pub y_offset: f32,
    /// Height the item occupies at the column width it was measured against.
    pub rendered_height: f32,
}

impl PlacedItem {
    /// Bottom edge of the item inside its column.
    pub fn y_end(&self) -> f32 {
        self.y_offset + self.rendered_height
    }
}

/// One column of the packed layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnState {
    items: Vec<PlacedItem>,
    height: f32,
}

impl ColumnState {
    /// Items packed into this column, in placement order.
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Running height of the column, including inter-item gaps.
    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Packs items into whichever column is currently shortest.
///
/// Ties break toward the lowest column index, so packing is deterministic
/// for a given item order and height sequence.
#[derive(Debug, Clone)]
pub(crate) struct ColumnPacker {
    columns: SmallVec<[ColumnState; 4]>,
    by_index: FxHashMap<usize, PlacedItem>,
    gap: f32,
}

impl ColumnPacker {
    pub(crate) fn new(column_count: usize, gap: f32) -> Self {
        let column_count = column_count.max(1);
        let mut columns = SmallVec::new();
        columns.resize(column_count, ColumnState::default());
        Self {
            columns,
            by_index: FxHashMap::default(),
            gap: gap.max(0.0),
        }
    }

    pub(crate) fn reset(&mut self, column_count: usize, gap: f32) {
        *self = Self::new(column_count, gap);
    }

    pub(crate) fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub(crate) fn placed_count(&self) -> usize {
        self.by_index.len()
    }

    pub(crate) fn get(&self, original_index: usize) -> Option<&PlacedItem> {
        self.by_index.get(&original_index)
    }

    /// Appends an item to the shortest column and returns the placement.
    ///
    /// Packing is total: any finite non-negative height is accepted, and
    /// there is no failure path observable to the caller.
    pub(crate) fn place(
        &mut self,
        original_index: usize,
        identity: ItemId,
        rendered_height: f32,
    ) -> PlacedItem {
        let rendered_height = if rendered_height.is_finite() {
            rendered_height.max(0.0)
        } else {
            0.0
        };
        let column = self.shortest_column();
        let y_offset = self.columns[column].height;
        let placed = PlacedItem {
            original_index,
            identity,
            column,
            y_offset,
            rendered_height,
        };
        let state = &mut self.columns[column];
        state.items.push(placed);
        state.height += rendered_height + self.gap;
        self.by_index.insert(original_index, placed);
        placed
    }

    fn shortest_column(&self) -> usize {
        let mut best = 0;
        for (index, column) in self.columns.iter().enumerate().skip(1) {
            if column.height < self.columns[best].height {
                best = index;
            }
        }
        best
    }
}

/// Scales intrinsic media dimensions to a rendered height at a column width.
///
/// Degenerate intrinsic widths fall back to a square at the column width so
/// the result is always a usable height.
pub(crate) fn scaled_height(
    intrinsic_width: f32,
    intrinsic_height: f32,
    column_width: f32,
) -> f32 {
    let column_width = column_width.max(1.0);
    if intrinsic_width > 0.0 && intrinsic_height.is_finite() && intrinsic_height > 0.0 {
        intrinsic_height / intrinsic_width * column_width
    } else {
        column_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ItemId {
        ItemId(n)
    }

    #[test]
    fn test_place_fills_shortest_column_first() {
        let mut packer = ColumnPacker::new(3, 0.0);
        // Heights 30, 10, 20: third item should land under the 10-high column.
        packer.place(0, id(0), 30.0);
        packer.place(1, id(1), 10.0);
        packer.place(2, id(2), 20.0);
        let fourth = packer.place(3, id(3), 5.0);
        // Column 1 (10-high) was the shortest after three placements.
        assert_eq!(fourth.column, 1);
        assert_eq!(fourth.y_offset, 10.0);
    }

    #[test]
    fn test_ties_break_toward_lowest_column_index() {
        let mut packer = ColumnPacker::new(4, 0.0);
        let first = packer.place(0, id(0), 10.0);
        assert_eq!(first.column, 0);
        let second = packer.place(1, id(1), 10.0);
        assert_eq!(second.column, 1);
    }

    #[test]
    fn test_gap_contributes_to_column_height() {
        let mut packer = ColumnPacker::new(1, 8.0);
        packer.place(0, id(0), 100.0);
        let second = packer.place(1, id(1), 50.0);
        assert_eq!(second.y_offset, 108.0);
        assert_eq!(packer.columns()[0].height(), 166.0);
    }

    #[test]
    fn test_balance_bound_after_many_placements() {
        // After packing n items the tallest and shortest columns differ by at
        // most one item's height plus its gap.
        let mut packer = ColumnPacker::new(4, 4.0);
        let heights = [120.0, 80.0, 200.0, 45.0, 160.0, 90.0, 300.0, 60.0];
        let mut max_height: f32 = 0.0;
        for (i, h) in heights.iter().cycle().take(64).enumerate() {
            packer.place(i, id(i as u64), *h);
            max_height = max_height.max(*h);
        }
        let tallest = packer
            .columns()
            .iter()
            .map(ColumnState::height)
            .fold(0.0f32, f32::max);
        let shortest = packer
            .columns()
            .iter()
            .map(ColumnState::height)
            .fold(f32::INFINITY, f32::min);
        assert!(tallest - shortest <= max_height + 4.0);
    }

    #[test]
    fn test_reset_clears_all_columns() {
        let mut packer = ColumnPacker::new(4, 0.0);
        packer.place(0, id(0), 10.0);
        packer.reset(3, 2.0);
        assert_eq!(packer.column_count(), 3);
        assert_eq!(packer.placed_count(), 0);
        assert!(packer.columns().iter().all(|c| c.height() == 0.0));
    }

    #[test]
    fn test_scaled_height_follows_aspect_ratio() {
        assert_eq!(scaled_height(200.0, 100.0, 300.0), 150.0);
        // Degenerate widths fall back to a square.
        assert_eq!(scaled_height(0.0, 100.0, 300.0), 300.0);
        assert_eq!(scaled_height(-1.0, 100.0, 300.0), 300.0);
    }
}

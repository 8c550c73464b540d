//! Chunked pixel spans for viewport-visibility queries.
//!
//! Items are partitioned into fixed-size chunks of the filtered sequence;
//! each chunk records the union of the vertical spans of its placed items.
//! Scrolling asks which chunks overlap the viewport instead of testing
//! every item.

/// Recorded vertical span of one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSpan {
    /// Topmost pixel any item of the chunk reaches.
    pub start: f32,
    /// Bottommost pixel any item of the chunk reaches.
    pub end: f32,
}

/// Maps chunk indices to their recorded pixel spans.
///
/// Spans only ever widen within a dataset epoch: recording merges by taking
/// the min of starts and the max of ends. Shrinking only happens through
/// [`ChunkIndex::clear`] during a full reset.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChunkIndex {
    spans: Vec<Option<ChunkSpan>>,
}

impl ChunkIndex {
    /// Merges a span into the chunk's running bounds.
    pub(crate) fn record_span(&mut self, chunk: usize, start: f32, end: f32) {
        if chunk >= self.spans.len() {
            self.spans.resize(chunk + 1, None);
        }
        let merged = match self.spans[chunk] {
            Some(span) => ChunkSpan {
                start: span.start.min(start),
                end: span.end.max(end),
            },
            None => ChunkSpan { start, end },
        };
        self.spans[chunk] = Some(merged);
    }

    /// Recorded span of a chunk, if any of its items have been placed.
    #[cfg(test)]
    pub(crate) fn span(&self, chunk: usize) -> Option<ChunkSpan> {
        self.spans.get(chunk).copied().flatten()
    }

    /// Bottommost recorded pixel across all chunks.
    ///
    /// `None` means nothing has been recorded since the last reset; callers
    /// must treat that as "visibility unknown, default to the first window",
    /// not as "nothing visible".
    pub(crate) fn max_recorded_end(&self) -> Option<f32> {
        self.spans
            .iter()
            .flatten()
            .map(|span| span.end)
            .fold(None, |acc, end| Some(acc.map_or(end, |a: f32| a.max(end))))
    }

    /// Chunks whose recorded span overlaps `[viewport_start, viewport_end]`.
    pub(crate) fn visible_chunks(&self, viewport_start: f32, viewport_end: f32) -> Vec<usize> {
        self.spans
            .iter()
            .enumerate()
            .filter_map(|(chunk, span)| {
                let span = span.as_ref()?;
                (span.end >= viewport_start && span.start <= viewport_end).then_some(chunk)
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.spans.clear();
    }
}

/// Analytic span of a chunk in fixed-row list mode.
///
/// With a constant row height every chunk's bounds follow directly from its
/// index, so list mode never needs measurement to answer visibility
/// queries.
pub(crate) fn list_chunk_span(
    chunk: usize,
    chunk_size: usize,
    row_height: f32,
    gap: f32,
) -> ChunkSpan {
    let pitch = row_height + gap;
    let start = chunk as f32 * chunk_size as f32 * pitch;
    let end = start + chunk_size as f32 * pitch - gap;
    ChunkSpan { start, end }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_span_merges_bounds() {
        let mut index = ChunkIndex::default();
        index.record_span(0, 100.0, 200.0);
        index.record_span(0, 50.0, 150.0);
        index.record_span(0, 120.0, 260.0);
        let span = index.span(0).unwrap();
        assert_eq!(span.start, 50.0);
        assert_eq!(span.end, 260.0);
    }

    #[test]
    fn test_spans_only_widen() {
        let mut index = ChunkIndex::default();
        index.record_span(1, 10.0, 90.0);
        // A narrower recording must not shrink the bounds.
        index.record_span(1, 30.0, 60.0);
        let span = index.span(1).unwrap();
        assert_eq!(span.start, 10.0);
        assert_eq!(span.end, 90.0);
    }

    #[test]
    fn test_visible_chunks_overlap_query() {
        let mut index = ChunkIndex::default();
        index.record_span(0, 0.0, 400.0);
        index.record_span(1, 380.0, 900.0);
        index.record_span(2, 880.0, 1400.0);
        assert_eq!(index.visible_chunks(0.0, 300.0), vec![0]);
        assert_eq!(index.visible_chunks(390.0, 895.0), vec![0, 1, 2]);
        assert_eq!(index.visible_chunks(1500.0, 2000.0), Vec::<usize>::new());
    }

    #[test]
    fn test_empty_index_reports_unknown() {
        let index = ChunkIndex::default();
        assert!(index.visible_chunks(0.0, 100.0).is_empty());
        assert!(index.max_recorded_end().is_none());
    }

    #[test]
    fn test_max_recorded_end_tracks_bottom() {
        let mut index = ChunkIndex::default();
        index.record_span(0, 0.0, 500.0);
        index.record_span(3, 100.0, 320.0);
        assert_eq!(index.max_recorded_end(), Some(500.0));
    }

    #[test]
    fn test_clear_empties_index() {
        let mut index = ChunkIndex::default();
        index.record_span(0, 0.0, 10.0);
        index.clear();
        assert!(index.span(0).is_none());
        assert!(index.max_recorded_end().is_none());
    }

    #[test]
    fn test_list_chunk_span_is_contiguous() {
        let first = list_chunk_span(0, 16, 120.0, 0.0);
        let second = list_chunk_span(1, 16, 120.0, 0.0);
        assert_eq!(first.start, 0.0);
        assert_eq!(first.end, 16.0 * 120.0);
        assert_eq!(second.start, first.end);
    }
}

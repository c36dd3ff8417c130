use std::ops::Range;

use crate::TransferError;

/// Splits `0..total_len` into consecutive ranges of at most `chunk_size`.
///
/// An empty payload still yields exactly one (empty) range, so the remote
/// side gets a call and can create a zero-byte record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_len: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Creates a plan, rejecting a zero chunk size.
    pub fn new(total_len: usize, chunk_size: usize) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            total_len,
            chunk_size,
        })
    }

    /// Range of the chunk starting at `offset`.
    pub fn range_from(&self, offset: usize) -> Range<usize> {
        let start = offset.min(self.total_len);
        let end = self.total_len.min(start.saturating_add(self.chunk_size));
        start..end
    }

    /// Number of sink calls needed (at least one).
    pub fn total_chunks(&self) -> usize {
        self.total_len.div_ceil(self.chunk_size).max(1)
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Iterates over every chunk range in order.
    pub fn ranges(&self) -> ChunkRanges {
        ChunkRanges {
            plan: *self,
            offset: 0,
            started: false,
        }
    }
}

/// Iterator returned by [`ChunkPlan::ranges`].
#[derive(Debug, Clone)]
pub struct ChunkRanges {
    plan: ChunkPlan,
    offset: usize,
    started: bool,
}

impl Iterator for ChunkRanges {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && self.offset >= self.plan.total_len {
            return None;
        }
        self.started = true;
        let range = self.plan.range_from(self.offset);
        self.offset = range.end;
        Some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chunk_size_rejected() {
        let err = ChunkPlan::new(10, 0).unwrap_err();
        assert!(matches!(err, TransferError::InvalidChunkSize(0)));
    }

    #[test]
    fn ranges_cover_payload_exactly() {
        let plan = ChunkPlan::new(10, 4).unwrap();
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert_eq!(plan.total_chunks(), 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let plan = ChunkPlan::new(8, 4).unwrap();
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..4, 4..8]);
        assert_eq!(plan.total_chunks(), 2);
    }

    #[test]
    fn empty_payload_yields_one_empty_range() {
        let plan = ChunkPlan::new(0, 4).unwrap();
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..0]);
        assert_eq!(plan.total_chunks(), 1);
    }

    #[test]
    fn chunk_larger_than_payload() {
        let plan = ChunkPlan::new(3, 750_000).unwrap();
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..3]);
    }

    #[test]
    fn default_chunk_size_split() {
        let plan = ChunkPlan::new(1_500_001, crate::CHUNK_SIZE).unwrap();
        let lens: Vec<_> = plan.ranges().map(|r| r.len()).collect();
        assert_eq!(lens, vec![750_000, 750_000, 1]);
    }

    #[test]
    fn range_from_clamps_past_end() {
        let plan = ChunkPlan::new(5, 4).unwrap();
        assert_eq!(plan.range_from(4), 4..5);
        assert_eq!(plan.range_from(9), 5..5);
    }
}

//! Alignment data structures (spec.md §3): [`SegmentPair`], [`Alignment`],
//! and [`UnsplitAlignment`] (the split-alignment engine's input format).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentPair {
    pub start1: u64,
    pub start2: u64,
    pub size: u64,
    pub score: i32,
}

impl SegmentPair {
    pub fn new(start1: u64, start2: u64, size: u64, score: i32) -> Self {
        Self { start1, start2, size, score }
    }

    pub fn beg1(&self) -> u64 {
        self.start1
    }
    pub fn beg2(&self) -> u64 {
        self.start2
    }
    pub fn end1(&self) -> u64 {
        self.start1 + self.size
    }
    pub fn end2(&self) -> u64 {
        self.start2 + self.size
    }
    /// The anti-diagonal offset: constant along a gapless run.
    pub fn diagonal(&self) -> i64 {
        self.start1 as i64 - self.start2 as i64
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// The gapless blocks of the alignment, ordered by increasing position.
    pub blocks: Vec<SegmentPair>,
    pub score: i32,
    /// The seed this alignment grew from.
    pub seed: SegmentPair,
    /// Per-aligned-column match probability, parallel to the alignment
    /// columns, present only when Forward-Backward decoding ran.
    pub match_probabilities: Option<Vec<f64>>,
}

impl Alignment {
    pub fn from_segment_pair(sp: SegmentPair) -> Self {
        Self {
            score: sp.score,
            seed: sp,
            blocks: vec![sp],
            match_probabilities: None,
        }
    }

    pub fn beg1(&self) -> u64 {
        self.blocks.first().map_or(0, SegmentPair::beg1)
    }
    pub fn beg2(&self) -> u64 {
        self.blocks.first().map_or(0, SegmentPair::beg2)
    }
    pub fn end1(&self) -> u64 {
        self.blocks.last().map_or(0, SegmentPair::end1)
    }
    pub fn end2(&self) -> u64 {
        self.blocks.last().map_or(0, SegmentPair::end2)
    }

    /// Testable property #2 (spec.md §8): query/reference starts are
    /// non-decreasing across blocks and no two blocks overlap.
    pub fn blocks_are_monotonic(&self) -> bool {
        self.blocks.windows(2).all(|w| {
            let (a, b) = (w[0], w[1]);
            a.end1() <= b.beg1() && a.end2() <= b.beg2()
        })
    }

    /// Testable property #1: every emitted block has positive size and
    /// stays inside `[0, len1) x [0, len2)`.
    pub fn blocks_are_in_bounds(&self, len1: u64, len2: u64) -> bool {
        self.blocks
            .iter()
            .all(|b| !b.is_empty() && b.end1() <= len1 && b.end2() <= len2)
    }
}

/// A query strand, used throughout the CLI and split-alignment inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }
}

/// The split-alignment engine's input: a pre-aligned text pair with gap
/// characters, as produced by upstream `lastal`/MAF-reading tools
/// (spec.md §3, "UnsplitAlignment").
#[derive(Debug, Clone)]
pub struct UnsplitAlignment {
    pub rname: String,
    pub rstart: u64,
    pub rend: u64,
    pub qname: String,
    pub qstart: u64,
    pub qend: u64,
    pub qstrand: Strand,
    /// Aligned reference text, gap character `-`.
    pub ralign: Vec<u8>,
    /// Aligned query text, gap character `-`, same length as `ralign`.
    pub qalign: Vec<u8>,
    pub qquality: Option<Vec<u8>>,
    pub score: i32,
}

impl UnsplitAlignment {
    pub fn alignment_length(&self) -> usize {
        self.ralign.len()
    }

    /// Query-sequence length spanned, excluding gaps on the query side.
    pub fn query_span(&self) -> u64 {
        self.qend - self.qstart
    }

    pub fn reference_span(&self) -> u64 {
        self.rend - self.rstart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_pair_derives_end_and_diagonal() {
        let sp = SegmentPair::new(10, 3, 5, 7);
        assert_eq!(sp.end1(), 15);
        assert_eq!(sp.end2(), 8);
        assert_eq!(sp.diagonal(), 7);
    }

    #[test]
    fn monotonic_blocks_pass_and_overlapping_ones_fail() {
        let good = Alignment {
            blocks: vec![SegmentPair::new(0, 0, 3, 3), SegmentPair::new(6, 3, 3, 3)],
            ..Default::default()
        };
        assert!(good.blocks_are_monotonic());

        let bad = Alignment {
            blocks: vec![SegmentPair::new(0, 0, 5, 5), SegmentPair::new(3, 5, 3, 3)],
            ..Default::default()
        };
        assert!(!bad.blocks_are_monotonic());
    }

    #[test]
    fn blocks_out_of_bounds_are_rejected() {
        let a = Alignment {
            blocks: vec![SegmentPair::new(8, 0, 5, 5)],
            ..Default::default()
        };
        assert!(!a.blocks_are_in_bounds(10, 10));
    }
}

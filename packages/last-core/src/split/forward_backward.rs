//! Forward-Backward marginals over the candidate-chaining DAG (spec.md
//! §4.I), grounded in `original_source/split/cbrc_split_aligner.cc`'s
//! `forward`/`backward` sum-product passes (here run over whole candidates
//! rather than individual DP cells, since [`super::viterbi`] already
//! collapses each candidate's internal gapped alignment to one score).

use super::layout::Layout;
use super::viterbi::SplitAligner;

/// Sum-product forward/backward over the same transition structure
/// [`SplitAligner::viterbi`] maximizes over, giving each candidate a
/// posterior probability of belonging to the optimal split chain.
pub struct Marginals {
    pub forward: Vec<f64>,
    pub backward: Vec<f64>,
    pub partition: f64,
}

impl SplitAligner<'_> {
    pub fn forward_backward(&self, layout: &Layout) -> Marginals {
        let n = layout.candidates.len();
        let temperature = self.params.scale;
        let own_prob = |i: usize| (layout.candidates[i].alignment.score as f64 / temperature).exp();

        let mut forward = vec![0.0f64; n];
        for i in 0..n {
            let mut sum = (self.params.restart_score as f64 / temperature).exp();
            for p in 0..i {
                if layout.candidates[p].query_end > layout.candidates[i].query_beg + self.params.max_query_overlap {
                    continue;
                }
                let t = self.transition_prob(&layout.candidates[p], &layout.candidates[i]);
                sum += forward[p] * t;
            }
            forward[i] = sum * own_prob(i);
        }

        let mut backward = vec![0.0f64; n];
        for i in (0..n).rev() {
            let mut sum = 1.0;
            for q in (i + 1)..n {
                if layout.candidates[i].query_end > layout.candidates[q].query_beg + self.params.max_query_overlap {
                    continue;
                }
                let t = self.transition_prob(&layout.candidates[i], &layout.candidates[q]);
                sum += t * own_prob(q) * backward[q];
            }
            backward[i] = sum;
        }

        let partition: f64 = (0..n).map(|i| forward[i]).sum::<f64>().max(f64::MIN_POSITIVE);
        Marginals { forward, backward, partition }
    }

    fn transition_prob(&self, prev: &super::layout::Candidate, next: &super::layout::Candidate) -> f64 {
        (self.transition_score(prev, next) as f64 / self.params.scale).exp()
    }

    /// Ratio-test strand disambiguation (spec.md §4.I "strand
    /// disambiguation"), grounded in `spliceSignalStrandProb`: given the
    /// forward-strand and reverse-strand partition functions for the same
    /// query, the probability the alignment is on the forward strand.
    pub fn strand_probability(forward_partition: f64, reverse_partition: f64) -> f64 {
        if forward_partition <= 0.0 && reverse_partition <= 0.0 {
            return 0.5;
        }
        let r = reverse_partition / forward_partition;
        1.0 / (1.0 + r)
    }
}

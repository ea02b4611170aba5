//! Splice-signal scoring and the log-normal intron-length model (spec.md
//! §4.I), grounded verbatim in
//! `original_source/split/cbrc_split_aligner.cc`'s `setSpliceSignals` /
//! `setSpliceParams`.

/// One of the 16 two-base dinucleotide codes (`base1 * 4 + base2`, bases in
/// `A=0, C=1, G=2, T=3` order), plus index 16 standing for "contains an
/// ambiguous/delimiter base".
pub const DINUCLEOTIDE_COUNT: usize = 17;

#[derive(Debug, Clone)]
pub struct SpliceSignals {
    pub beg_scores: [i32; DINUCLEOTIDE_COUNT],
    pub end_scores: [i32; DINUCLEOTIDE_COUNT],
    pub beg_probs: [f64; DINUCLEOTIDE_COUNT],
    pub end_probs: [f64; DINUCLEOTIDE_COUNT],
}

fn score_from_prob(prob: f64, scale: f64) -> i32 {
    (scale * prob.ln() + 0.5).floor() as i32
}

impl SpliceSignals {
    /// Build the GT-AG (plus GC-AG, AT-AC, and a catch-all "NN") donor/
    /// acceptor signal table at a given score `scale` (the same scale used
    /// to convert between integer scores and probabilities elsewhere).
    pub fn new(scale: f64) -> Self {
        let d_gt = 0.95;
        let d_gc = 0.02;
        let d_at = 0.004;
        let d_nn = 0.002;

        let a_ag = 0.968;
        let a_ac = 0.004;
        let a_nn = 0.002;

        let d_avg = (d_gt + d_gc + d_at + d_nn * 13.0) / 16.0;
        let a_avg = (a_ag + a_ac + a_nn * 14.0) / 16.0;

        let mut beg_scores = [score_from_prob(d_nn / d_avg, scale); DINUCLEOTIDE_COUNT];
        let mut end_scores = [score_from_prob(a_nn / a_avg, scale); DINUCLEOTIDE_COUNT];

        beg_scores[2 * 4 + 3] = score_from_prob(d_gt / d_avg, scale); // GT
        beg_scores[2 * 4 + 1] = score_from_prob(d_gc / d_avg, scale); // GC
        beg_scores[0 * 4 + 3] = score_from_prob(d_at / d_avg, scale); // AT

        end_scores[0 * 4 + 2] = score_from_prob(a_ag / a_avg, scale); // AG
        end_scores[0 * 4 + 1] = score_from_prob(a_ac / a_avg, scale); // AC

        let mut beg_probs = [0.0; DINUCLEOTIDE_COUNT];
        let mut end_probs = [0.0; DINUCLEOTIDE_COUNT];
        for i in 0..DINUCLEOTIDE_COUNT {
            beg_probs[i] = (beg_scores[i] as f64 / scale).exp();
            end_probs[i] = (end_scores[i] as f64 / scale).exp();
        }

        Self { beg_scores, end_scores, beg_probs, end_probs }
    }
}

/// `base1 * 4 + base2`, or index 16 if either base is out of `0..4`
/// (ambiguous/delimiter).
pub fn dinucleotide_index(base1: u8, base2: u8) -> usize {
    if base1 < 4 && base2 < 4 {
        (base1 as usize) * 4 + base2 as usize
    } else {
        16
    }
}

/// The log-normal intron-length model: `meanLogDist`/`sdevLogDist` are fit
/// to observed intron lengths (the file's header comment records one such
/// fit: mean ln-distance 7.02, sdev 1.75), `splicePrior` scales the whole
/// density so that `sum over d of density(d) * splicePrior` integrates to
/// the overall probability of splicing at all.
#[derive(Debug, Clone, Copy)]
pub struct IntronLengthModel {
    pub splice_prior: f64,
    pub mean_log_dist: f64,
    pub sdev_log_dist: f64,
    term1: f64,
    term2: f64,
}

impl IntronLengthModel {
    pub fn new(splice_prior: f64, mean_log_dist: f64, sdev_log_dist: f64) -> Self {
        let (term1, term2) = if splice_prior > 0.0 {
            let root_two_pi = (8.0 * std::f64::consts::FRAC_PI_4).sqrt();
            (-((sdev_log_dist * root_two_pi) / splice_prior).ln(), -1.0 / (2.0 * sdev_log_dist * sdev_log_dist))
        } else {
            (0.0, 0.0)
        };
        Self { splice_prior, mean_log_dist, sdev_log_dist, term1, term2 }
    }

    /// `ln f(distance)`, the log-density of an intron of this length under
    /// the log-normal model, or `None` if splicing is disabled
    /// (`splice_prior <= 0`) or `distance <= 0`.
    pub fn log_density(&self, distance: i64) -> Option<f64> {
        if self.splice_prior <= 0.0 || distance <= 0 {
            return None;
        }
        let ln_d = (distance as f64).ln();
        let z = ln_d - self.mean_log_dist;
        Some(self.term1 + self.term2 * z * z - ln_d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gt_ag_scores_higher_than_catchall_signal() {
        let sig = SpliceSignals::new(100.0);
        let gt = sig.beg_scores[dinucleotide_index(2, 3)];
        let nn = sig.beg_scores[dinucleotide_index(1, 1)]; // CC, not a recognized donor dinucleotide
        assert!(gt > nn);
        let ag = sig.end_scores[dinucleotide_index(0, 2)];
        assert!(ag > sig.end_scores[dinucleotide_index(1, 1)]);
    }

    #[test]
    fn intron_length_model_disabled_when_prior_is_zero() {
        let model = IntronLengthModel::new(0.0, 7.0, 1.75);
        assert!(model.log_density(500).is_none());
    }

    #[test]
    fn intron_length_model_favors_the_fitted_mean_length() {
        let model = IntronLengthModel::new(0.01, 7.0, 1.75);
        let at_mean = model.log_density(7.0f64.exp() as i64).unwrap();
        let far_from_mean = model.log_density(5).unwrap();
        assert!(at_mean > far_from_mean);
    }
}

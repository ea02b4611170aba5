//! Forward and backward probability recursions over the three-matrix pair
//! HMM (spec.md §4.G), grounded in `original_source/Centroid.cc`'s
//! `forward`/`backward`.

use super::Centroid;

const UNDERFLOW_GUARD: f64 = 1e-300;

impl Centroid<'_> {
    /// Fill `f_m`/`f_d`/`f_i` over `[0, len1] x [0, len2]`, rescaling each
    /// row by the sum of its cells to avoid underflow; returns the log
    /// partition function `ln Z`.
    pub fn forward(&mut self) -> f64 {
        let (n, m) = (self.len1, self.len2);
        self.f_m = vec![vec![0.0; m + 1]; n + 1];
        self.f_d = vec![vec![0.0; m + 1]; n + 1];
        self.f_i = vec![vec![0.0; m + 1]; n + 1];
        self.scale = vec![1.0; n + 1];

        self.f_m[0][0] = 1.0;
        for i in 0..=n {
            let mut row_sum = 0.0;
            for j in 0..=m {
                if i == 0 && j == 0 {
                    row_sum += self.f_m[0][0];
                    continue;
                }
                let prev_scale = if i > 0 { self.scale[i - 1] } else { 1.0 };
                let m_prev = if i > 0 && j > 0 {
                    (self.f_m[i - 1][j - 1] + self.f_d[i - 1][j - 1] + self.f_i[i - 1][j - 1]) / prev_scale
                } else {
                    0.0
                };
                self.f_m[i][j] = if i > 0 && j > 0 { self.match_prob(i - 1, j - 1) * m_prev } else { 0.0 };

                self.f_d[i][j] = if i > 0 {
                    self.gap.del_open_prob * (self.f_m[i - 1][j] / prev_scale) + self.gap.del_grow_prob * (self.f_d[i - 1][j] / prev_scale)
                } else {
                    0.0
                };
                self.f_i[i][j] = if j > 0 {
                    self.gap.ins_open_prob * self.f_m[i][j - 1] + self.gap.ins_grow_prob * self.f_i[i][j - 1]
                } else {
                    0.0
                };

                row_sum += self.f_m[i][j] + self.f_d[i][j] + self.f_i[i][j];
            }
            self.scale[i] = row_sum.max(UNDERFLOW_GUARD);
        }

        self.z = self.f_m[n][m] + self.f_d[n][m] + self.f_i[n][m];
        self.scale.iter().map(|s| s.ln()).sum::<f64>() + self.z.max(UNDERFLOW_GUARD).ln()
    }

    /// Fill `b_m`/`b_d`/`b_i`, reusing the forward pass's per-row scale
    /// factors so posterior ratios `f * b / Z` stay well-scaled.
    pub fn backward(&mut self) {
        let (n, m) = (self.len1, self.len2);
        self.b_m = vec![vec![0.0; m + 1]; n + 1];
        self.b_d = vec![vec![0.0; m + 1]; n + 1];
        self.b_i = vec![vec![0.0; m + 1]; n + 1];

        self.b_m[n][m] = 1.0;
        self.b_d[n][m] = 1.0;
        self.b_i[n][m] = 1.0;

        for i in (0..=n).rev() {
            for j in (0..=m).rev() {
                if i == n && j == m {
                    continue;
                }
                let next_scale = self.scale.get(i).copied().unwrap_or(1.0);

                let from_match_diag = if i < n && j < m { self.match_prob(i, j) * self.b_m[i + 1][j + 1] } else { 0.0 };
                let from_del = if i < n { self.gap.del_open_prob * self.b_d[i + 1][j] } else { 0.0 };
                let from_ins = if j < m { self.gap.ins_open_prob * self.b_i[i][j + 1] } else { 0.0 };
                self.b_m[i][j] = (from_match_diag + from_del + from_ins) / next_scale;

                self.b_d[i][j] = if i < n { (self.gap.del_grow_prob * self.b_d[i + 1][j] + from_match_diag) / next_scale } else { 0.0 };
                self.b_i[i][j] = if j < m { self.gap.ins_grow_prob * self.b_i[i][j + 1] + from_match_diag } else { 0.0 };
            }
        }
    }

    /// Posterior probability that text position `i` is aligned to query
    /// position `j` (both 0-based within the extension's local window).
    pub fn match_probability(&self, i: usize, j: usize) -> f64 {
        if self.z <= 0.0 {
            return 0.0;
        }
        (self.f_m[i + 1][j + 1] * self.b_m[i + 1][j + 1]).min(1.0) / self.z
    }

    /// Accumulate expected transition/emission counts for this window, per
    /// `Centroid.hh::computeExpectedCounts`.
    pub fn compute_expected_counts(&self) -> super::ExpectedCount {
        let mut counts = super::ExpectedCount::default();
        if self.z <= 0.0 {
            return counts;
        }
        for i in 0..self.len1 {
            for j in 0..self.len2 {
                let p = self.match_probability(i, j);
                if p <= 0.0 {
                    continue;
                }
                let t = self.text[self.t_start + i];
                let q = self.query[self.q_start + j];
                if t == crate::alphabet::DELIMITER || q == crate::alphabet::DELIMITER {
                    continue;
                }
                counts.emit[(t & 63) as usize][(q & 63) as usize] += p;
                counts.mm += p;
            }
        }
        counts
    }
}

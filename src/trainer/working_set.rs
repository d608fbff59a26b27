//! Bounded working set of support entries
//!
//! Owns the `(sample, alpha, z)` triples the budgeted trainer operates on.
//! All structural mutation (insert, remove, ranked eviction) goes through
//! this type so that cached scores can be kept consistent at every step;
//! callers never hold references to entries across a mutation.

use crate::core::{Sample, SparseVector};
use crate::kernel::Kernel;

/// One retained support vector with its dual weight and cached score
#[derive(Debug, Clone)]
pub(crate) struct SupportEntry {
    pub sample: Sample,
    /// Signed dual weight: label * alpha lies in [0, C]
    pub alpha: f64,
    /// Cached decision score: sum of alpha_j * K(x_j, x) over all entries
    pub z: f64,
}

impl SupportEntry {
    /// Margin score y * z; below 1 means the entry violates the margin
    pub fn margin(&self) -> f64 {
        self.z * self.sample.label
    }
}

/// Where a ranked eviction stops removing entries
///
/// The eviction policies differ only in their ranking key and this cutoff
/// rule; the scan itself is shared.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cutoff {
    /// Remove every entry whose rank is strictly below the threshold
    Below(f64),
    /// Remove lowest-ranked entries until the set size reaches the target
    DownTo(usize),
}

/// Ordered collection of support entries
#[derive(Debug, Default)]
pub(crate) struct WorkingSet {
    entries: Vec<SupportEntry>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuild a working set from samples and signed alphas, recomputing
    /// every cached score from scratch.
    pub fn from_parts<K: Kernel>(kernel: &K, samples: Vec<Sample>, alphas: Vec<f64>) -> Self {
        let entries = samples
            .into_iter()
            .zip(alphas)
            .map(|(sample, alpha)| SupportEntry {
                sample,
                alpha,
                z: 0.0,
            })
            .collect();
        let mut set = Self { entries };
        set.rebuild_scores(kernel);
        set
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> &SupportEntry {
        &self.entries[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupportEntry> {
        self.entries.iter()
    }

    /// Decision score for an arbitrary input: sum of alpha_i * K(x_i, x).
    /// Returns 0 for an empty set.
    pub fn score_of<K: Kernel>(&self, kernel: &K, x: &SparseVector) -> f64 {
        self.entries
            .iter()
            .map(|e| e.alpha * kernel.compute(&e.sample.features, x))
            .sum()
    }

    /// Index of the entry holding an equal sample, if any
    pub fn position_of(&self, sample: &Sample) -> Option<usize> {
        self.entries.iter().position(|e| &e.sample == sample)
    }

    /// Append a fresh entry with zero weight and a precomputed score.
    /// Returns its index.
    pub fn push(&mut self, sample: Sample, z: f64) -> usize {
        self.entries.push(SupportEntry {
            sample,
            alpha: 0.0,
            z,
        });
        self.entries.len() - 1
    }

    pub fn remove(&mut self, i: usize) -> SupportEntry {
        self.entries.remove(i)
    }

    pub fn set_alpha(&mut self, i: usize, alpha: f64) {
        self.entries[i].alpha = alpha;
    }

    /// Kernel values between entry `i` and every entry (including itself,
    /// at position `i`)
    pub fn kernel_row<K: Kernel>(&self, kernel: &K, i: usize) -> Vec<f64> {
        let xi = &self.entries[i].sample.features;
        self.entries
            .iter()
            .map(|e| kernel.compute(xi, &e.sample.features))
            .collect()
    }

    /// Propagate a weight change to every cached score: z_s += delta * row_s
    pub fn apply_delta(&mut self, delta: f64, row: &[f64]) {
        for (e, k) in self.entries.iter_mut().zip(row) {
            e.z += delta * k;
        }
    }

    /// Sort ascending by margin score, most violated entries first
    pub fn sort_by_margin(&mut self) {
        self.entries
            .sort_by(|a, b| a.margin().total_cmp(&b.margin()));
    }

    /// Drop every entry with exactly zero weight. Score-neutral, so no
    /// retraction is needed. Returns the number removed.
    pub fn remove_zero_alpha(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.alpha != 0.0);
        before - self.entries.len()
    }

    /// Ranked eviction: sort ascending by `rank`, remove the lowest-ranked
    /// prefix per the cutoff rule, then retract the removed entries' kernel
    /// contributions from every survivor's cached score. Returns the number
    /// removed.
    pub fn evict_ranked<K, F>(&mut self, kernel: &K, rank: F, cutoff: Cutoff) -> usize
    where
        K: Kernel,
        F: Fn(&SupportEntry) -> f64,
    {
        self.entries.sort_by(|a, b| rank(a).total_cmp(&rank(b)));

        let cut = match cutoff {
            Cutoff::Below(threshold) => self
                .entries
                .iter()
                .position(|e| rank(e) >= threshold)
                .unwrap_or(self.entries.len()),
            Cutoff::DownTo(target) => self.entries.len().saturating_sub(target),
        };
        if cut == 0 {
            return 0;
        }

        let removed: Vec<SupportEntry> = self.entries.drain(..cut).collect();
        self.retract(kernel, &removed);
        removed.len()
    }

    /// Subtract removed entries' contributions from every survivor's score
    fn retract<K: Kernel>(&mut self, kernel: &K, removed: &[SupportEntry]) {
        for sv in removed {
            if sv.alpha == 0.0 {
                continue;
            }
            for e in &mut self.entries {
                e.z -= sv.alpha * kernel.compute(&sv.sample.features, &e.sample.features);
            }
        }
    }

    /// Recompute every cached score with a full O(n^2) kernel sum
    pub fn rebuild_scores<K: Kernel>(&mut self, kernel: &K) {
        let scores: Vec<f64> = self
            .entries
            .iter()
            .map(|e| self.score_of(kernel, &e.sample.features))
            .collect();
        for (e, z) in self.entries.iter_mut().zip(scores) {
            e.z = z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::kernel::LinearKernel;
    use approx::assert_relative_eq;

    fn sample(value: f64, label: f64) -> Sample {
        Sample::new(SparseVector::new(vec![0], vec![value]), label)
    }

    fn set_with(kernel: &LinearKernel, entries: &[(f64, f64, f64)]) -> WorkingSet {
        // (value, label, alpha)
        let samples: Vec<Sample> = entries.iter().map(|&(v, y, _)| sample(v, y)).collect();
        let alphas: Vec<f64> = entries.iter().map(|&(_, _, a)| a).collect();
        WorkingSet::from_parts(kernel, samples, alphas)
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let set = WorkingSet::new();
        let kernel = LinearKernel::new();
        let x = SparseVector::new(vec![0], vec![1.0]);
        assert_eq!(set.score_of(&kernel, &x), 0.0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_push_and_position_of() {
        let mut set = WorkingSet::new();
        let s = sample(2.0, 1.0);
        let i = set.push(s.clone(), 0.5);
        assert_eq!(i, 0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.position_of(&s), Some(0));
        assert_eq!(set.position_of(&sample(3.0, 1.0)), None);

        let e = set.get(0);
        assert_eq!(e.alpha, 0.0);
        assert_eq!(e.z, 0.5);
    }

    #[test]
    fn test_from_parts_rebuilds_scores() {
        let kernel = LinearKernel::new();
        let set = set_with(&kernel, &[(2.0, 1.0, 0.5), (-1.0, -1.0, -0.25)]);

        // z_0 = 0.5 * (2*2) + (-0.25) * (-1*2) = 2.0 + 0.5 = 2.5
        assert_relative_eq!(set.get(0).z, 2.5);
        // z_1 = 0.5 * (2*-1) + (-0.25) * (-1*-1) = -1.0 - 0.25 = -1.25
        assert_relative_eq!(set.get(1).z, -1.25);
    }

    #[test]
    fn test_apply_delta_matches_rebuild() {
        let kernel = LinearKernel::new();
        let mut set = set_with(&kernel, &[(2.0, 1.0, 0.5), (-1.0, -1.0, -0.25)]);

        let row = set.kernel_row(&kernel, 0);
        assert_eq!(row, vec![4.0, -2.0]);

        set.set_alpha(0, 0.75);
        set.apply_delta(0.25, &row);

        let mut expected = set_with(&kernel, &[(2.0, 1.0, 0.75), (-1.0, -1.0, -0.25)]);
        expected.rebuild_scores(&kernel);
        for (got, want) in set.iter().zip(expected.iter()) {
            assert_relative_eq!(got.z, want.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_remove_zero_alpha() {
        let kernel = LinearKernel::new();
        let mut set = set_with(
            &kernel,
            &[(2.0, 1.0, 0.5), (1.0, 1.0, 0.0), (-1.0, -1.0, -0.25)],
        );
        let removed = set.remove_zero_alpha();
        assert_eq!(removed, 1);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|e| e.alpha != 0.0));
    }

    #[test]
    fn test_evict_ranked_below_threshold_retracts() {
        let kernel = LinearKernel::new();
        let mut set = set_with(
            &kernel,
            &[(2.0, 1.0, 0.5), (-2.0, -1.0, -0.5), (0.1, 1.0, 0.2)],
        );

        // Rank by margin; everything strictly below 1 goes
        let removed = set.evict_ranked(&kernel, |e| e.margin(), Cutoff::Below(1.0));
        assert_eq!(removed, 1);
        assert!(set.iter().all(|e| e.margin() >= 1.0));

        // Survivors' scores must match a from-scratch recomputation
        let survivors: Vec<(f64, f64)> = set.iter().map(|e| (e.alpha, e.z)).collect();
        set.rebuild_scores(&kernel);
        for ((_, cached), fresh) in survivors.iter().zip(set.iter()) {
            assert_relative_eq!(*cached, fresh.z, epsilon = 1e-12);
        }
        assert_eq!(removed + set.len(), 3);
    }

    #[test]
    fn test_evict_ranked_down_to_target() {
        let kernel = LinearKernel::new();
        let mut set = set_with(
            &kernel,
            &[(2.0, 1.0, 0.9), (1.0, 1.0, 0.1), (-1.5, -1.0, -0.5)],
        );

        let removed = set.evict_ranked(&kernel, |e| e.alpha.abs(), Cutoff::DownTo(2));
        assert_eq!(removed, 1);
        assert_eq!(set.len(), 2);
        // The smallest-magnitude weight was the one cut
        assert!(set.iter().all(|e| e.alpha.abs() > 0.1));

        // Scores stay consistent after retraction
        let cached: Vec<f64> = set.iter().map(|e| e.z).collect();
        set.rebuild_scores(&kernel);
        for (c, e) in cached.iter().zip(set.iter()) {
            assert_relative_eq!(*c, e.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_evict_ranked_noop_when_under_target() {
        let kernel = LinearKernel::new();
        let mut set = set_with(&kernel, &[(2.0, 1.0, 0.5)]);
        let removed = set.evict_ranked(&kernel, |e| e.alpha.abs(), Cutoff::DownTo(4));
        assert_eq!(removed, 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sort_by_margin_ascending() {
        let kernel = LinearKernel::new();
        let mut set = set_with(
            &kernel,
            &[(2.0, 1.0, 0.5), (-2.0, -1.0, -0.5), (0.5, 1.0, 0.1)],
        );
        set.sort_by_margin();
        let margins: Vec<f64> = set.iter().map(|e| e.margin()).collect();
        assert!(margins.windows(2).all(|w| w[0] <= w[1]));
    }
}

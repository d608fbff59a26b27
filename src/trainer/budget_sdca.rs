//! Budgeted stochastic dual coordinate ascent trainer
//!
//! Online kernel SVM training with a bounded working set of support
//! vectors, after "Stochastic Dual Coordinate Ascent Methods for
//! Regularized Loss Minimization" (Shalev-Shwartz & Zhang, JMLR 2013),
//! adapted for a hard budget on the number of retained support vectors.
//!
//! Samples arrive one at a time; margin violators are inserted into the
//! working set and optimized with a closed-form single-coordinate dual
//! update. When the set outgrows a soft capacity threshold, eviction
//! policies (zero-weight, error-based, magnitude-based) cut it back to the
//! budget while keeping every survivor's cached decision score consistent.

use crate::core::{DecisionModel, OnlineTrainer, Sample, SdcaConfig, SparseVector};
use crate::kernel::Kernel;
use crate::trainer::working_set::{Cutoff, WorkingSet};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Online budgeted kernel SVM classifier
///
/// The working set lives behind a single lock; training, pruning, and
/// scoring each hold it for their whole critical section, so a trainer
/// shared across threads (e.g. one thread training while another queries
/// [`value_of`](Self::value_of)) always observes a consistent set.
///
/// Sweeps are not interruptible: a reprocessing pass runs
/// O(epochs * set^2) kernel evaluations under the lock.
pub struct BudgetSdca<K: Kernel> {
    kernel: Arc<K>,
    config: SdcaConfig,
    set: Mutex<WorkingSet>,
}

impl<K: Kernel> BudgetSdca<K> {
    /// Create a trainer with default parameters
    pub fn new(kernel: K) -> Self {
        Self::with_config(kernel, SdcaConfig::default())
    }

    /// Create a trainer with explicit parameters
    pub fn with_config(kernel: K, config: SdcaConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
            set: Mutex::new(WorkingSet::new()),
        }
    }

    fn working_set(&self) -> MutexGuard<'_, WorkingSet> {
        // A poisoning panic cannot leave the set half-mutated in a way the
        // algorithm cares about, so recover the inner value
        self.set.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Single-sample online update
    pub fn train(&self, sample: &Sample) {
        self.add_sample(sample);
    }

    /// Train on a finite batch through the same sequential stream path
    pub fn train_batch(&self, samples: &[Sample]) {
        self.online_train(samples.iter().cloned());
    }

    /// Pull a sample stream to exhaustion, then run one reprocessing pass
    /// and prune if the working set is still over budget
    pub fn online_train<I>(&self, stream: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut seen = 0usize;
        for sample in stream {
            self.add_sample(&sample);
            seen += 1;
        }

        let mut set = self.working_set();
        self.reprocess(&mut set);
        if set.len() > self.config.budget {
            self.prune_locked(&mut set);
        }
        debug!(
            "online_train: {} samples seen, {} support vectors retained (budget {})",
            seen,
            set.len(),
            self.config.budget
        );
    }

    /// Raw decision score for an input: sum of alpha_i * K(x_i, x) over
    /// the working set. Returns 0 when no support vectors are retained.
    pub fn value_of(&self, x: &SparseVector) -> f64 {
        self.working_set().score_of(self.kernel.as_ref(), x)
    }

    /// Explicit pruning trigger
    ///
    /// Returns whether the working set was over budget at entry; a second
    /// call with no intervening training is a no-op returning `false`.
    pub fn prune(&self) -> bool {
        let mut set = self.working_set();
        self.prune_locked(&mut set)
    }

    /// Signed dual weights (alpha_i * y_i) in working-set order
    pub fn alphas(&self) -> Vec<f64> {
        self.working_set()
            .iter()
            .map(|e| e.alpha * e.sample.label)
            .collect()
    }

    /// Retained support samples in working-set order
    pub fn support_samples(&self) -> Vec<Sample> {
        self.working_set().iter().map(|e| e.sample.clone()).collect()
    }

    /// Number of retained support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.working_set().len()
    }

    /// Rebuild the working set from samples with their signed dual weights,
    /// recomputing all cached scores. Used when loading a saved model.
    pub fn restore(&self, samples: Vec<Sample>, alphas: Vec<f64>) {
        let rebuilt = WorkingSet::from_parts(self.kernel.as_ref(), samples, alphas);
        *self.working_set() = rebuilt;
    }

    // Configuration accessors. Changes affect subsequent operations only;
    // nothing is re-optimized retroactively.

    pub fn c(&self) -> f64 {
        self.config.c
    }

    pub fn set_c(&mut self, c: f64) {
        self.config.c = c;
    }

    pub fn epochs(&self) -> usize {
        self.config.epochs
    }

    pub fn set_epochs(&mut self, epochs: usize) {
        self.config.epochs = epochs;
    }

    pub fn budget(&self) -> usize {
        self.config.budget
    }

    pub fn set_budget(&mut self, budget: usize) {
        self.config.budget = budget;
    }

    pub fn capacity(&self) -> f64 {
        self.config.capacity
    }

    pub fn set_capacity(&mut self, capacity: f64) {
        self.config.capacity = capacity;
    }

    pub fn kernel(&self) -> &K {
        self.kernel.as_ref()
    }

    pub fn set_kernel(&mut self, kernel: K) {
        self.kernel = Arc::new(kernel);
    }

    pub fn config(&self) -> &SdcaConfig {
        &self.config
    }

    /// Evaluate a candidate against the current model and insert or refresh
    /// it if it violates the margin
    fn add_sample(&self, t: &Sample) {
        let mut set = self.working_set();
        let z = set.score_of(self.kernel.as_ref(), &t.features);
        let yz = z * t.label;

        // Margin violation plus a gradient feasibility check: skip samples
        // whose immediate update would clip straight back to zero
        let self_k = self.kernel.compute(&t.features, &t.features);
        if yz >= 1.0 || yz + self.config.c * self_k <= 0.0 {
            return;
        }

        match set.position_of(t) {
            Some(i) => {
                self.update_entry(&mut set, i);
            }
            None => {
                let i = set.push(t.clone(), z);
                self.update_entry(&mut set, i);
            }
        }

        if set.len() as f64 > self.config.capacity * self.config.budget as f64 {
            self.prune_locked(&mut set);
        }
    }

    /// Closed-form dual update of one coordinate, with score propagation
    /// to every entry. Returns true if the weight clipped to zero and the
    /// entry was removed.
    ///
    /// Two-phase: the new weight and the full kernel row are computed
    /// first, the structural removal happens only after propagation.
    fn update_entry(&self, set: &mut WorkingSet, i: usize) -> bool {
        let (y, z, prev) = {
            let e = set.get(i);
            (e.sample.label, e.z, e.alpha)
        };
        if y * z == 1.0 {
            return false;
        }

        let row = set.kernel_row(self.kernel.as_ref(), i);
        let da = (1.0 - y * z) / row[i];
        let alpha = y * (da + y * prev).min(self.config.c).max(0.0);
        let delta = alpha - prev;

        if delta != 0.0 {
            set.apply_delta(delta, &row);
        }
        set.set_alpha(i, alpha);

        if alpha == 0.0 {
            set.remove(i);
            true
        } else {
            false
        }
    }

    /// Re-optimize every retained entry, most-violated first, for the
    /// configured number of passes
    fn reprocess(&self, set: &mut WorkingSet) {
        let start = Instant::now();
        for _ in 0..self.config.epochs {
            // Updates reorder violation severity, so each pass re-sorts
            set.sort_by_margin();
            let mut i = 0;
            while i < set.len() {
                if !self.update_entry(set, i) {
                    i += 1;
                }
            }
        }
        debug!(
            "reprocess: {} entries, {} passes, {:?}",
            set.len(),
            self.config.epochs,
            start.elapsed()
        );
    }

    /// Apply the eviction policies in order until the set fits the budget.
    /// Returns whether the set was over budget at entry.
    fn prune_locked(&self, set: &mut WorkingSet) -> bool {
        if set.len() <= self.config.budget {
            return false;
        }

        // Stabilize weights and scores before deciding what to cut
        self.reprocess(set);
        let removed = set.remove_zero_alpha();
        debug!("prune: zero-alpha removed {removed}");

        if set.len() > self.config.budget {
            self.prune_error(set);
            if set.len() > self.config.budget {
                self.reprocess(set);
                self.prune_low_alpha(set);
            }
        }
        true
    }

    /// Cut the most-violated entries: everything strictly below the margin
    /// of the entry that would just fit the budget, clipped to at most 1
    fn prune_error(&self, set: &mut WorkingSet) {
        set.sort_by_margin();
        let pivot = set.len() - self.config.budget;
        let threshold = set.get(pivot).margin().min(1.0);
        let removed = set.evict_ranked(
            self.kernel.as_ref(),
            |e| e.margin(),
            Cutoff::Below(threshold),
        );
        debug!("prune: error-based removed {removed} below margin {threshold:.6}");
    }

    /// Cut the smallest-magnitude weights until the set fits the budget
    fn prune_low_alpha(&self, set: &mut WorkingSet) {
        let removed = set.evict_ranked(
            self.kernel.as_ref(),
            |e| e.alpha.abs(),
            Cutoff::DownTo(self.config.budget),
        );
        debug!("prune: low-alpha removed {removed}");
    }
}

impl<K: Kernel> DecisionModel for BudgetSdca<K> {
    fn decision_function(&self, x: &SparseVector) -> f64 {
        self.value_of(x)
    }
}

impl<K: Kernel> OnlineTrainer for BudgetSdca<K> {
    fn train_one(&mut self, sample: &Sample) {
        self.train(sample);
    }

    fn train_online<I>(&mut self, stream: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        BudgetSdca::online_train(self, stream);
    }
}

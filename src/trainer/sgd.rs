//! Plain (non-budgeted) linear SVM trainer using stochastic gradient descent
//!
//! After "Large-Scale Machine Learning with Stochastic Gradient Descent"
//! (Bottou, COMPSTAT 2010). Keeps an explicit dense weight vector instead of
//! a support-vector set, so memory is bounded by the feature dimension and
//! no budget management is needed. Useful as the cheap baseline next to
//! [`BudgetSdca`](crate::trainer::BudgetSdca).

use crate::core::{DecisionModel, OnlineTrainer, Sample, SparseVector};

/// Loss function for the SGD update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
    /// Standard hinge loss
    #[default]
    Hinge,
    /// Smoothed hinge loss
    SmoothHinge,
    /// Squared hinge loss
    SquaredHinge,
    /// Logistic loss
    Log,
    /// Logistic loss with margin
    LogMargin,
}

impl Loss {
    /// Derivative of the loss with respect to the margin z
    fn dloss(&self, z: f64) -> f64 {
        match self {
            Loss::Log => {
                if z < 0.0 {
                    1.0 / (z.exp() + 1.0)
                } else {
                    let ez = (-z).exp();
                    ez / (ez + 1.0)
                }
            }
            Loss::LogMargin => {
                if z < 1.0 {
                    1.0 / ((z - 1.0).exp() + 1.0)
                } else {
                    let ez = (1.0 - z).exp();
                    ez / (ez + 1.0)
                }
            }
            Loss::SmoothHinge => {
                if z < 0.0 {
                    1.0
                } else if z < 1.0 {
                    1.0 - z
                } else {
                    0.0
                }
            }
            Loss::SquaredHinge => {
                if z < 1.0 {
                    1.0 - z
                } else {
                    0.0
                }
            }
            Loss::Hinge => {
                if z < 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Log-family losses update on every sample; hinge-family only inside
    /// the margin
    fn always_updates(&self) -> bool {
        matches!(self, Loss::Log | Loss::LogMargin)
    }
}

/// Linear SVM classifier trained by stochastic gradient descent
pub struct LinearSgd {
    w: Vec<f64>,
    bias: f64,
    has_bias: bool,
    // Weight-scale trick: w is stored unscaled, the decay multiplies
    // wscale instead of every coordinate
    wscale: f64,
    t: u64,
    lambda: f64,
    epochs: usize,
    loss: Loss,
}

impl LinearSgd {
    pub fn new() -> Self {
        Self {
            w: Vec::new(),
            bias: 0.0,
            has_bias: true,
            wscale: 1.0,
            t: 0,
            lambda: 1e-4,
            epochs: 5,
            loss: Loss::Hinge,
        }
    }

    /// Shift t so the initial learning rate is reasonable, assuming
    /// |x| is roughly 1
    fn init_schedule(&mut self) {
        self.wscale = 1.0;
        self.bias = 0.0;
        let maxw = 1.0 / self.lambda.sqrt();
        let typw = maxw.sqrt();
        let eta0 = typw / self.loss.dloss(-typw).max(1.0);
        self.t = (1.0 / (eta0 * self.lambda)) as u64;
    }

    fn ensure_dim(&mut self, x: &SparseVector) {
        if let Some(&max_idx) = x.indices.last() {
            if max_idx >= self.w.len() {
                self.w.resize(max_idx + 1, 0.0);
            }
        }
    }

    fn dot(&self, x: &SparseVector) -> f64 {
        x.indices
            .iter()
            .zip(x.values.iter())
            .map(|(&i, &v)| self.w.get(i).copied().unwrap_or(0.0) * v)
            .sum()
    }

    /// One SGD step on a single sample
    fn step(&mut self, sample: &Sample) {
        self.ensure_dim(&sample.features);

        let eta = 1.0 / (self.lambda * self.t as f64);
        self.wscale *= 1.0 - eta * self.lambda;
        if self.wscale < 1e-9 {
            for v in &mut self.w {
                *v *= self.wscale;
            }
            self.wscale = 1.0;
        }

        let y = sample.label;
        let wx = self.dot(&sample.features) * self.wscale;
        let z = y * (wx + self.bias);

        if z < 1.0 || self.loss.always_updates() {
            let etd = eta * self.loss.dloss(z);
            for (&i, &v) in sample
                .features
                .indices
                .iter()
                .zip(sample.features.values.iter())
            {
                self.w[i] += v * etd * y / self.wscale;
            }
            // Slower rate on the bias because it learns at each iteration
            if self.has_bias {
                self.bias += etd * y * 0.01;
            }
        }
        self.t += 1;
    }

    /// Batch training: fixed number of epochs over the list
    pub fn train(&mut self, samples: &[Sample]) {
        if samples.is_empty() {
            return;
        }
        self.w.clear();
        self.init_schedule();
        for _ in 0..self.epochs {
            self.train_once(samples);
        }
    }

    /// One epoch over the given list
    pub fn train_once(&mut self, samples: &[Sample]) {
        for sample in samples {
            self.step(sample);
        }
    }

    /// Current weight vector (unscaled by wscale)
    pub fn weights(&self) -> Vec<f64> {
        self.w.iter().map(|&v| v * self.wscale).collect()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn set_loss(&mut self, loss: Loss) {
        self.loss = loss;
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn set_epochs(&mut self, epochs: usize) {
        self.epochs = epochs;
    }

    pub fn has_bias(&self) -> bool {
        self.has_bias
    }

    pub fn set_has_bias(&mut self, has_bias: bool) {
        self.has_bias = has_bias;
        if !has_bias {
            self.bias = 0.0;
        }
    }
}

impl Default for LinearSgd {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionModel for LinearSgd {
    fn decision_function(&self, x: &SparseVector) -> f64 {
        self.dot(x) * self.wscale + self.bias
    }
}

impl OnlineTrainer for LinearSgd {
    fn train_one(&mut self, sample: &Sample) {
        if self.t == 0 {
            self.init_schedule();
        }
        self.step(sample);
    }
}

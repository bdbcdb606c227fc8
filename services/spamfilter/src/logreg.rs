//! Binary logistic regression over sparse TF-IDF rows.
//!
//! Trained with plain batch gradient descent plus L2 regularization. The
//! rows coming out of the vectorizer are L2-normalized, so a fixed
//! learning rate converges without per-feature scaling.

use serde::{Deserialize, Serialize};

/// Optimizer knobs for [`LogisticRegression::fit`].
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub l2: f64,
    /// Stop early once the loss improves by less than this between
    /// iterations.
    pub tolerance: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 1.0,
            max_iterations: 200,
            l2: 1e-4,
            tolerance: 1e-6,
        }
    }
}

/// A fitted binary classifier. Serializable as part of the model artifact.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    /// Fits the classifier on sparse rows with 0/1 labels.
    ///
    /// `n_features` is the vectorizer's vocabulary size; every row index
    /// must be below it.
    pub fn fit(
        rows: &[Vec<(usize, f64)>],
        labels: &[u8],
        n_features: usize,
        options: &TrainOptions,
    ) -> Self {
        assert_eq!(rows.len(), labels.len());
        let n = rows.len() as f64;
        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        let mut prev_loss = f64::INFINITY;

        for _ in 0..options.max_iterations {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;
            let mut loss = 0.0;

            for (row, &label) in rows.iter().zip(labels) {
                let y = f64::from(label);
                let p = sigmoid(Self::score(&weights, bias, row));
                let residual = p - y;
                for &(index, value) in row {
                    grad_w[index] += residual * value;
                }
                grad_b += residual;

                let p_clamped = p.clamp(1e-12, 1.0 - 1e-12);
                loss -= y * p_clamped.ln() + (1.0 - y) * (1.0 - p_clamped).ln();
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= options.learning_rate * (g / n + options.l2 * *w);
            }
            bias -= options.learning_rate * grad_b / n;

            loss /= n;
            loss += options.l2 / 2.0 * weights.iter().map(|w| w * w).sum::<f64>();
            if (prev_loss - loss).abs() < options.tolerance {
                break;
            }
            prev_loss = loss;
        }

        Self { weights, bias }
    }

    fn score(weights: &[f64], bias: f64, row: &[(usize, f64)]) -> f64 {
        bias + row
            .iter()
            .map(|&(index, value)| weights[index] * value)
            .sum::<f64>()
    }

    /// Probability of the positive (spam) class.
    pub fn predict_proba(&self, row: &[(usize, f64)]) -> f64 {
        sigmoid(Self::score(&self.weights, self.bias, row))
    }

    /// Hard 0/1 prediction at the 0.5 threshold.
    pub fn predict(&self, row: &[(usize, f64)]) -> u8 {
        u8::from(self.predict_proba(row) >= 0.5)
    }
}

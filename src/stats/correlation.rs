//! Pairwise Pearson correlation across named metric streams.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Magnitude label for a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.3 {
            CorrelationStrength::Moderate
        } else if magnitude >= 0.1 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::None
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationStrength::None => write!(f, "none"),
            CorrelationStrength::Weak => write!(f, "weak"),
            CorrelationStrength::Moderate => write!(f, "moderate"),
            CorrelationStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Sign label for a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

impl CorrelationDirection {
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            CorrelationDirection::Positive
        } else if r < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::None
        }
    }
}

/// One unordered pair of distinct metrics with its labelled coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub metric_a: String,
    pub metric_b: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

/// Symmetric matrix of correlation coefficients with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Metric names, in row/column order.
    metrics: Vec<String>,
    /// Row-major coefficients.
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Coefficient between two metrics, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    /// Every unordered pair of distinct metrics.
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.metrics.len() {
            for j in (i + 1)..self.metrics.len() {
                let r = self.values[i][j];
                pairs.push(CorrelationPair {
                    metric_a: self.metrics[i].clone(),
                    metric_b: self.metrics[j].clone(),
                    coefficient: r,
                    strength: CorrelationStrength::from_coefficient(r),
                    direction: CorrelationDirection::from_coefficient(r),
                });
            }
        }
        pairs
    }

    /// Pairs at or above `min_strength`, strongest first.
    pub fn significant(&self, min_strength: CorrelationStrength) -> Vec<CorrelationPair> {
        let mut pairs: Vec<CorrelationPair> = self
            .pairs()
            .into_iter()
            .filter(|p| p.strength >= min_strength)
            .collect();
        pairs.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        pairs
    }

    fn index_of(&self, metric: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric)
    }
}

/// Pearson coefficient over the most recent common length of two series.
///
/// Returns 0 when either series has zero variance or fewer than two points.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    if len < 2 {
        return 0.0;
    }
    let a = &a[a.len() - len..];
    let b = &b[b.len() - len..];

    let mean_a = super::mean(a);
    let mean_b = super::mean(b);

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }

    (covariance / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

/// Builds correlation matrices from named series.
pub struct PearsonCorrelationMatrix;

impl PearsonCorrelationMatrix {
    pub fn compute(streams: &BTreeMap<String, Vec<f64>>) -> CorrelationMatrix {
        let metrics: Vec<String> = streams.keys().cloned().collect();
        let series: Vec<&Vec<f64>> = streams.values().collect();
        let n = metrics.len();

        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let r = pearson(series[i], series[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix { metrics, values }
    }
}

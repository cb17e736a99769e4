//! Greedy similarity clustering of error patterns.
//!
//! Clustering is a single pass over the patterns in their given order. The
//! first unclustered pattern seeds a cluster and absorbs every later
//! unclustered pattern whose similarity to the seed reaches the threshold.
//! Membership is decided against the seed only, and an assigned pattern is
//! never reconsidered, so the result depends on pattern order. Callers that
//! need reproducible clusters must supply patterns in a stable order (the
//! aggregator emits them in first-seen order).

use super::aggregate::IMPACT_DIMENSION_CAP;
use super::ErrorPattern;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const COMPONENT_WEIGHT: f64 = 0.4;
const SEVERITY_WEIGHT: f64 = 0.3;
const IMPACT_WEIGHT: f64 = 0.3;

/// Largest possible L1 distance between two capped impact vectors.
const IMPACT_NORMALIZATION: f64 = 3.0 * IMPACT_DIMENSION_CAP;

/// A group of similar error patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: usize,
    /// Member keys, seed first.
    pub member_pattern_keys: Vec<String>,
    /// Similarity of each member to the seed (the seed scores 1.0).
    pub similarity_scores: BTreeMap<String, f64>,
}

impl Cluster {
    /// Key of the pattern the cluster grew from, if it has any members.
    pub fn seed(&self) -> Option<&str> {
        self.member_pattern_keys.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.member_pattern_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_pattern_keys.is_empty()
    }
}

/// Weighted similarity of two patterns in `[0, 1]`.
///
/// `0.4 · Jaccard(components) + 0.3 · severity closeness + 0.3 · impact closeness`.
pub fn similarity(a: &ErrorPattern, b: &ErrorPattern) -> f64 {
    let components = jaccard(&a.components, &b.components);

    let rank_delta = (a.severity.rank() as f64 - b.severity.rank() as f64).abs();
    let severity = 1.0 - rank_delta / 2.0;

    let impact_delta = (a.impact.capped_distance(&b.impact) / IMPACT_NORMALIZATION).min(1.0);
    let impact = 1.0 - impact_delta;

    COMPONENT_WEIGHT * components + SEVERITY_WEIGHT * severity + IMPACT_WEIGHT * impact
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Cluster patterns in place, setting each member's `cluster_id`.
///
/// Seeds that absorb no other pattern do not form a cluster and keep
/// `cluster_id = None`. Cluster ids are assigned densely from 0.
pub fn cluster_patterns(patterns: &mut [ErrorPattern], threshold: f64) -> Vec<Cluster> {
    for pattern in patterns.iter_mut() {
        pattern.cluster_id = None;
    }

    let mut assigned = vec![false; patterns.len()];
    let mut clusters = Vec::new();

    for seed in 0..patterns.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut members = vec![(seed, 1.0)];
        for candidate in (seed + 1)..patterns.len() {
            if assigned[candidate] {
                continue;
            }
            let score = similarity(&patterns[seed], &patterns[candidate]);
            if score >= threshold {
                assigned[candidate] = true;
                members.push((candidate, score));
            }
        }

        if members.len() < 2 {
            continue;
        }

        let cluster_id = clusters.len();
        let mut member_pattern_keys = Vec::with_capacity(members.len());
        let mut similarity_scores = BTreeMap::new();
        for (idx, score) in members {
            let pattern = &mut patterns[idx];
            pattern.cluster_id = Some(cluster_id);
            member_pattern_keys.push(pattern.pattern_key.clone());
            similarity_scores.insert(pattern.pattern_key.clone(), score);
        }

        debug!(
            cluster_id,
            seed = %member_pattern_keys[0],
            members = member_pattern_keys.len(),
            "Formed error pattern cluster"
        );

        clusters.push(Cluster {
            cluster_id,
            member_pattern_keys,
            similarity_scores,
        });
    }

    clusters
}

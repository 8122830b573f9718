//! Louvain community detection
//!
//! Greedy modularity optimization in two alternating phases: every node is
//! moved to the neighboring community with the best modularity gain until no
//! move helps, then each community is collapsed into a single node and the
//! process repeats on the smaller graph. Edge weights count.
//!
//! Nodes are visited in insertion order unless a seed is given, in which case
//! the order is shuffled with a seeded ChaCha generator at every level.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

use super::store::Adjacency;

/// Smallest modularity increase that still counts as progress
const MIN_MODULARITY_GAIN: f64 = 1e-7;

/// Sweeps over the nodes of one level before giving up on convergence
const MAX_SWEEPS_PER_LEVEL: usize = 256;

/// Reasons the optimizer cannot produce a partition
#[derive(Debug, Error, PartialEq)]
pub enum CommunityError {
    #[error("graph has no weighted edges")]
    NoEdges,

    #[error("edge {source_id} - {target_id} has unusable weight {weight}")]
    InvalidWeight {
        source_id: String,
        target_id: String,
        weight: f64,
    },
}

/// Tuning for the optimizer
#[derive(Debug, Clone)]
pub struct LouvainOptions {
    /// Shuffle seed, insertion order when unset
    pub seed: Option<u64>,
    /// Maximum number of aggregation levels
    pub max_levels: usize,
}

impl Default for LouvainOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_levels: 32,
        }
    }
}

/// Weighted graph at one aggregation level
struct LevelGraph {
    /// Off-diagonal weights
    links: Vec<BTreeMap<usize, f64>>,
    /// Self-loop weight (collapsed internal edges)
    loops: Vec<f64>,
}

impl LevelGraph {
    fn len(&self) -> usize {
        self.loops.len()
    }

    /// Weighted degree, self loops counted twice
    fn degree(&self, node: usize) -> f64 {
        self.links[node].values().sum::<f64>() + 2.0 * self.loops[node]
    }

    fn modularity(&self, community: &[usize], two_m: f64) -> f64 {
        let k = community.iter().copied().max().map_or(0, |c| c + 1);
        let mut internal = vec![0.0; k];
        let mut total = vec![0.0; k];

        for node in 0..self.len() {
            let c = community[node];
            total[c] += self.degree(node);
            internal[c] += self.loops[node];
            for (&other, &w) in &self.links[node] {
                if other > node && community[other] == c {
                    internal[c] += w;
                }
            }
        }

        let m = two_m / 2.0;
        internal
            .iter()
            .zip(&total)
            .map(|(inside, tot)| inside / m - (tot / two_m).powi(2))
            .sum()
    }
}

/// Partition the graph into communities of dense indices
///
/// Communities are ordered by their earliest member, members ascending.
pub fn louvain(
    adjacency: &Adjacency,
    options: &LouvainOptions,
) -> Result<Vec<Vec<usize>>, CommunityError> {
    let n = adjacency.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut links = vec![BTreeMap::new(); n];
    for (node, neighbors) in adjacency.neighbors.iter().enumerate() {
        for &(other, weight) in neighbors {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CommunityError::InvalidWeight {
                    source_id: adjacency.ids[node].clone(),
                    target_id: adjacency.ids[other].clone(),
                    weight,
                });
            }
            if other != node && weight > 0.0 {
                links[node].insert(other, weight);
            }
        }
    }

    let mut level = LevelGraph {
        links,
        loops: vec![0.0; n],
    };
    let two_m: f64 = (0..n).map(|i| level.degree(i)).sum();
    if two_m <= 0.0 {
        return Err(CommunityError::NoEdges);
    }

    let mut rng = options.seed.map(ChaCha8Rng::seed_from_u64);
    // community of every original node
    let mut membership: Vec<usize> = (0..n).collect();
    let mut modularity = level.modularity(&(0..n).collect::<Vec<_>>(), two_m);

    for depth in 0..options.max_levels.max(1) {
        let community = one_level(&level, two_m, rng.as_mut());
        let (community, count) = renumber(&community);

        let new_modularity = level.modularity(&community, two_m);
        if count == level.len() || new_modularity - modularity < MIN_MODULARITY_GAIN {
            break;
        }

        debug!(
            level = depth,
            communities = count,
            modularity = new_modularity,
            "Louvain level collapsed"
        );

        for m in &mut membership {
            *m = community[*m];
        }
        level = aggregate(&level, &community, count);
        modularity = new_modularity;
    }

    let (membership, count) = renumber(&membership);
    let mut communities = vec![Vec::new(); count];
    for (node, c) in membership.into_iter().enumerate() {
        communities[c].push(node);
    }
    Ok(communities)
}

/// Local-move phase, returns a community label per level node
fn one_level(level: &LevelGraph, two_m: f64, rng: Option<&mut ChaCha8Rng>) -> Vec<usize> {
    let n = level.len();
    let degrees: Vec<f64> = (0..n).map(|i| level.degree(i)).collect();
    let mut community: Vec<usize> = (0..n).collect();
    let mut totals = degrees.clone();

    let mut order: Vec<usize> = (0..n).collect();
    if let Some(rng) = rng {
        order.shuffle(rng);
    }

    let mut current = level.modularity(&community, two_m);
    for _ in 0..MAX_SWEEPS_PER_LEVEL {
        let mut moved = false;

        for &node in &order {
            let home = community[node];
            let k = degrees[node];

            // weight from node into each neighboring community, discovery order
            let mut neighbor_weights: Vec<(usize, f64)> = Vec::new();
            for (&other, &w) in &level.links[node] {
                let c = community[other];
                match neighbor_weights.iter_mut().find(|(nc, _)| *nc == c) {
                    Some((_, total)) => *total += w,
                    None => neighbor_weights.push((c, w)),
                }
            }

            totals[home] -= k;
            let weight_to = |c: usize| {
                neighbor_weights
                    .iter()
                    .find(|(nc, _)| *nc == c)
                    .map_or(0.0, |(_, w)| *w)
            };

            let mut best = home;
            let mut best_gain = weight_to(home) - totals[home] * k / two_m;
            for &(c, w) in &neighbor_weights {
                let gain = w - totals[c] * k / two_m;
                if gain > best_gain {
                    best = c;
                    best_gain = gain;
                }
            }

            totals[best] += k;
            if best != home {
                community[node] = best;
                moved = true;
            }
        }

        let next = level.modularity(&community, two_m);
        if !moved || next - current < MIN_MODULARITY_GAIN {
            break;
        }
        current = next;
    }

    community
}

/// Relabel communities 0..k in order of first appearance
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    let relabeled: Vec<usize> = labels
        .iter()
        .map(|label| {
            *mapping.entry(*label).or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect();
    (relabeled, next)
}

/// Collapse each community into one node
fn aggregate(level: &LevelGraph, community: &[usize], count: usize) -> LevelGraph {
    let mut links = vec![BTreeMap::new(); count];
    let mut loops = vec![0.0; count];

    for node in 0..level.len() {
        let c = community[node];
        loops[c] += level.loops[node];
        for (&other, &w) in &level.links[node] {
            if other < node {
                continue;
            }
            let oc = community[other];
            if oc == c {
                loops[c] += w;
            } else {
                *links[c].entry(oc).or_insert(0.0) += w;
                *links[oc].entry(c).or_insert(0.0) += w;
            }
        }
    }

    LevelGraph { links, loops }
}

/// Every node in its own community
pub fn singletons(n: usize) -> Vec<Vec<usize>> {
    (0..n).map(|i| vec![i]).collect()
}

//! Core HNSW graph: random layer assignment (exponential distribution),
//! greedy top-down descent, beam search on the base layer, and a
//! diversity-preserving neighbor selection heuristic.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::node::Node;
use super::visited::VisitedSet;
use crate::error::{Result, VectorStoreError};
use crate::math::dot;

/// Construction parameters.
///
/// Higher `m` / `ef_construction` trade memory and build time for recall.
#[derive(Debug, Clone)]
pub struct HnswParams {
    /// Max neighbors per node per layer (layer 0 gets 2×).
    pub m: usize,
    /// Candidate-list breadth during construction.
    pub ef_construction: usize,
    /// RNG seed for layer assignment; `None` uses entropy.
    pub seed: Option<u64>,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 32,
            ef_construction: 200,
            seed: None,
        }
    }
}

/// Heap entry: ordering is by distance, ties broken by ordinal so the
/// traversal is deterministic.
#[derive(Clone, Copy, Debug)]
struct ScoredNode {
    ordinal: usize,
    distance: f32,
}

impl PartialEq for ScoredNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredNode {}

impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.ordinal.cmp(&other.ordinal))
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Immutable approximate nearest-neighbor index.
///
/// Owns the normalized vectors it was built from; node ids are the store
/// ordinals, so a persisted index answers queries without the store.
#[derive(Debug)]
pub struct HnswIndex {
    pub(crate) vectors: Vec<Vec<f32>>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) entry_point: Option<usize>,
    pub(crate) max_layer: usize,
    pub(crate) dimension: usize,
    pub(crate) m: usize,
    pub(crate) m0: usize,
    pub(crate) ml: f64,
    pub(crate) ef_construction: usize,
}

impl HnswIndex {
    /// Build the graph over `vectors` in one shot.
    ///
    /// Vector order defines the ordinals the index will return; the caller
    /// (the offline builder) must have L2-normalized every vector.
    pub fn build(vectors: Vec<Vec<f32>>, params: &HnswParams) -> Result<Self> {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        for v in &vectors {
            if v.len() != dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: dimension,
                    actual: v.len(),
                });
            }
        }

        let m = params.m.max(2);
        let total = vectors.len();
        let mut index = Self {
            vectors,
            nodes: Vec::with_capacity(total),
            entry_point: None,
            max_layer: 0,
            dimension,
            m,
            m0: m * 2,
            ml: 1.0 / (m as f64).ln(),
            ef_construction: params.ef_construction.max(1),
        };

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut visited = VisitedSet::new(total);
        for ordinal in 0..total {
            index.insert(ordinal, &mut rng, &mut visited);
            if (ordinal + 1) % 10_000 == 0 {
                log::debug!("HNSW build: inserted {} / {total} vectors", ordinal + 1);
            }
        }
        Ok(index)
    }

    /// Reassemble a loaded index; layer structure comes from the artifact.
    pub(crate) fn from_parts(
        vectors: Vec<Vec<f32>>,
        nodes: Vec<Node>,
        entry_point: Option<usize>,
        max_layer: usize,
        m: usize,
        ef_construction: usize,
    ) -> Self {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        Self {
            vectors,
            nodes,
            entry_point,
            max_layer,
            dimension,
            m,
            m0: m * 2,
            ml: 1.0 / (m as f64).ln(),
            ef_construction,
        }
    }

    /// Top-`n` most similar vectors to `query`, ordered by descending score.
    ///
    /// `query` must already be L2-normalized by the caller; scores are inner
    /// products in [-1, 1]. `ef_search` bounds the candidate list explored on
    /// the base layer.
    pub fn search(&self, query: &[f32], n: usize, ef_search: usize) -> Result<Vec<(usize, f32)>> {
        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };
        if query.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut visited = VisitedSet::new(self.nodes.len());
        let mut current = entry;
        for layer in (1..=self.max_layer).rev() {
            if let Some(&(best, _)) = self
                .search_layer(query, current, 1, layer, &mut visited)
                .first()
            {
                current = best;
            }
        }

        let found = self.search_layer(query, current, ef_search.max(n).max(1), 0, &mut visited);
        Ok(found
            .into_iter()
            .take(n)
            .map(|(ordinal, dist)| (ordinal, 1.0 - dist))
            .collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn stats(&self) -> HnswStats {
        let mut layer_counts = vec![0usize; self.max_layer + 1];
        let mut total_edges = 0;
        for node in &self.nodes {
            for (layer, neighbors) in node.layers.iter().enumerate() {
                if !neighbors.is_empty() {
                    if let Some(count) = layer_counts.get_mut(layer) {
                        *count += 1;
                    }
                    total_edges += neighbors.len();
                }
            }
        }
        HnswStats {
            num_nodes: self.nodes.len(),
            dimension: self.dimension,
            max_layer: self.max_layer,
            layer_counts,
            total_edges,
            m: self.m,
            ef_construction: self.ef_construction,
        }
    }

    /// 1 - inner product; smaller = more similar for unit vectors.
    #[inline]
    fn distance(&self, query: &[f32], ordinal: usize) -> f32 {
        1.0 - dot(query, &self.vectors[ordinal])
    }

    fn random_layer(&self, rng: &mut StdRng) -> usize {
        let r: f64 = rng.gen();
        (-r.ln() * self.ml).floor() as usize
    }

    fn insert(&mut self, ordinal: usize, rng: &mut StdRng, visited: &mut VisitedSet) {
        let node_layer = self.random_layer(rng);

        if self.nodes.is_empty() {
            self.nodes.push(Node::new(node_layer));
            self.entry_point = Some(ordinal);
            self.max_layer = node_layer;
            return;
        }
        let Some(entry) = self.entry_point else {
            return;
        };

        let query = self.vectors[ordinal].clone();
        let mut current = entry;

        // Zoom in through the layers above the new node's top.
        for layer in (node_layer + 1..=self.max_layer).rev() {
            if let Some(&(best, _)) = self
                .search_layer(&query, current, 1, layer, visited)
                .first()
            {
                current = best;
            }
        }

        // Wire connections from min(node_layer, max_layer) down to 0.
        let mut new_node = Node::new(node_layer);
        for layer in (0..=node_layer.min(self.max_layer)).rev() {
            let m_layer = if layer == 0 { self.m0 } else { self.m };
            let candidates =
                self.search_layer(&query, current, self.ef_construction, layer, visited);
            let neighbors = self.select_neighbors(&candidates, m_layer);

            for &(neighbor, _) in &neighbors {
                new_node.add_neighbor(layer, neighbor);
            }
            for &(neighbor, _) in &neighbors {
                self.nodes[neighbor].add_neighbor(layer, ordinal);
                if self.nodes[neighbor].neighbors(layer).len() > m_layer {
                    let neighbor_vec = self.vectors[neighbor].clone();
                    let linked: Vec<(usize, f32)> = self.nodes[neighbor]
                        .neighbors(layer)
                        .iter()
                        .map(|&n| (n, 1.0 - dot(&neighbor_vec, &self.vectors[n])))
                        .collect();
                    let kept = self.select_neighbors(&linked, m_layer);
                    if let Some(list) = self.nodes[neighbor].neighbors_mut(layer) {
                        list.clear();
                        list.extend(kept.iter().map(|&(n, _)| n));
                    }
                }
            }

            if let Some(&(best, _)) = candidates.first() {
                current = best;
            }
        }

        debug_assert_eq!(self.nodes.len(), ordinal);
        self.nodes.push(new_node);
        if node_layer > self.max_layer {
            self.max_layer = node_layer;
            self.entry_point = Some(ordinal);
        }
    }

    /// Beam search on one layer: returns up to `ef` (ordinal, distance)
    /// pairs sorted ascending by distance.
    fn search_layer(
        &self,
        query: &[f32],
        entry: usize,
        ef: usize,
        layer: usize,
        visited: &mut VisitedSet,
    ) -> Vec<(usize, f32)> {
        visited.clear();

        // Min-heap of frontier nodes, max-heap tracking the worst kept result.
        let mut frontier: BinaryHeap<Reverse<ScoredNode>> = BinaryHeap::with_capacity(ef);
        let mut results: BinaryHeap<ScoredNode> = BinaryHeap::with_capacity(ef + 1);

        visited.insert(entry);
        let entry_dist = self.distance(query, entry);
        frontier.push(Reverse(ScoredNode {
            ordinal: entry,
            distance: entry_dist,
        }));
        results.push(ScoredNode {
            ordinal: entry,
            distance: entry_dist,
        });

        while let Some(Reverse(current)) = frontier.pop() {
            if let Some(worst) = results.peek() {
                if current.distance > worst.distance && results.len() >= ef {
                    break;
                }
            }

            // Nodes inserted later in the same build pass may be referenced
            // before they exist; `get` skips them.
            let Some(node) = self.nodes.get(current.ordinal) else {
                continue;
            };
            for &neighbor in node.neighbors(layer) {
                if !visited.insert(neighbor) {
                    continue;
                }
                let dist = self.distance(query, neighbor);
                let dominated = results.len() >= ef
                    && results.peek().is_some_and(|worst| dist > worst.distance);
                if !dominated {
                    frontier.push(Reverse(ScoredNode {
                        ordinal: neighbor,
                        distance: dist,
                    }));
                    results.push(ScoredNode {
                        ordinal: neighbor,
                        distance: dist,
                    });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<(usize, f32)> = results
            .into_iter()
            .map(|s| (s.ordinal, s.distance))
            .collect();
        out.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        out
    }

    /// Diversity-preserving neighbor selection: a candidate is kept only if
    /// it is closer to the inserted vector than to every already-kept
    /// neighbor, then remaining slots are filled with the closest leftovers.
    fn select_neighbors(&self, candidates: &[(usize, f32)], m: usize) -> Vec<(usize, f32)> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut kept: Vec<(usize, f32)> = Vec::with_capacity(m);
        for &(candidate, candidate_dist) in &sorted {
            if kept.len() >= m {
                break;
            }
            let diverse = kept.iter().all(|&(existing, _)| {
                let between = 1.0 - dot(&self.vectors[candidate], &self.vectors[existing]);
                between >= candidate_dist
            });
            if diverse {
                kept.push((candidate, candidate_dist));
            }
        }
        if kept.len() < m {
            for &(candidate, candidate_dist) in &sorted {
                if kept.len() >= m {
                    break;
                }
                if !kept.iter().any(|&(id, _)| id == candidate) {
                    kept.push((candidate, candidate_dist));
                }
            }
        }
        kept
    }
}

/// Graph shape summary, surfaced by the builder and the CLI.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HnswStats {
    pub num_nodes: usize,
    pub dimension: usize,
    pub max_layer: usize,
    pub layer_counts: Vec<usize>,
    pub total_edges: usize,
    pub m: usize,
    pub ef_construction: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::l2_normalized;

    fn random_vectors(count: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let v: Vec<f32> = (0..dim).map(|_| rng.gen::<f32>() - 0.5).collect();
                l2_normalized(&v)
            })
            .collect()
    }

    fn params(seed: u64) -> HnswParams {
        HnswParams {
            m: 16,
            ef_construction: 100,
            seed: Some(seed),
        }
    }

    #[test]
    fn empty_build_searches_empty() {
        let index = HnswIndex::build(Vec::new(), &HnswParams::default()).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 5, 50).unwrap().is_empty());
    }

    #[test]
    fn single_vector_is_its_own_match() {
        let vectors = random_vectors(1, 64, 1);
        let query = vectors[0].clone();
        let index = HnswIndex::build(vectors, &params(1)).unwrap();
        let results = index.search(&query, 5, 50).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn exact_query_vector_ranks_first() {
        let vectors = random_vectors(200, 64, 2);
        let query = vectors[42].clone();
        let index = HnswIndex::build(vectors, &params(2)).unwrap();
        let results = index.search(&query, 5, 100).unwrap();
        assert_eq!(results[0].0, 42);
        assert!((results[0].1 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn every_vector_finds_itself() {
        let vectors = random_vectors(50, 32, 3);
        let index = HnswIndex::build(vectors.clone(), &params(3)).unwrap();
        for (ordinal, v) in vectors.iter().enumerate() {
            let results = index.search(v, 1, 100).unwrap();
            assert_eq!(results[0].0, ordinal, "vector {ordinal} should find itself");
        }
    }

    #[test]
    fn results_are_sorted_descending_and_bounded() {
        let vectors = random_vectors(100, 32, 4);
        let index = HnswIndex::build(vectors, &params(4)).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let query: Vec<f32> = (0..32).map(|_| rng.gen::<f32>() - 0.5).collect();
        let query = l2_normalized(&query);

        let results = index.search(&query, 10, 60).unwrap();
        assert!(results.len() <= 10);
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn k_larger_than_collection_returns_all() {
        let vectors = random_vectors(10, 32, 5);
        let index = HnswIndex::build(vectors, &params(5)).unwrap();
        let query = l2_normalized(&vec![0.3; 32]);
        let results = index.search(&query, 100, 50).unwrap();
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn k_zero_returns_nothing() {
        let vectors = random_vectors(10, 32, 6);
        let index = HnswIndex::build(vectors, &params(6)).unwrap();
        let query = l2_normalized(&vec![0.3; 32]);
        assert!(index.search(&query, 0, 50).unwrap().is_empty());
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let vectors = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let err = HnswIndex::build(vectors, &HnswParams::default()).unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
    }

    #[test]
    fn query_dimension_is_checked() {
        let vectors = random_vectors(5, 16, 7);
        let index = HnswIndex::build(vectors, &params(7)).unwrap();
        let err = index.search(&[1.0, 0.0], 3, 50).unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 16,
                actual: 2
            }
        ));
    }

    #[test]
    fn recall_against_brute_force() {
        let vectors = random_vectors(1000, 64, 8);
        let index = HnswIndex::build(vectors.clone(), &params(8)).unwrap();

        let mut rng = StdRng::seed_from_u64(800);
        let k = 10;
        let num_queries = 20;
        let mut total_recall = 0.0;

        for _ in 0..num_queries {
            let q: Vec<f32> = (0..64).map(|_| rng.gen::<f32>() - 0.5).collect();
            let q = l2_normalized(&q);

            let mut truth: Vec<(usize, f32)> = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (i, dot(&q, v)))
                .collect();
            truth.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            let truth_ids: std::collections::HashSet<usize> =
                truth.iter().take(k).map(|&(i, _)| i).collect();

            let found: std::collections::HashSet<usize> = index
                .search(&q, k, 100)
                .unwrap()
                .iter()
                .map(|&(i, _)| i)
                .collect();

            total_recall += truth_ids.intersection(&found).count() as f64 / k as f64;
        }

        let avg = total_recall / f64::from(num_queries);
        assert!(avg >= 0.9, "recall@{k} was {avg:.2}, expected >= 0.90");
    }

    #[test]
    fn stats_reflect_graph_shape() {
        let vectors = random_vectors(100, 32, 9);
        let index = HnswIndex::build(vectors, &params(9)).unwrap();
        let stats = index.stats();
        assert_eq!(stats.num_nodes, 100);
        assert_eq!(stats.dimension, 32);
        assert_eq!(stats.m, 16);
        assert!(stats.total_edges > 0);
        assert_eq!(stats.layer_counts.len(), stats.max_layer + 1);
    }
}

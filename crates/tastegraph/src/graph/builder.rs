//! Threshold a similarity matrix into an undirected weighted graph.

use crate::error::{Error, Result};
use crate::graph::similarity::SimilarityMatrix;
use serde::Serialize;
use std::collections::BTreeMap;

/// Weighted adjacency keyed by vertex id. Each undirected edge appears under both endpoints.
pub type Adjacency = BTreeMap<String, BTreeMap<String, f64>>;

/// One undirected edge, reported with `source < target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Undirected weighted graph without self-loops or multi-edges.
///
/// Only entities with at least one qualifying edge are vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityGraph {
    adjacency: Adjacency,
}

impl SimilarityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the edge between `u` and `v`. Self-loops are ignored.
    pub fn add_edge(&mut self, u: &str, v: &str, weight: f64) {
        if u == v {
            return;
        }
        self.adjacency
            .entry(u.to_string())
            .or_default()
            .insert(v.to_string(), weight);
        self.adjacency
            .entry(v.to_string())
            .or_default()
            .insert(u.to_string(), weight);
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Vertex ids in lexicographic order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_weight(&self, u: &str, v: &str) -> Option<f64> {
        self.adjacency.get(u)?.get(v).copied()
    }

    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = (&str, f64)> {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|n| n.iter().map(|(v, w)| (v.as_str(), *w)))
    }

    /// Every edge once, ordered by (source, target).
    pub fn edges(&self) -> Vec<Edge> {
        self.adjacency
            .iter()
            .flat_map(|(u, nbrs)| {
                nbrs.iter()
                    .filter(move |(v, _)| u < *v)
                    .map(move |(v, w)| Edge {
                        source: u.clone(),
                        target: v.clone(),
                        weight: *w,
                    })
            })
            .collect()
    }
}

/// Reject thresholds that are NaN or outside the cosine range.
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_nan() || !(-1.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidThreshold(threshold));
    }
    Ok(threshold)
}

/// Connect every unordered pair whose similarity is at least `threshold`.
///
/// Entities with no qualifying pair do not appear in the graph, so they are
/// never eligible for community membership.
pub fn build_graph(similarity: &SimilarityMatrix, threshold: f64) -> Result<SimilarityGraph> {
    let threshold = validate_threshold(threshold)?;
    let ids = similarity.ids();
    let mut graph = SimilarityGraph::new();

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            if ids[i] == ids[j] {
                continue;
            }
            let score = similarity.get(i, j);
            if score >= threshold {
                graph.add_edge(&ids[i], &ids[j], score);
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureMatrix, FeatureSchema};
    use crate::graph::similarity::pairwise_similarity;
    use std::sync::Arc;

    fn example_similarity() -> SimilarityMatrix {
        let schema = Arc::new(FeatureSchema::new(1, vec!["Manga"], vec!["Action", "Romance"]).unwrap());
        let m = FeatureMatrix::from_rows(
            schema,
            vec![
                ("U1".to_string(), vec![0.0, 0.9, 0.1]),
                ("U2".to_string(), vec![0.0, 0.85, 0.15]),
                ("U3".to_string(), vec![0.0, 0.1, 0.9]),
                ("U4".to_string(), vec![0.0, 0.5, 0.5]),
            ],
        )
        .unwrap();
        pairwise_similarity(&m)
    }

    #[test]
    fn test_build_graph_threshold() {
        let sim = example_similarity();
        let graph = build_graph(&sim, 0.99).unwrap();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_weight("U1", "U2").is_some());
        assert_eq!(graph.edge_weight("U1", "U2"), graph.edge_weight("U2", "U1"));
        assert!(!graph.contains_vertex("U3"));
    }

    #[test]
    fn test_edges_match_similarity() {
        let sim = example_similarity();
        for threshold in [-1.0, 0.0, 0.3, 0.7, 0.9, 0.99, 1.0] {
            let graph = build_graph(&sim, threshold).unwrap();
            for i in 0..sim.len() {
                for j in 0..sim.len() {
                    let (u, v) = (&sim.ids()[i], &sim.ids()[j]);
                    let expected = i != j && sim.get(i, j) >= threshold;
                    assert_eq!(graph.edge_weight(u, v).is_some(), expected, "{u}-{v} @ {threshold}");
                }
            }
        }
    }

    #[test]
    fn test_raising_threshold_only_removes_edges() {
        let sim = example_similarity();
        let mut previous = build_graph(&sim, -1.0).unwrap().edges();
        for threshold in [0.2, 0.5, 0.8, 0.95, 0.999] {
            let current = build_graph(&sim, threshold).unwrap().edges();
            assert!(current.iter().all(|e| previous.contains(e)));
            previous = current;
        }
    }

    #[test]
    fn test_invalid_threshold() {
        let sim = example_similarity();
        assert!(matches!(build_graph(&sim, 1.5), Err(Error::InvalidThreshold(_))));
        assert!(matches!(build_graph(&sim, -1.01), Err(Error::InvalidThreshold(_))));
        assert!(build_graph(&sim, f64::NAN).is_err());
    }

    #[test]
    fn test_no_self_loops() {
        let mut graph = SimilarityGraph::new();
        graph.add_edge("a", "a", 1.0);
        assert!(graph.is_empty());
        graph.add_edge("a", "b", 0.5);
        graph.add_edge("b", "a", 0.7);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].weight, 0.7);
        assert_eq!(graph.neighbors("a").collect::<Vec<_>>(), vec![("b", 0.7)]);
    }
}

//! Community detection by greedy modularity maximization.
//!
//! Works on a plain weighted [`Adjacency`] so it can be exercised on
//! hand-built graphs.

use crate::graph::builder::Adjacency;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// A set of vertex ids, kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Community {
    members: Vec<String>,
}

impl Community {
    pub fn new<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Self {
        let set: BTreeSet<String> = members.into_iter().map(Into::into).collect();
        Self {
            members: set.into_iter().collect(),
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(id)).is_ok()
    }
}

/// Vertices in lexicographic order plus the deduplicated positive edge weights between them.
struct IndexedGraph<'a> {
    vertices: Vec<&'a str>,
    edges: BTreeMap<(usize, usize), f64>,
}

impl<'a> IndexedGraph<'a> {
    fn from_adjacency(adjacency: &'a Adjacency) -> Self {
        let mut names: BTreeSet<&str> = BTreeSet::new();
        for (u, nbrs) in adjacency {
            names.insert(u);
            names.extend(nbrs.keys().map(String::as_str));
        }
        let vertices: Vec<&str> = names.into_iter().collect();
        let index: HashMap<&str, usize> = vertices.iter().enumerate().map(|(i, v)| (*v, i)).collect();

        // Only positive weights take part in modularity.
        let mut edges = BTreeMap::new();
        for (u, nbrs) in adjacency {
            for (v, &w) in nbrs {
                if u == v || !w.is_finite() || w <= 0.0 {
                    continue;
                }
                let (i, j) = (index[u.as_str()], index[v.as_str()]);
                let key = (i.min(j), i.max(j));
                let entry = edges.entry(key).or_insert(w);
                *entry = f64::max(*entry, w);
            }
        }

        Self { vertices, edges }
    }

    fn total_weight(&self) -> f64 {
        self.edges.values().sum()
    }

    fn degrees(&self) -> Vec<f64> {
        let mut degrees = vec![0.0; self.vertices.len()];
        for (&(i, j), &w) in &self.edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        degrees
    }
}

/// Partition the graph's vertices by greedy (Clauset–Newman–Moore) modularity merging.
///
/// Every vertex starts alone. Each step merges the pair of connected
/// communities with the largest modularity gain `ΔQ = 2(e_ij − a_i·a_j)`,
/// stopping once no merge has a positive gain. A community is identified by
/// its lowest vertex in lexicographic order; among equal gains the pair with
/// the lowest (i, j) ids wins. Results are ordered by size descending, then
/// by lowest member.
///
/// Vertices whose edges all have non-positive weight end up as singletons.
pub fn detect_communities(adjacency: &Adjacency) -> Vec<Community> {
    let graph = IndexedGraph::from_adjacency(adjacency);
    let n = graph.vertices.len();
    if n == 0 {
        return Vec::new();
    }

    let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
    let m = graph.total_weight();

    if m > 0.0 {
        let two_m = 2.0 * m;
        let mut a: Vec<f64> = graph.degrees().into_iter().map(|k| k / two_m).collect();
        let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for (&(i, j), &w) in &graph.edges {
            *e[i].entry(j).or_insert(0.0) += w / two_m;
            *e[j].entry(i).or_insert(0.0) += w / two_m;
        }

        let mut merges = 0usize;
        loop {
            let mut best: Option<(f64, usize, usize)> = None;
            for i in 0..n {
                if members[i].is_none() {
                    continue;
                }
                for (&j, &e_ij) in e[i].range((i + 1)..) {
                    let dq = 2.0 * (e_ij - a[i] * a[j]);
                    if best.map_or(true, |(best_dq, _, _)| dq > best_dq) {
                        best = Some((dq, i, j));
                    }
                }
            }

            let (i, j) = match best {
                Some((dq, i, j)) if dq > 0.0 => (i, j),
                _ => break,
            };

            // Fold j into i.
            let row_j = std::mem::take(&mut e[j]);
            for (k, w) in row_j {
                if k == i {
                    continue;
                }
                e[k].remove(&j);
                *e[k].entry(i).or_insert(0.0) += w;
                *e[i].entry(k).or_insert(0.0) += w;
            }
            e[i].remove(&j);
            a[i] += a[j];
            a[j] = 0.0;
            let moved = members[j].take().unwrap_or_default();
            if let Some(target) = members[i].as_mut() {
                target.extend(moved);
            }
            merges += 1;
        }
        debug!(vertices = n, merges, "greedy modularity merging finished");
    }

    let mut communities: Vec<Community> = members
        .into_iter()
        .flatten()
        .map(|group| Community::new(group.into_iter().map(|v| graph.vertices[v])))
        .collect();
    communities.sort_by(|x, y| {
        y.len()
            .cmp(&x.len())
            .then_with(|| x.members().first().cmp(&y.members().first()))
    });
    communities
}

/// Modularity Q of a partition: `Σ_c [L_c / m − (d_c / 2m)²]`.
///
/// Vertices the partition does not mention count as singletons. A graph
/// without positive edge weight has Q = 0.
pub fn modularity(adjacency: &Adjacency, partition: &[Community]) -> f64 {
    let graph = IndexedGraph::from_adjacency(adjacency);
    let m = graph.total_weight();
    if m <= 0.0 {
        return 0.0;
    }

    let n = graph.vertices.len();
    let community_of: HashMap<&str, usize> = partition
        .iter()
        .enumerate()
        .flat_map(|(c, community)| community.members().iter().map(move |m| (m.as_str(), c)))
        .collect();
    let label: Vec<usize> = graph
        .vertices
        .iter()
        .enumerate()
        .map(|(v, name)| community_of.get(name).map_or(v, |c| n + c))
        .collect();

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut degree: HashMap<usize, f64> = HashMap::new();
    for (&(i, j), &w) in &graph.edges {
        *degree.entry(label[i]).or_insert(0.0) += w;
        *degree.entry(label[j]).or_insert(0.0) += w;
        if label[i] == label[j] {
            *internal.entry(label[i]).or_insert(0.0) += w;
        }
    }

    let two_m = 2.0 * m;
    degree
        .iter()
        .map(|(c, d)| internal.get(c).copied().unwrap_or(0.0) / m - (d / two_m).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(edges: &[(&str, &str, f64)]) -> Adjacency {
        let mut adj = Adjacency::new();
        for &(u, v, w) in edges {
            adj.entry(u.to_string()).or_default().insert(v.to_string(), w);
            adj.entry(v.to_string()).or_default().insert(u.to_string(), w);
        }
        adj
    }

    fn clique(prefix: &str, size: usize, weight: f64) -> Vec<(String, String, f64)> {
        let mut edges = Vec::new();
        for i in 0..size {
            for j in (i + 1)..size {
                edges.push((format!("{prefix}{i}"), format!("{prefix}{j}"), weight));
            }
        }
        edges
    }

    #[test]
    fn test_empty_graph() {
        assert!(detect_communities(&Adjacency::new()).is_empty());
        assert_eq!(modularity(&Adjacency::new(), &[]), 0.0);
    }

    #[test]
    fn test_single_edge() {
        let adj = adjacency(&[("U1", "U2", 0.997)]);
        let communities = detect_communities(&adj);
        assert_eq!(communities, vec![Community::new(["U1", "U2"])]);
    }

    #[test]
    fn test_two_disconnected_cliques() {
        let mut owned = clique("a", 4, 0.95);
        owned.extend(clique("b", 5, 0.97));
        let edges: Vec<(&str, &str, f64)> =
            owned.iter().map(|(u, v, w)| (u.as_str(), v.as_str(), *w)).collect();
        let adj = adjacency(&edges);

        let communities = detect_communities(&adj);
        assert_eq!(communities.len(), 2);
        assert_eq!(communities[0], Community::new(["b0", "b1", "b2", "b3", "b4"]));
        assert_eq!(communities[1], Community::new(["a0", "a1", "a2", "a3"]));
    }

    #[test]
    fn test_bridged_triangles_split() {
        // Two triangles joined by one weak bridge: the best partition cuts the bridge.
        let adj = adjacency(&[
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("a", "c", 1.0),
            ("d", "e", 1.0),
            ("e", "f", 1.0),
            ("d", "f", 1.0),
            ("c", "d", 0.1),
        ]);
        let communities = detect_communities(&adj);
        assert_eq!(
            communities,
            vec![Community::new(["a", "b", "c"]), Community::new(["d", "e", "f"])]
        );

        let q = modularity(&adj, &communities);
        let merged = modularity(&adj, &[Community::new(["a", "b", "c", "d", "e", "f"])]);
        assert!(q > merged);
        assert!(q > 0.0);
    }

    #[test]
    fn test_partition_covers_every_vertex_once() {
        let adj = adjacency(&[
            ("a", "b", 0.9),
            ("b", "c", 0.8),
            ("c", "d", 0.95),
            ("e", "f", 0.99),
            ("f", "g", 0.91),
            ("g", "e", 0.93),
            ("d", "e", 0.2),
        ]);
        let communities = detect_communities(&adj);
        let mut seen: Vec<&str> = communities
            .iter()
            .flat_map(|c| c.members().iter().map(String::as_str))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_equal_gains_merge_lowest_pair_first() {
        // Every edge of the 4-cycle has the same gain. Indexed w=0, x=1, y=2,
        // z=3, so (w, x) merges first, then (y, z); joining both has zero gain.
        let adj = adjacency(&[
            ("x", "y", 1.0),
            ("y", "z", 1.0),
            ("z", "w", 1.0),
            ("w", "x", 1.0),
        ]);
        let first = detect_communities(&adj);
        assert_eq!(first, vec![Community::new(["w", "x"]), Community::new(["y", "z"])]);
        for _ in 0..5 {
            assert_eq!(detect_communities(&adj), first);
        }
    }

    #[test]
    fn test_modularity_values() {
        let adj = adjacency(&[
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("a", "c", 1.0),
            ("d", "e", 1.0),
            ("e", "f", 1.0),
            ("d", "f", 1.0),
            ("c", "d", 0.1),
        ]);
        let split = [Community::new(["a", "b", "c"]), Community::new(["d", "e", "f"])];
        let expected = 2.0 * (3.0 / 6.1 - 0.25);
        assert!((modularity(&adj, &split) - expected).abs() < 1e-12);

        // Vertices left out of the partition count as singletons.
        let singletons: Vec<Community> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|v| Community::new([*v]))
            .collect();
        assert!((modularity(&adj, &[]) - modularity(&adj, &singletons)).abs() < 1e-12);
        let partial = [Community::new(["a", "b", "c"])];
        let explicit = [
            Community::new(["a", "b", "c"]),
            Community::new(["d"]),
            Community::new(["e"]),
            Community::new(["f"]),
        ];
        assert!((modularity(&adj, &partial) - modularity(&adj, &explicit)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_edges_leave_singletons() {
        let adj = adjacency(&[("a", "b", 0.0)]);
        let communities = detect_communities(&adj);
        assert_eq!(communities, vec![Community::new(["a"]), Community::new(["b"])]);
    }

    #[test]
    fn test_community_contains() {
        let c = Community::new(["b", "a", "b"]);
        assert_eq!(c.members(), &["a".to_string(), "b".to_string()]);
        assert!(c.contains("a"));
        assert!(!c.contains("z"));
    }
}

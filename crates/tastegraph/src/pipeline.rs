//! End-to-end run: profiles → graph → communities → labels and recommendations.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::{normalize_rows, weight_for_similarity, FeatureMatrix};
use crate::graph::{build_graph, detect_communities, modularity, pairwise_similarity, Community, SimilarityGraph};
use crate::naming::{describe, name, CommunityDescription};
use crate::recommend::{community_vector, recommend, vectorize_all, Recommendation, Work};
use std::time::Instant;
use tracing::{debug, info};

/// Everything a presentation layer needs from one run. Vectors are parallel
/// to `communities`.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: SimilarityGraph,
    pub communities: Vec<Community>,
    pub labels: Vec<String>,
    pub descriptions: Vec<CommunityDescription>,
    pub recommendations: Vec<Vec<Recommendation>>,
    pub modularity: f64,
}

/// One community's results, borrowed from an [`Analysis`].
#[derive(Debug, Clone, Copy)]
pub struct CommunityReport<'a> {
    pub index: usize,
    pub community: &'a Community,
    pub label: &'a str,
    pub description: &'a CommunityDescription,
    pub recommendations: &'a [Recommendation],
}

impl Analysis {
    pub fn reports(&self) -> impl Iterator<Item = CommunityReport<'_>> {
        self.communities
            .iter()
            .zip(&self.labels)
            .zip(&self.descriptions)
            .zip(&self.recommendations)
            .enumerate()
            .map(|(index, (((community, label), description), recommendations))| CommunityReport {
                index,
                community,
                label,
                description,
                recommendations,
            })
    }
}

/// Graph-only output of a run, before any works are considered.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub graph: SimilarityGraph,
    pub communities: Vec<Community>,
    pub modularity: f64,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` up front; nothing runs with bad parameters.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize, weight, and compare profiles, then threshold and partition the graph.
    pub fn cluster(&self, users: &FeatureMatrix) -> Result<Clustering> {
        self.cluster_normalized(&normalize_rows(users))
    }

    /// Graph and communities from already L1-normalized profiles.
    fn cluster_normalized(&self, normalized: &FeatureMatrix) -> Result<Clustering> {
        let start = Instant::now();

        let weighted = weight_for_similarity(normalized, self.config.source_emphasis);
        let similarity = pairwise_similarity(&weighted);
        let graph = build_graph(&similarity, self.config.threshold)?;
        info!(
            users = normalized.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            threshold = self.config.threshold,
            "built similarity graph"
        );

        let communities = detect_communities(graph.adjacency());
        let q = modularity(graph.adjacency(), &communities);
        info!(
            communities = communities.len(),
            modularity = q,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "detected communities"
        );

        Ok(Clustering {
            graph,
            communities,
            modularity: q,
        })
    }

    /// Full run. `users` is the raw user-feature table; descriptions and
    /// labels are computed against it, community vectors against its
    /// L1-normalized form.
    pub fn run(&self, users: &FeatureMatrix, works: &[Work]) -> Result<Analysis> {
        let normalized = normalize_rows(users);
        let Clustering {
            graph,
            communities,
            modularity,
        } = self.cluster_normalized(&normalized)?;

        let labels = name(users, &communities, self.config.top_k)?;
        let descriptions = communities
            .iter()
            .map(|c| describe(users, c))
            .collect::<Result<Vec<_>>>()?;

        let work_vectors = vectorize_all(works, users.schema())?;

        let mut recommendations = Vec::with_capacity(communities.len());
        for (community, label) in communities.iter().zip(&labels) {
            if community.is_empty() {
                recommendations.push(Vec::new());
                continue;
            }
            let preference = community_vector(&normalized, community.members())?;
            let ranked = recommend(&preference, &work_vectors, self.config.top_n)?;
            debug!(label = %label, members = community.len(), top = ?ranked.first().map(|r| &r.work_id), "ranked works");
            recommendations.push(ranked);
        }

        Ok(Analysis {
            graph,
            communities,
            labels,
            descriptions,
            recommendations,
            modularity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::features::FeatureSchema;
    use std::sync::Arc;

    fn users(rows: Vec<(&str, Vec<(&str, f64)>)>) -> FeatureMatrix {
        let schema = Arc::new(FeatureSchema::default());
        let mut m = FeatureMatrix::new(Arc::clone(&schema));
        for (id, weights) in rows {
            let mut row = vec![0.0; schema.dim()];
            for (key, w) in weights {
                row[schema.index_of(key).unwrap()] = w;
            }
            m.push_row(id, row).unwrap();
        }
        m
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let config = PipelineConfig {
            threshold: 2.0,
            ..Default::default()
        };
        assert!(matches!(Pipeline::new(config), Err(Error::InvalidThreshold(_))));
    }

    #[test]
    fn test_run_matches_cluster() {
        let table = users(vec![
            ("a", vec![("Genre_Action", 3.0), ("Genre_Comedy", 1.0)]),
            ("b", vec![("Genre_Action", 6.0), ("Genre_Comedy", 2.5)]),
            ("c", vec![("Genre_Romance", 2.0)]),
        ]);
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let clustering = pipeline.cluster(&table).unwrap();
        let analysis = pipeline.run(&table, &[]).unwrap();
        assert_eq!(analysis.graph, clustering.graph);
        assert_eq!(analysis.communities, clustering.communities);
        assert_eq!(analysis.modularity, clustering.modularity);
    }

    #[test]
    fn test_empty_inputs() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let analysis = pipeline.run(&users(vec![]), &[]).unwrap();
        assert!(analysis.graph.is_empty());
        assert!(analysis.communities.is_empty());
        assert!(analysis.labels.is_empty());
        assert_eq!(analysis.modularity, 0.0);
    }

    #[test]
    fn test_reports_are_parallel() {
        let table = users(vec![
            ("a", vec![("Source_Manga", 0.5), ("Genre_Action", 0.5)]),
            ("b", vec![("Source_Manga", 0.45), ("Genre_Action", 0.55)]),
            ("c", vec![("Source_Manhwa", 0.5), ("Genre_Romance", 0.5)]),
            ("d", vec![("Source_Manhwa", 0.55), ("Genre_Romance", 0.45)]),
        ]);
        let works = vec![
            Work::new("m1", "Iron Fist", Some(8.0), Some("Manga"), "Action"),
            Work::new("m2", "Petal Letters", Some(8.0), Some("Manhwa"), "Romance"),
        ];
        let config = PipelineConfig {
            threshold: 0.9,
            top_n: 1,
            ..Default::default()
        };
        let analysis = Pipeline::new(config).unwrap().run(&table, &works).unwrap();

        assert_eq!(analysis.communities.len(), 2);
        let reports: Vec<_> = analysis.reports().collect();
        assert_eq!(reports.len(), 2);
        for report in reports {
            assert_eq!(report.recommendations.len(), 1);
            let expected = if report.community.contains("a") { "m1" } else { "m2" };
            assert_eq!(report.recommendations[0].work_id, expected);
            assert_eq!(report.description.member_count, 2);
        }
    }
}

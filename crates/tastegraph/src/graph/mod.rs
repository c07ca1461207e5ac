//! Similarity graph: pairwise cosine, thresholded edges, and modularity communities.

pub mod builder;
pub mod community;
pub mod similarity;

pub use builder::{build_graph, validate_threshold, Adjacency, Edge, SimilarityGraph};
pub use community::{detect_communities, modularity, Community};
pub use similarity::{cosine_similarity, pairwise_similarity, score_against, similarity, SimilarityMatrix};

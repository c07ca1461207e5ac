//! TasteGraph core: taste profiles, similarity graphs, community detection,
//! and feature-weighted recommendation of unadapted works.
//!
//! The pipeline runs in a single pass over in-memory tables:
//! profile normalization → cosine similarity → thresholded graph →
//! greedy modularity communities → labels, descriptions, and ranked works.

pub mod config;
pub mod error;
pub mod features;
pub mod graph;
pub mod naming;
pub mod pipeline;
pub mod profile;
pub mod recommend;

pub use config::PipelineConfig;
pub use error::{Error, ErrorKind, Result};
pub use features::{FeatureFamily, FeatureMatrix, FeatureSchema, FeatureVector};
pub use graph::{build_graph, detect_communities, modularity, Community, SimilarityGraph};
pub use naming::{describe, name, CommunityDescription};
pub use pipeline::{Analysis, Clustering, CommunityReport, Pipeline};
pub use profile::{build_profile, build_profiles, SourceCategory};
pub use recommend::{community_vector, recommend, vectorize, Recommendation, Work};

//! Candidate work vectors and per-community recommendation ranking.

pub mod ranking;
pub mod vectorize;
pub mod work;

pub use ranking::{community_vector, recommend, validate_top_n, Recommendation};
pub use vectorize::{vectorize, vectorize_all};
pub use work::Work;

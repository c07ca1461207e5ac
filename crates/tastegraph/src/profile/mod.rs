//! Raw user taste profiles accumulated from rated watch history.

pub mod builder;
pub mod source;

pub use builder::{build_profile, build_profiles, Catalogue, CatalogueEntry, HistoryEntry, ProfilePolicy};
pub use source::SourceCategory;

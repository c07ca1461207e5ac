//! `tastegraph graph`: cluster users and describe each community.

use crate::output::{self, Styled};
use crate::tables;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tastegraph::{describe, name, FeatureSchema, Pipeline, PipelineConfig};

pub fn run(profiles: &Path, config: PipelineConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let schema = Arc::new(FeatureSchema::default());
    let users = tables::read_profiles(profiles, &schema).context("failed to load profiles")?;

    let pipeline = Pipeline::new(config)?;
    let clustering = pipeline.cluster(&users)?;
    let labels = name(&users, &clustering.communities, pipeline.config().top_k)?;
    let descriptions = clustering
        .communities
        .iter()
        .map(|c| describe(&users, c))
        .collect::<tastegraph::Result<Vec<_>>>()?;

    if output::is_json() {
        let communities: Vec<_> = clustering
            .communities
            .iter()
            .zip(&labels)
            .zip(&descriptions)
            .map(|((community, label), description)| {
                serde_json::json!({
                    "label": label,
                    "members": community.members(),
                    "description": description,
                })
            })
            .collect();
        output::print_json(&serde_json::json!({
            "threshold": pipeline.config().threshold,
            "vertices": clustering.graph.vertex_count(),
            "edges": clustering.graph.edge_count(),
            "modularity": clustering.modularity,
            "communities": communities,
            "duration_ms": start.elapsed().as_millis() as u64,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        output::print_header(&s);
    }
    println!(
        "  Graph:       {} of {} users, {} edges (threshold {})",
        clustering.graph.vertex_count(),
        users.len(),
        clustering.graph.edge_count(),
        pipeline.config().threshold
    );
    println!("  Modularity:  {:.4}", clustering.modularity);
    println!();
    for (i, ((community, label), description)) in clustering
        .communities
        .iter()
        .zip(&labels)
        .zip(&descriptions)
        .enumerate()
    {
        println!(
            "  {:>3}. {:<36} {:>5} members  {}",
            i + 1,
            s.cyan(label),
            community.len(),
            s.dim(&format!(
                "{} | {}",
                description.dominant_source,
                description.dominant_genres.join(", ")
            ))
        );
    }
    Ok(())
}

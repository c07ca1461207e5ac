//! `tastegraph recommend`: full run from profiles to ranked works per community.

use crate::output::{self, Styled};
use crate::report;
use crate::tables;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tastegraph::{FeatureSchema, Pipeline, PipelineConfig};

pub fn run(profiles: &Path, works: &Path, out: Option<&Path>, config: PipelineConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let schema = Arc::new(FeatureSchema::default());
    let users = tables::read_profiles(profiles, &schema).context("failed to load profiles")?;
    let works = tables::read_works(works).context("failed to load candidate works")?;

    let pipeline = Pipeline::new(config)?;
    let analysis = pipeline.run(&users, &works)?;

    if output::is_json() {
        let value = report::to_json(&analysis, &works, pipeline.config());
        if let Some(path) = out {
            let text = serde_json::to_string_pretty(&value)?;
            std::fs::write(path, text)
                .with_context(|| format!("failed to write report {}", path.display()))?;
        }
        output::print_json(&value);
        return Ok(());
    }

    if let Some(path) = out {
        let text = report::render_text(&analysis, &works, &Styled::plain());
        std::fs::write(path, text)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    if !output::is_quiet() {
        output::print_header(&s);
    }
    print!("{}", report::render_text(&analysis, &works, &s));

    if !output::is_quiet() {
        eprintln!();
        eprintln!(
            "  {} {} communities ranked against {} works in {}",
            s.ok_sym(),
            analysis.communities.len(),
            works.len(),
            output::format_elapsed(start.elapsed())
        );
        if let Some(path) = out {
            eprintln!("  Report written to {}", path.display());
        }
    }
    Ok(())
}

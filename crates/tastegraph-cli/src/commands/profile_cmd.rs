//! `tastegraph profile`: build the user-feature table from watch history.

use crate::output::{self, Styled};
use crate::tables;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tastegraph::{build_profiles, FeatureSchema, PipelineConfig};

pub fn run(history: &Path, catalogue: &Path, out: &Path, config: &PipelineConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let users = tables::read_history(history).context("failed to load watch history")?;
    let catalogue = tables::read_catalogue(catalogue).context("failed to load catalogue")?;

    let schema = Arc::new(FeatureSchema::default());
    let profiles = build_profiles(&users, &catalogue, &schema, &config.profile_policy())?;
    tables::write_profiles(out, &profiles).context("failed to write profiles")?;

    let skipped = users.len() - profiles.len();
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "output": out.display().to_string(),
            "users": profiles.len(),
            "skipped": skipped,
            "features": schema.dim(),
            "duration_ms": start.elapsed().as_millis() as u64,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        output::print_header(&s);
        eprintln!(
            "  {} Wrote {} profiles to {} in {}",
            s.ok_sym(),
            profiles.len(),
            out.display(),
            output::format_elapsed(start.elapsed())
        );
        if skipped > 0 {
            eprintln!(
                "  {} {skipped} users had no rating of at least {}",
                s.warn_sym(),
                config.min_score
            );
        }
    }
    Ok(())
}

//! Human-readable and JSON renderings of an analysis.

use crate::output::Styled;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::Write;
use tastegraph::{Analysis, PipelineConfig, Work};

/// Plain-text report, one block per community.
pub fn render_text(analysis: &Analysis, works: &[Work], s: &Styled) -> String {
    let titles = titles_by_id(works);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "  Graph:       {} users, {} edges",
        analysis.graph.vertex_count(),
        analysis.graph.edge_count()
    );
    let _ = writeln!(out, "  Communities: {}", analysis.communities.len());
    let _ = writeln!(out, "  Modularity:  {:.4}", analysis.modularity);

    for report in analysis.reports() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {} {}  {}",
            s.bold(&format!("{}.", report.index + 1)),
            s.cyan(report.label),
            s.dim(&format!("({} members)", report.community.len()))
        );
        let _ = writeln!(out, "     Source:  {}", report.description.dominant_source);
        let _ = writeln!(out, "     Genres:  {}", report.description.dominant_genres.join(", "));
        if report.recommendations.is_empty() {
            continue;
        }
        let _ = writeln!(out, "     Recommended:");
        for (rank, rec) in report.recommendations.iter().enumerate() {
            let title = titles.get(rec.work_id.as_str()).copied().unwrap_or("");
            let _ = writeln!(
                out,
                "       {:>2}. {:<40} {}",
                rank + 1,
                if title.is_empty() { rec.work_id.as_str() } else { title },
                s.green(&format!("{:.3}", rec.score))
            );
        }
    }
    out
}

/// Machine-readable report.
pub fn to_json(analysis: &Analysis, works: &[Work], config: &PipelineConfig) -> Value {
    let titles = titles_by_id(works);
    let communities: Vec<Value> = analysis
        .reports()
        .map(|report| {
            let recommendations: Vec<Value> = report
                .recommendations
                .iter()
                .map(|rec| {
                    json!({
                        "work_id": rec.work_id,
                        "title": titles.get(rec.work_id.as_str()),
                        "score": rec.score,
                    })
                })
                .collect();
            json!({
                "label": report.label,
                "members": report.community.members(),
                "description": report.description,
                "recommendations": recommendations,
            })
        })
        .collect();

    json!({
        "generated_at": Utc::now().to_rfc3339(),
        "config": config,
        "graph": {
            "vertices": analysis.graph.vertex_count(),
            "edges": analysis.graph.edge_count(),
        },
        "modularity": analysis.modularity,
        "communities": communities,
    })
}

fn titles_by_id(works: &[Work]) -> HashMap<&str, &str> {
    works.iter().map(|w| (w.id.as_str(), w.title.as_str())).collect()
}

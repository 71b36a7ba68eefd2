//! Output rendering
//!
//! Plain text tables and JSON for search output. Warnings are grouped by
//! provider so one broken API across fifty projects is one line, not fifty.

use crate::gcp::http::format_gcp_error;
use crate::search::{ResourceKind, SearchOutput, SearchResult, SearchWarning};
use anyhow::Result;
use clap::ValueEnum;
use std::collections::{BTreeMap, BTreeSet};

/// Output format for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const HEADERS: [&str; 5] = ["TYPE", "PROJECT", "LOCATION", "NAME", "DETAILS"];

/// Render results as an aligned text table. Empty input renders nothing.
pub fn render_results_table(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.kind_tag().to_string(),
                r.project.clone(),
                if r.location.is_empty() {
                    "global".to_string()
                } else {
                    r.location.clone()
                },
                r.name.clone(),
                r.details_display(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i + 1 == cells.len() {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}  ", cell, width = *width));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// One line per failing provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningGroup {
    pub provider: ResourceKind,
    pub failed_projects: usize,
    pub sample: String,
}

/// Group warnings by provider, counting distinct failing projects
pub fn group_warnings(warnings: &[SearchWarning]) -> Vec<WarningGroup> {
    let mut groups: BTreeMap<&'static str, (ResourceKind, BTreeSet<&str>, String)> =
        BTreeMap::new();

    for warning in warnings {
        let entry = groups
            .entry(warning.provider.as_str())
            .or_insert_with(|| (warning.provider, BTreeSet::new(), format_gcp_error(&warning.err)));
        entry.1.insert(warning.project.as_str());
    }

    groups
        .into_values()
        .map(|(provider, projects, sample)| WarningGroup {
            provider,
            failed_projects: projects.len(),
            sample,
        })
        .collect()
}

/// Render grouped warnings, one line each
pub fn render_warnings(warnings: &[SearchWarning]) -> String {
    group_warnings(warnings)
        .iter()
        .map(|g| {
            format!(
                "warning: {} failed in {} project{}: {}\n",
                g.provider,
                g.failed_projects,
                if g.failed_projects == 1 { "" } else { "s" },
                g.sample
            )
        })
        .collect()
}

/// Render the whole output as pretty JSON
pub fn render_json(output: &SearchOutput) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

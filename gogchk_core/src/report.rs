/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Traverse a scanned collection and produce the update report
    as a structured document and as console text.

  Security / Safety Notes:
    Writes only to the report path chosen by the operator.

  Dependencies:
    serde/serde_json for the report file, chrono for stamps.

  Operational Scope:
    Consumes scan results after the whole collection is built;
    nothing is emitted for a failed scan.

  Revision History:
    2025-11-12 COD  Implemented nested title/add-on report.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Output separated from construction
    - Deterministic formatting for auditability
============================================================*/

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{GogchkError, Result};
use crate::naming::{Platform, VersionTag};
use crate::package::PackageRecord;
use crate::scanner::ScanOutcome;
use crate::title::Title;

const INDENT: &str = "    ";

/// Full report document.
#[derive(Debug, Serialize)]
pub struct UpdateReport {
    pub metadata: ReportMetadata,
    pub titles: Vec<TitleReport>,
}

#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub generated_by: String,
    pub root: String,
    pub titles_scanned: usize,
    pub addons_scanned: usize,
    pub titles_with_updates: usize,
    pub addons_with_updates: usize,
    pub failures: Vec<FailureReport>,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub directory: String,
    pub error: String,
}

/// Identity plus new tags for every flagged platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub slug: String,
    pub id: String,
    pub new_versions: BTreeMap<Platform, BTreeSet<VersionTag>>,
}

impl PackageReport {
    fn from_record(record: &PackageRecord) -> Self {
        Self {
            slug: record.slug().to_string(),
            id: record.id().to_string(),
            new_versions: record
                .new_versions()
                .map(|(platform, tags)| (platform, tags.clone()))
                .collect(),
        }
    }
}

/// A title needing attention; `update_available` covers the title itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleReport {
    #[serde(flatten)]
    pub package: PackageReport,
    pub update_available: bool,
    pub addons: Vec<PackageReport>,
}

/// Report every title that has an update itself or in an add-on.
pub fn summarize(titles: &[Title]) -> Vec<TitleReport> {
    titles
        .iter()
        .filter(|title| title.needs_attention())
        .map(|title| TitleReport {
            package: PackageReport::from_record(title.record()),
            update_available: title.record().any_update(),
            addons: title
                .addons()
                .iter()
                .filter(|addon| addon.any_update())
                .map(PackageReport::from_record)
                .collect(),
        })
        .collect()
}

/// Wrap the summary of `outcome` with run metadata.
pub fn build_report(outcome: &ScanOutcome, root: &Path) -> UpdateReport {
    let titles = summarize(&outcome.titles);
    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        generated_by: "gogchk_core".to_string(),
        root: root.display().to_string(),
        titles_scanned: outcome.titles.len(),
        addons_scanned: outcome.titles.iter().map(|t| t.addons().len()).sum(),
        titles_with_updates: titles.iter().filter(|t| t.update_available).count(),
        addons_with_updates: titles.iter().map(|t| t.addons.len()).sum(),
        failures: outcome
            .failures
            .iter()
            .map(|failure| FailureReport {
                directory: failure.directory.clone(),
                error: failure.error.to_string(),
            })
            .collect(),
    };
    UpdateReport { metadata, titles }
}

/// Line-oriented rendering; the title header appears once even when only
/// add-ons carry updates.
pub fn render_text(report: &UpdateReport) -> String {
    let mut out = String::new();
    if report.titles.is_empty() {
        out.push_str("No updates available.\n");
        return out;
    }
    for title in &report.titles {
        render_package(&mut out, &title.package, 0);
        for addon in &title.addons {
            render_package(&mut out, addon, 1);
        }
    }
    out
}

fn render_package(out: &mut String, package: &PackageReport, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&format!("{indent}{} {}\n", package.slug, package.id));
    for (platform, tags) in &package.new_versions {
        let label = format!("{}:", platform.label());
        let listed: Vec<&str> = tags.iter().map(VersionTag::as_str).collect();
        out.push_str(&format!(
            "{indent}{INDENT}{label:<7}{}\n",
            listed.join(", ")
        ));
    }
}

/// Persist the report as pretty JSON.
pub fn write_report(report: &UpdateReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            GogchkError::Filesystem(format!(
                "Failed to create report directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        GogchkError::Filesystem(format!(
            "Failed to create report file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, report).map_err(|err| {
        GogchkError::Filesystem(format!("Failed to write report {}: {err}", path.display()))
    })
}

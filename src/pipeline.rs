//! The constraints pipeline.
//!
//! Sources are fetched in order, ignored identifiers are dropped, the rest
//! are sorted by package, and each vulnerability is inverted into a safe
//! constraint. Constraints pip cannot parse are skipped.
//!
//! # Example
//!
//! ```no_run
//! use security_constraints::{default_sources, Configuration, ConstraintsGenerator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Configuration::default();
//!     let sources = default_sources(&config.requested_severities()?)?;
//!     let generator = ConstraintsGenerator::new(sources, config);
//!
//!     let mut out = std::io::stdout().lock();
//!     generator.run(&mut out, chrono::Utc::now()).await?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::config::Configuration;
use crate::constraints::{are_constraints_pip_friendly, safe_version_constraints};
use crate::error::{Result, SourceError};
use crate::model::SecurityVulnerability;
use crate::output::{format_constraints_file_line, Header};
use crate::source::AdvisorySource;

/// Counts from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub ignored: usize,
    pub emitted: usize,
    pub skipped: usize,
}

/// Fetches from every source in order, concatenating the results.
///
/// Stops at the first failing source.
pub async fn fetch_vulnerabilities(
    sources: &[Box<dyn AdvisorySource>],
) -> Result<Vec<SecurityVulnerability>, SourceError> {
    let mut vulnerabilities = Vec::new();
    for source in sources {
        tracing::debug!("Fetching vulnerabilities from {}...", source.database_name());
        vulnerabilities.extend(source.vulnerabilities().await?);
    }
    Ok(vulnerabilities)
}

/// Drops vulnerabilities whose identifier is in the configured ignore list.
pub fn filter_vulnerabilities(
    config: &Configuration,
    vulnerabilities: Vec<SecurityVulnerability>,
) -> Vec<SecurityVulnerability> {
    if config.ignore_ids.is_empty() {
        return vulnerabilities;
    }
    tracing::debug!("Applying ignore-ids...");
    vulnerabilities
        .into_iter()
        .filter(|v| !config.is_ignored(&v.identifier))
        .collect()
}

/// Stable sort by package name.
pub fn sort_vulnerabilities(
    mut vulnerabilities: Vec<SecurityVulnerability>,
) -> Vec<SecurityVulnerability> {
    vulnerabilities.sort_by(|a, b| a.package.cmp(&b.package));
    vulnerabilities
}

/// Renders the data lines for already filtered and sorted vulnerabilities.
fn render_lines(vulnerabilities: &[SecurityVulnerability]) -> Result<(Vec<String>, usize)> {
    let mut lines = Vec::with_capacity(vulnerabilities.len());
    let mut skipped = 0;

    for vulnerability in vulnerabilities {
        let constraints = safe_version_constraints(vulnerability);
        if constraints.is_empty() {
            tracing::debug!(
                id = %vulnerability.identifier,
                range = %vulnerability.vulnerable_range,
                "Unrecognised vulnerable range, ignoring"
            );
            skipped += 1;
            continue;
        }
        if !are_constraints_pip_friendly(&constraints) {
            skipped += 1;
            continue;
        }
        lines.push(format_constraints_file_line(&constraints, vulnerability)?);
    }

    Ok((lines, skipped))
}

/// Runs the whole pipeline against a set of sources.
pub struct ConstraintsGenerator {
    sources: Vec<Box<dyn AdvisorySource>>,
    config: Configuration,
}

impl ConstraintsGenerator {
    pub fn new(sources: Vec<Box<dyn AdvisorySource>>, config: Configuration) -> Self {
        Self { sources, config }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.database_name().to_string())
            .collect()
    }

    pub fn header(&self, generated_at: DateTime<Utc>) -> Header {
        Header::new(generated_at, self.source_names(), self.config.clone())
    }

    /// Fetches, transforms, and writes the constraints file to `out`.
    ///
    /// Nothing is written unless every source was fetched successfully.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails, if writing fails, or if an
    /// internal invariant is violated.
    pub async fn run<W: Write>(
        &self,
        out: &mut W,
        generated_at: DateTime<Utc>,
    ) -> Result<RunSummary> {
        let fetched = fetch_vulnerabilities(&self.sources).await?;
        let fetched_count = fetched.len();

        let remaining = filter_vulnerabilities(&self.config, fetched);
        let ignored = fetched_count - remaining.len();
        let sorted = sort_vulnerabilities(remaining);

        let (lines, skipped) = render_lines(&sorted)?;

        tracing::debug!("Writing constraints...");
        writeln!(out, "{}", self.header(generated_at))?;
        for line in &lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        let summary = RunSummary {
            fetched: fetched_count,
            ignored,
            emitted: lines.len(),
            skipped,
        };
        tracing::info!(
            fetched = summary.fetched,
            ignored = summary.ignored,
            emitted = summary.emitted,
            skipped = summary.skipped,
            "Constraints written"
        );
        Ok(summary)
    }
}

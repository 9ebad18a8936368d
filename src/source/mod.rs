//! Advisory sources.
//!
//! This module provides the [`AdvisorySource`] trait, implemented once per
//! backing advisory database. The pipeline depends only on the trait.
//!
//! # Available Sources
//!
//! | Source | Database | Credential |
//! |--------|----------|------------|
//! | [`GithubSecurityAdvisory`] | GitHub Security Advisory (PIP ecosystem) | `GITHUB_TOKEN` |

mod github;

pub use github::{GithubSecurityAdvisory, GITHUB_GRAPHQL_URL, GITHUB_TOKEN_VAR};

use crate::error::SourceError;
use crate::model::{SecurityVulnerability, Severity};
use async_trait::async_trait;

/// A provider of vulnerability records, queried once per run.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Stable, human-readable name of the backing database.
    fn database_name(&self) -> &str;

    /// Fetches every vulnerability matching the source's configured severities.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, missing credentials, or a
    /// response that cannot be interpreted. There is no retry.
    async fn vulnerabilities(&self) -> Result<Vec<SecurityVulnerability>, SourceError>;
}

/// Returns the sources to query, in the order their results are concatenated.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub fn default_sources(
    severities: &[Severity],
) -> Result<Vec<Box<dyn AdvisorySource>>, SourceError> {
    Ok(vec![Box::new(GithubSecurityAdvisory::from_env(
        severities.to_vec(),
    )?)])
}

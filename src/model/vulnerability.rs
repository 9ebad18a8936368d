use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Severity levels as assigned by advisory databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// The `SecurityAdvisorySeverity` enum value used by the GitHub GraphQL API.
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "moderate" => Ok(Severity::Moderate),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ConfigError::InvalidSeverity(s.to_string())),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A vulnerability affecting a range of versions of one package.
///
/// `vulnerable_range` holds one or two comma-separated clauses of the form
/// `<op> <version>`, e.g. `"< 2.0.0"` or `"<= 2.0.0, >= 1.0.0"`. When two
/// clauses are present the maximum-version clause comes first and the
/// minimum-version clause last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityVulnerability {
    pub identifier: String,
    pub name: String,
    pub package: String,
    pub vulnerable_range: String,
    pub severity: Severity,
}

impl SecurityVulnerability {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        package: impl Into<String>,
        vulnerable_range: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            package: package.into(),
            vulnerable_range: vulnerable_range.into(),
            severity,
        }
    }
}

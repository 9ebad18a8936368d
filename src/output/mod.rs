//! Rendering of the constraints file.
//!
//! The file starts with a `# `-prefixed [`Header`] followed by one line per
//! emitted constraint:
//!
//! ```text
//! # Generated by security-constraints 0.1.0 on 2024-05-01T12:00:00Z
//! # Data sources: Github Security Advisory
//! # Configuration: {"ignore_ids":[],"severities":["critical"]}
//! django>=3.2.1  # SQL injection in QuerySet.order_by (ID: GHSA-xxxx-xxxx-xxxx)
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::model::{PackageConstraints, SecurityVulnerability};

pub const APP_NAME: &str = "security-constraints";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Metadata written at the top of the constraints file.
#[derive(Debug, Clone)]
pub struct Header {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<String>,
    pub configuration: Configuration,
}

impl Header {
    pub fn new(
        generated_at: DateTime<Utc>,
        sources: Vec<String>,
        configuration: Configuration,
    ) -> Self {
        Self {
            generated_at,
            sources,
            configuration,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "# Generated by {} {} on {}",
                APP_NAME,
                APP_VERSION,
                self.generated_at.to_rfc3339_opts(SecondsFormat::Micros, true)
            ),
            format!("# Data sources: {}", self.sources.join(", ")),
            format!("# Configuration: {}", self.configuration),
        ]
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Formats one data line of the constraints file.
///
/// # Errors
///
/// Returns [`Error::Invariant`] if the constraints are not for the
/// vulnerability's package.
pub fn format_constraints_file_line(
    constraints: &PackageConstraints,
    vulnerability: &SecurityVulnerability,
) -> Result<String> {
    if constraints.package != vulnerability.package {
        return Err(Error::Invariant(format!(
            "constraints for '{}' paired with vulnerability {} of '{}'",
            constraints.package, vulnerability.identifier, vulnerability.package
        )));
    }
    Ok(format!(
        "{}  # {} (ID: {})",
        constraints, vulnerability.name, vulnerability.identifier
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comparator, Severity, Specifier};
    use chrono::TimeZone;

    fn vuln(package: &str) -> SecurityVulnerability {
        SecurityVulnerability::new(
            "GHSA-1234",
            "Remote code execution",
            package,
            "< 2.0",
            Severity::Critical,
        )
    }

    #[test]
    fn test_header_lines() {
        let header = Header::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            vec!["Source A".to_string(), "Source B".to_string()],
            Configuration::default(),
        );

        let lines = header.lines();

        assert_eq!(
            lines[0],
            format!(
                "# Generated by security-constraints {} on 2024-05-01T12:30:00.000000Z",
                APP_VERSION
            )
        );
        assert_eq!(lines[1], "# Data sources: Source A, Source B");
        assert_eq!(
            lines[2],
            r#"# Configuration: {"ignore_ids":[],"severities":["critical"]}"#
        );
        assert!(header.to_string().lines().all(|l| l.starts_with("# ")));
    }

    #[test]
    fn test_format_line() {
        let constraints = PackageConstraints::new(
            "flask",
            vec![Specifier::new(Comparator::GreaterThanOrEqual, "2.0")],
        );

        let line = format_constraints_file_line(&constraints, &vuln("flask")).unwrap();

        assert_eq!(line, "flask>=2.0  # Remote code execution (ID: GHSA-1234)");
    }

    #[test]
    fn test_format_line_rejects_package_mismatch() {
        let constraints = PackageConstraints::new(
            "django",
            vec![Specifier::new(Comparator::LessThan, "1.0")],
        );

        let err = format_constraints_file_line(&constraints, &vuln("flask")).unwrap_err();

        assert!(matches!(err, Error::Invariant(_)));
        assert!(!err.is_domain_error());
    }
}

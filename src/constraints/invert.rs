use crate::model::{Comparator, PackageConstraints, SecurityVulnerability, Specifier};

/// Operators that can open an affected-range clause, paired with the safe
/// comparator that excludes the same boundary. `<= ` must be tried before `< `.
const INVERSIONS: [(&str, Comparator); 4] = [
    ("= ", Comparator::NotEqual),
    ("<= ", Comparator::GreaterThan),
    ("< ", Comparator::GreaterThanOrEqual),
    (">= ", Comparator::LessThan),
];

/// Inverts a vulnerability's affected range into constraints on unaffected versions.
///
/// Only the minimum-affected clause of a two-clause range is inverted: a
/// single inequality cannot exclude a bounded interval, so the result is
/// `<min` rather than an unsatisfiable pair. An unrecognised operator yields
/// constraints with no specifiers.
///
/// # Example
///
/// ```
/// use security_constraints::{safe_version_constraints, SecurityVulnerability, Severity};
///
/// let vuln = SecurityVulnerability::new(
///     "GHSA-1234", "Bad thing", "django", "<= 2.0.0, >= 1.0.0", Severity::High,
/// );
///
/// assert_eq!(safe_version_constraints(&vuln).to_string(), "django<1.0.0");
/// ```
pub fn safe_version_constraints(vulnerability: &SecurityVulnerability) -> PackageConstraints {
    let clause = operative_clause(&vulnerability.vulnerable_range);
    let specifiers = invert_clause(clause).into_iter().collect();
    PackageConstraints::new(vulnerability.package.clone(), specifiers)
}

/// The last comma-separated clause, which holds the minimum affected version.
fn operative_clause(range: &str) -> &str {
    range.rsplit(',').next().unwrap_or(range).trim()
}

fn invert_clause(clause: &str) -> Option<Specifier> {
    INVERSIONS.iter().find_map(|(prefix, comparator)| {
        let version = clause.strip_prefix(prefix)?.trim();
        Some(Specifier::new(*comparator, version))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn vuln(range: &str) -> SecurityVulnerability {
        SecurityVulnerability::new("GHSA-test", "Test", "pkg", range, Severity::Critical)
    }

    fn invert(range: &str) -> String {
        safe_version_constraints(&vuln(range)).to_string()
    }

    #[test]
    fn test_invert_equal() {
        assert_eq!(invert("= 1.2.3"), "pkg!=1.2.3");
    }

    #[test]
    fn test_invert_less_than_or_equal() {
        assert_eq!(invert("<= 1.2.3"), "pkg>1.2.3");
    }

    #[test]
    fn test_invert_less_than() {
        assert_eq!(invert("< 1.2.3"), "pkg>=1.2.3");
    }

    #[test]
    fn test_invert_greater_than_or_equal() {
        assert_eq!(invert(">= 1.2.3"), "pkg<1.2.3");
    }

    #[test]
    fn test_two_clauses_keep_minimum_bound() {
        let constraints = safe_version_constraints(&vuln("<= 2.0.0, >= 1.0.0"));

        assert_eq!(
            constraints.specifiers,
            vec![Specifier::new(Comparator::LessThan, "1.0.0")]
        );
    }

    #[test]
    fn test_two_clauses_with_strict_upper_bound() {
        assert_eq!(invert("< 3.1, >= 3.0"), "pkg<3.0");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(invert("  < 1.0  "), "pkg>=1.0");
    }

    #[test]
    fn test_unknown_operator_yields_no_specifiers() {
        assert!(safe_version_constraints(&vuln("> 1.0")).is_empty());
        assert!(safe_version_constraints(&vuln("~= 1.0")).is_empty());
        assert!(safe_version_constraints(&vuln("1.0")).is_empty());
        assert!(safe_version_constraints(&vuln("")).is_empty());
    }

    #[test]
    fn test_operator_without_space_is_not_recognised() {
        assert!(safe_version_constraints(&vuln("<1.0")).is_empty());
    }

    #[test]
    fn test_package_is_preserved() {
        let constraints = safe_version_constraints(&vuln("< 1.0"));
        assert_eq!(constraints.package, "pkg");
    }
}

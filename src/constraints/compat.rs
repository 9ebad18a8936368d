use crate::model::PackageConstraints;

/// Returns whether pip can correctly apply every specifier in `constraints`.
///
/// pip cannot order versions with pre-release or local suffixes (e.g.
/// `2.5.0a5`) in an inequality, so comparisons must use plain dotted-numeric
/// versions. Exclusions (`!=`) are always accepted.
pub fn are_constraints_pip_friendly(constraints: &PackageConstraints) -> bool {
    for spec in &constraints.specifiers {
        if spec.comparator.is_exclusion() {
            continue;
        }
        if !is_plain_numeric_version(&spec.version) {
            tracing::debug!(
                package = %constraints.package,
                constraint = %spec,
                "Pip-unfriendly constraint, ignoring"
            );
            return false;
        }
    }
    true
}

fn is_plain_numeric_version(version: &str) -> bool {
    let version = version.trim_matches(|c: char| matches!(c, '<' | '>' | '=' | '!' | ' '));
    let digits = version.replace('.', "");
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

use serde::{Deserialize, Serialize};

/// Comparison operators that can appear in a safe-version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::NotEqual => "!=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::LessThan => "<",
        }
    }

    /// Returns true for exclusions, which pip handles for any version string.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, Comparator::NotEqual)
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<op><version>` clause, rendered without a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    pub comparator: Comparator,
    pub version: String,
}

impl Specifier {
    pub fn new(comparator: Comparator, version: impl Into<String>) -> Self {
        Self {
            comparator,
            version: version.into(),
        }
    }
}

impl std::fmt::Display for Specifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.comparator, self.version)
    }
}

/// Versions of a package known not to be affected by a vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConstraints {
    pub package: String,
    pub specifiers: Vec<Specifier>,
}

impl PackageConstraints {
    pub fn new(package: impl Into<String>, specifiers: Vec<Specifier>) -> Self {
        Self {
            package: package.into(),
            specifiers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }
}

impl std::fmt::Display for PackageConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.package)?;
        for (i, spec) in self.specifiers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}

//! Core data types for vulnerabilities and version constraints.
//!
//! - [`SecurityVulnerability`] - A vulnerability as reported by an advisory source
//! - [`Severity`] - Source-assigned severity level
//! - [`PackageConstraints`] - Safe-version constraints for one package
//! - [`Specifier`] / [`Comparator`] - A single `<op><version>` clause
//!
//! # Example
//!
//! ```
//! use security_constraints::{Comparator, PackageConstraints, Specifier};
//!
//! let constraints = PackageConstraints::new(
//!     "django",
//!     vec![Specifier::new(Comparator::GreaterThanOrEqual, "4.2.1")],
//! );
//!
//! assert_eq!(constraints.to_string(), "django>=4.2.1");
//! ```

mod constraints;
mod vulnerability;

pub use constraints::*;
pub use vulnerability::*;

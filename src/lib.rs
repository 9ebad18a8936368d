pub mod config;
pub mod constraints;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod source;

pub use config::Configuration;
pub use constraints::{are_constraints_pip_friendly, safe_version_constraints};
pub use error::{ConfigError, Error, SourceError};
pub use model::{Comparator, PackageConstraints, SecurityVulnerability, Severity, Specifier};
pub use pipeline::{ConstraintsGenerator, RunSummary};
pub use source::{default_sources, AdvisorySource, GithubSecurityAdvisory};

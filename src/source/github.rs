use crate::error::SourceError;
use crate::model::{SecurityVulnerability, Severity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Environment variable holding the GitHub API token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

const DATABASE_NAME: &str = "Github Security Advisory";

/// Maximum page size accepted by the GitHub GraphQL API.
const PAGE_SIZE: u32 = 100;

const QUERY: &str = r#"query($first: Int!, $after: String, $severities: [SecurityAdvisorySeverity!]) {
  securityVulnerabilities(first: $first, after: $after, ecosystem: PIP, severities: $severities) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      advisory {
        ghsaId
        summary
        withdrawnAt
      }
      package {
        name
      }
      severity
      vulnerableVersionRange
    }
  }
}"#;

/// GitHub Security Advisory database, restricted to the PIP ecosystem.
pub struct GithubSecurityAdvisory {
    client: reqwest::Client,
    token: Option<String>,
    endpoint: String,
    severities: Vec<Severity>,
}

impl GithubSecurityAdvisory {
    pub fn new(token: Option<String>, severities: Vec<Severity>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("security-constraints/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SourceError::Network {
                database: DATABASE_NAME.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            endpoint: GITHUB_GRAPHQL_URL.to_string(),
            severities,
        })
    }

    /// Reads the token from `GITHUB_TOKEN`. A missing token is reported when fetching.
    pub fn from_env(severities: Vec<Severity>) -> Result<Self, SourceError> {
        Self::new(std::env::var(GITHUB_TOKEN_VAR).ok(), severities)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_page(
        &self,
        token: &str,
        after: Option<&str>,
    ) -> Result<VulnerabilityConnection, SourceError> {
        let request = GraphQlRequest {
            query: QUERY,
            variables: QueryVariables {
                first: PAGE_SIZE,
                after,
                severities: self.severities.iter().map(Severity::as_graphql).collect(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                database: DATABASE_NAME.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| SourceError::Malformed {
            database: DATABASE_NAME.to_string(),
            message: e.to_string(),
        })?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SourceError::Query {
                database: DATABASE_NAME.to_string(),
                message,
            });
        }

        body.data
            .map(|data| data.security_vulnerabilities)
            .ok_or_else(|| SourceError::Malformed {
                database: DATABASE_NAME.to_string(),
                message: "response contains no data".to_string(),
            })
    }
}

fn network_error(source: reqwest::Error) -> SourceError {
    SourceError::Network {
        database: DATABASE_NAME.to_string(),
        source,
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: QueryVariables<'a>,
}

#[derive(Serialize)]
struct QueryVariables<'a> {
    first: u32,
    after: Option<&'a str>,
    severities: Vec<&'static str>,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct QueryData {
    #[serde(rename = "securityVulnerabilities")]
    security_vulnerabilities: VulnerabilityConnection,
}

#[derive(Deserialize)]
struct VulnerabilityConnection {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    nodes: Vec<VulnerabilityNode>,
}

#[derive(Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct VulnerabilityNode {
    advisory: AdvisoryNode,
    package: PackageNode,
    severity: String,
    #[serde(rename = "vulnerableVersionRange")]
    vulnerable_version_range: String,
}

#[derive(Deserialize)]
struct AdvisoryNode {
    #[serde(rename = "ghsaId")]
    ghsa_id: String,
    summary: String,
    #[serde(rename = "withdrawnAt")]
    withdrawn_at: Option<String>,
}

#[derive(Deserialize)]
struct PackageNode {
    name: String,
}

impl VulnerabilityNode {
    fn into_vulnerability(self) -> Result<SecurityVulnerability, SourceError> {
        let severity = self
            .severity
            .parse::<Severity>()
            .map_err(|_| SourceError::Malformed {
                database: DATABASE_NAME.to_string(),
                message: format!(
                    "unknown severity '{}' for {}",
                    self.severity, self.advisory.ghsa_id
                ),
            })?;

        Ok(SecurityVulnerability {
            identifier: self.advisory.ghsa_id,
            name: self.advisory.summary,
            package: self.package.name,
            vulnerable_range: self.vulnerable_version_range,
            severity,
        })
    }
}

#[async_trait]
impl super::AdvisorySource for GithubSecurityAdvisory {
    fn database_name(&self) -> &str {
        DATABASE_NAME
    }

    async fn vulnerabilities(&self) -> Result<Vec<SecurityVulnerability>, SourceError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| SourceError::MissingToken {
                database: DATABASE_NAME.to_string(),
                variable: GITHUB_TOKEN_VAR,
            })?;

        let mut vulnerabilities = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            tracing::debug!(page, "Fetching vulnerabilities from {}", DATABASE_NAME);

            let connection = self.fetch_page(token, cursor.as_deref()).await?;

            for node in connection.nodes {
                if node.advisory.withdrawn_at.is_some() {
                    tracing::debug!(id = %node.advisory.ghsa_id, "Skipping withdrawn advisory");
                    continue;
                }
                vulnerabilities.push(node.into_vulnerability()?);
            }

            match connection.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(end_cursor),
                } => cursor = Some(end_cursor),
                PageInfo {
                    has_next_page: true,
                    end_cursor: None,
                } => {
                    return Err(SourceError::Malformed {
                        database: DATABASE_NAME.to_string(),
                        message: "next page announced without a cursor".to_string(),
                    })
                }
                PageInfo {
                    has_next_page: false,
                    ..
                } => break,
            }
        }

        tracing::debug!(
            count = vulnerabilities.len(),
            pages = page,
            "Fetched vulnerabilities from {}",
            DATABASE_NAME
        );

        Ok(vulnerabilities)
    }
}

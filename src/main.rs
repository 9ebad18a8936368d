use anyhow::{Context, Result};
use clap::Parser;
use security_constraints::{
    config::Configuration, default_sources, error::Error, ConfigError,
    ConstraintsGenerator, Severity,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const DOMAIN_ERROR: u8 = 1;
    pub const UNEXPECTED_ERROR: u8 = 2;
}

#[derive(Parser)]
#[command(name = "security-constraints")]
#[command(
    author,
    version,
    about = "Fetches security vulnerabilities from external sources and creates a list of \
             pip-compatible version constraints that can be used to avoid versions affected \
             by the vulnerabilities"
)]
struct Cli {
    /// Print the config file corresponding to the current settings and exit
    #[arg(long)]
    dump_config: bool,

    /// Debugging output
    #[arg(long)]
    debug: bool,

    /// Output file name or '-' for stdout
    #[arg(long, default_value = "-")]
    output: String,

    /// IDs of vulnerabilities to ignore (also 'ignore_ids' in the config file)
    #[arg(long, num_args = 1..)]
    ignore_ids: Vec<String>,

    /// Path to a TOML or YAML configuration file (keys: ignore_ids, severities)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vulnerability severities to include (also 'severities' in the config file)
    #[arg(long, num_args = 1..)]
    severities: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => match e.downcast_ref::<Error>() {
            Some(domain) if domain.is_domain_error() => {
                tracing::error!("{}", domain);
                ExitCode::from(exit_codes::DOMAIN_ERROR)
            }
            _ => {
                tracing::error!("Caught unhandled error at top-level: {:?}", e);
                ExitCode::from(exit_codes::UNEXPECTED_ERROR)
            }
        },
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref()).map_err(Error::from)?;
    let severities = parse_severities(&cli.severities).map_err(Error::from)?;
    config.merge_cli(cli.ignore_ids, severities);

    if cli.dump_config {
        print!("{}", config.to_toml().context("Failed to render config")?);
        return Ok(());
    }

    let requested = config.requested_severities().map_err(Error::from)?;
    let sources = default_sources(&requested).map_err(Error::from)?;
    let generator = ConstraintsGenerator::new(sources, config);

    // Closed when dropped, on success and on every error path.
    let mut output = open_output(&cli.output)?;
    generator.run(&mut output, chrono::Utc::now()).await?;
    output.flush().map_err(Error::from)?;
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Configuration, ConfigError> {
    match path {
        Some(path) => Configuration::load(path),
        None => Ok(Configuration::default()),
    }
}

fn parse_severities(values: &[String]) -> Result<Vec<Severity>, ConfigError> {
    values.iter().map(|s| s.parse::<Severity>()).collect()
}

fn open_output(target: &str) -> Result<Box<dyn Write>> {
    if target == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(target)
        .with_context(|| format!("Failed to open output file: {}", target))?;
    Ok(Box::new(BufWriter::new(file)))
}

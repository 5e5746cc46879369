use anyhow::Context;
use clap::Parser;
use etox_extract::config::ExtractConfig;
use etox_extract::constants::DEFAULT_DB_USER;
use etox_extract::logging;
use etox_extract::pipeline;
use etox_extract::source::{PostgresSource, SourceCredentials};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "etox-extract")]
#[command(about = "Create and store study, findings, ontology and normalisation datasets")]
#[command(version = "0.1.0")]
struct Cli {
    /// PostgreSQL DB username
    #[arg(short = 'u', long, default_value = DEFAULT_DB_USER)]
    user: String,

    /// PostgreSQL DB password
    #[arg(short = 'p', long)]
    passw: String,

    /// Database host (overrides config and ETOX_DB_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Database port (overrides config and ETOX_DB_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database name (overrides config and ETOX_DB_NAME)
    #[arg(long)]
    dbname: Option<String>,

    /// Directory the datasets are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to a TOML configuration file (default: ./extract.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<ExtractConfig> {
        let mut config = ExtractConfig::load(self.config.as_deref())?;
        config.apply_env()?;

        if let Some(host) = &self.host {
            config.database.host = host.clone();
        }
        if let Some(port) = self.port {
            config.database.port = port;
        }
        if let Some(dbname) = &self.dbname {
            config.database.dbname = dbname.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        Ok(config)
    }

    fn credentials(&self, config: &ExtractConfig) -> SourceCredentials {
        SourceCredentials {
            host: config.database.host.clone(),
            port: config.database.port,
            dbname: config.database.dbname.clone(),
            user: self.user.clone(),
            password: self.passw.clone(),
        }
    }
}

async fn extract(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config().context("invalid configuration")?;
    let credentials = cli.credentials(&config);

    let mut source = PostgresSource::connect(&credentials).await?;
    // On error the connection is dropped with `source`
    let result = pipeline::run(&mut source, &config).await?;
    source.close().await?;

    info!(
        studies = result.studies,
        findings = result.findings,
        normalisation_entries = result.normalisation_entries,
        "Run complete"
    );
    for file in &result.manifest.files {
        info!(dataset = %file.dataset, rows = file.rows, sha256 = %file.sha256, "{}", file.file);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors exit here, before logging or any connection attempt
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    match extract(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Extraction failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

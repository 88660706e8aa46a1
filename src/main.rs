use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use typings_relay::config::{DEFAULT_CONFIG_FILE, LOG_ENV, RelayConfig};
use typings_relay::publish::channel::channel_of;
use typings_relay::publish::package_manager::NpmCli;
use typings_relay::publish::workspace::FsWorkspace;
use typings_relay::runner;
use typings_relay::version::registries::NpmRegistry;
use typings_relay::version::semver::parse_version;

#[derive(Parser)]
#[command(name = "typings-relay")]
#[command(version, about = "Republish upstream type declarations for every new release")]
struct Cli {
    /// Config file (defaults to ./typings-relay.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Override the upstream package name
    #[arg(long, global = true)]
    package: Option<String>,

    /// Override the registry base URL
    #[arg(long, global = true)]
    registry: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Publish every release newer than the marker (default)
    Run {
        /// Exit with status 2 when any release failed
        #[arg(long)]
        fail_on_error: bool,
    },
    /// List the releases a run would publish
    Pending,
    /// Print the channel a version would be published under
    Channel { version: String },
}

fn init_logging(log_file: Option<&Path>, json: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {:?}", path))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none() && !json);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(guard)
}

fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => RelayConfig::load(path, true)?,
        None => RelayConfig::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };
    if let Some(package) = &cli.package {
        config.upstream.package = package.clone();
    }
    if let Some(registry) = &cli.registry {
        config.registry.url = registry.clone();
    }
    Ok(config)
}

async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;
    let registry = NpmRegistry::with_timeout(
        &config.registry.url,
        Duration::from_secs(config.registry.timeout_secs),
    );

    match cli.command.unwrap_or(Command::Run {
        fail_on_error: false,
    }) {
        Command::Run { fail_on_error } => {
            let package_manager = NpmCli::new(
                config.publish.npm.clone(),
                config.paths.install_dir(),
                config.publish.access.clone(),
                Duration::from_secs(config.publish.step_timeout_secs),
            )
            .with_protected_paths([config.paths.manifest.clone(), config.paths.marker.clone()]);
            let workspace = FsWorkspace::new(
                config.paths.manifest.clone(),
                config.paths.marker.clone(),
                config.paths.output.clone(),
                config.upstream.artifact.clone(),
            );

            let summary = runner::run(&config, &registry, &package_manager, &workspace).await?;

            for version in &summary.published {
                println!("published {}", version);
            }
            for (version, reason) in &summary.failed {
                println!("failed    {}: {}", version, reason);
            }
            println!(
                "{} published, {} skipped, {} failed; last published: {}",
                summary.published.len(),
                summary.skipped.len(),
                summary.failed.len(),
                summary
                    .final_marker
                    .as_ref()
                    .map_or_else(|| "none".to_string(), ToString::to_string)
            );

            if fail_on_error && summary.has_failures() {
                Ok(ExitCode::from(2))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Pending => {
            for version in runner::pending(&config, &registry).await? {
                println!("{}", version);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Channel { version } => {
            let version = parse_version(&version)?;
            println!("{}", channel_of(&version));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_file.as_deref(), cli.json_logs) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(execute(cli)));

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

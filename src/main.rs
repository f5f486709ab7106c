//! # source-diff
//!
//! Compares the verified sources of a fixed set of contracts deployed on two chains, as reported
//! by two Etherscan-compatible explorers, and dumps the sources of any contract that differs. See
//! the crate [README](../README.md) for configuration details.
use clap::Parser;
use source_diff::{config, telemetry, Comparator, ContractRole};
use std::{path::PathBuf, process::ExitCode};

#[derive(Clone, Debug, Parser)]
#[command(about = "Compare verified contract sources between two block explorers")]
struct Args {
    /// Additional configuration file, applied over the built-in defaults and `config/`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only compare these roles. May be repeated. Defaults to every role.
    #[arg(long = "role")]
    roles: Vec<ContractRole>,

    /// Directory for `<role>.origin.txt` and `<role>.fork.txt`. Overrides
    /// `application.output_dir`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

/// Entrypoint for the application.
#[tokio::main]
async fn main() -> ExitCode {
    let subscriber =
        telemetry::get_subscriber("source-diff".into(), "info".into(), std::io::stderr);
    telemetry::init_subscriber(subscriber);

    match run(Args::parse()).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let mut settings = config::get_configuration(args.config.as_deref())?;
    if let Some(output_dir) = args.output_dir {
        settings.application.output_dir = output_dir;
    }

    // Keep the declared order regardless of the order flags were given in.
    let roles: Vec<ContractRole> = ContractRole::ALL
        .into_iter()
        .filter(|role| args.roles.is_empty() || args.roles.contains(role))
        .collect();

    let comparator = Comparator::from_settings(&settings)?;
    tracing::info!(
        origin = %settings.origin.name,
        fork = %settings.fork.name,
        roles = roles.len(),
        "Starting comparison"
    );

    let stdout = std::io::stdout();
    let summary = comparator.run(&roles, &mut stdout.lock()).await?;
    Ok(summary.exit_code())
}

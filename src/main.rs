use clap::Parser;
use rulegroup_mutator::cli::{execute_command, get_log_level, Cli};
use rulegroup_mutator::config::MutatorConfig;
use tracing::{debug, error, trace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = MutatorConfig::load(cli.config.as_deref());

    let log_level = match (get_log_level(cli.verbose), &config) {
        (Some(level), _) => level.to_string(),
        (None, Ok(config)) => config.log_level.clone(),
        (None, Err(_)) => "info".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("rgmut started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match config {
        Ok(config) => execute_command(cli.command, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

use anyhow::Result;
use n8n_cli::{Cli, Commands, Parser};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.global.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = cli.global.connect()?;
    let instance = cli.global.instance.as_deref();

    match cli.command {
        Commands::Workflow { subcommand } => subcommand.run(api.as_ref(), instance).await,
        Commands::Execution { subcommand } => subcommand.run(api.as_ref(), instance).await,
        Commands::Tag { subcommand } => subcommand.run(api.as_ref(), instance).await,
        Commands::Instances => n8n_cli::instances::run(api.as_ref()),
    }
}

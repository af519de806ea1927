use clap::Parser;
use mptd::cli::Cli;
use mptd::collector::TdPlugin;
use mptd::config::Config;
use mptd::observability;
use mptd::plugin::{Mode, PluginRunner};
use mptd::td::TdClient;
use std::process::ExitCode;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Exit status for any failed API call or unusable configuration
const FAILURE_EXIT_CODE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    observability::init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Printed unconditionally; RUST_LOG may silence tracing entirely
            eprintln!("{e}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

async fn run(cli: Cli) -> Result<(), AnyError> {
    let mut config = Config::load_unvalidated(cli.config.clone())?;
    cli.apply(&mut config);
    config.validate()?;

    let client = TdClient::new(config.api.client_config())?;
    let plugin = TdPlugin::new(&client, &config.plugin);

    let mode = Mode::from_env();
    tracing::debug!(?mode, endpoint = %client.endpoint(), "Running plugin");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    PluginRunner::new(&plugin).run(mode, &mut out).await?;

    Ok(())
}

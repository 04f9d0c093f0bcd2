// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run one command.
// - Every failure ends up here and becomes exit code 1.

use chaindb_cli::cli::{Cli, Commands};
use chaindb_cli::commands::{self, Command};
use chaindb_cli::store::ConfigStore;
use chaindb_cli::ui::{self, Spinner};
use chaindb_cli::{ApiClient, CliResult};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = match std::env::var("CHAINDB_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Config { host, show } => {
            let store = ConfigStore::from_home();
            if show {
                println!("{}", store.load().host);
                return Ok(());
            }
            let host = match host {
                Some(host) => host,
                None => ui::prompt_host(&store.load().host)?,
            };
            ui::print_report(&commands::configure(&store, &host)?);
        }
        Commands::Db(cmd) => remote(cmd.into())?,
        Commands::Table(cmd) => remote(cmd.into())?,
    }
    Ok(())
}

fn remote(command: Command) -> CliResult<()> {
    let client = ApiClient::from_home()?;
    let report = commands::run(&client, &command, &mut Spinner::default())?;
    ui::print_report(&report);
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {e}");
    }

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

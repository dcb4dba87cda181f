use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use thog_cli::commands::{export, person, report, sessions, snapshot, status, timer};
use thog_cli::{Cli, Commands, Config, SessionsAction};

/// Load config and open the data store, honoring the `--data` override.
fn open_store(config_path: Option<&Path>, data_override: Option<&Path>) -> Result<thog_store::Store> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let data_path = data_override.map_or(config.data_path, Path::to_path_buf);
    let store = thog_store::Store::open(data_path).context("failed to open data store")?;
    Ok(store)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let store = open_store(cli.config.as_deref(), cli.data.as_deref())?;

    match command {
        Commands::Add {
            name,
            avatar,
            color,
        } => {
            person::add(&store, name, avatar.clone(), color.clone())?;
        }
        Commands::Remove { person } => {
            person::remove(&store, person)?;
        }
        Commands::Start { person } => {
            timer::start(&store, person)?;
        }
        Commands::Stop { person, all } => {
            if *all {
                timer::stop_all(&store)?;
            } else {
                let person = person
                    .as_deref()
                    .context("specify a person or pass --all")?;
                timer::stop(&store, person)?;
            }
        }
        Commands::Reset { person, all, force } => {
            if *all {
                timer::reset_all(&store, *force)?;
            } else {
                let person = person
                    .as_deref()
                    .context("specify a person or pass --all")?;
                timer::reset(&store, person, *force)?;
            }
        }
        Commands::Status => {
            status::run(&store)?;
        }
        Commands::Sessions { person, action } => match action {
            SessionsAction::List => sessions::list(&store, person)?,
            SessionsAction::Add { start, end } => sessions::add(&store, person, start, end)?,
            SessionsAction::Edit {
                session,
                start,
                end,
            } => sessions::edit(&store, person, *session, start.as_deref(), end.as_deref())?,
            SessionsAction::Delete { session } => sessions::delete(&store, person, *session)?,
        },
        Commands::Report { range, view } => {
            report::run(&store, *range, *view)?;
        }
        Commands::Export { detailed } => {
            export::run(&store, *detailed)?;
        }
        Commands::Snapshot => {
            snapshot::run(&store)?;
        }
    }

    Ok(())
}

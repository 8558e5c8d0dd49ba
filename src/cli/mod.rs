// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::CliResult;
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use termcolor::StandardStream;
use tracing::debug;

pub mod args;
pub mod commands;
pub mod display;
pub mod error;

pub fn execute_command_with_services(
    stderr: StandardStream,
    cli: Cli,
    services: ServiceContainer,
    settings: &Settings,
) -> CliResult<()> {
    debug!("Executing with database {}", settings.db_url);
    let config_file = cli.config.as_deref();

    match cli.command {
        Some(Commands::Show {
            format,
            no_dedup,
            no_refresh,
            ref source,
        }) => commands::show(
            &services,
            config_file,
            format,
            !no_dedup,
            !no_refresh,
            source.as_deref(),
        ),
        Some(Commands::Update) => commands::update(&services),
        Some(Commands::ListPlugins) => commands::list_plugins(&services),
        Some(Commands::Check { timeout }) => commands::check(stderr, &services, timeout),
        None => Ok(()),
    }
}

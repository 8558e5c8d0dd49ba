// src/cli/commands.rs
use crate::cli::args::OutputFormat;
use crate::cli::display::{write_bookmarks_as_text, write_check_summary, write_unreachable};
use crate::cli::error::{CliError, CliResult};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::http::{check_client, check_website};
use crate::infrastructure::json::{write_bookmarks_as_json, JsonBookmarkView};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use termcolor::StandardStream;
use tracing::{debug, instrument, warn};

#[instrument(skip(services), level = "debug")]
pub fn show(
    services: &ServiceContainer,
    config_file: Option<&Path>,
    format: OutputFormat,
    deduplicate: bool,
    refresh: bool,
    source: Option<&str>,
) -> CliResult<()> {
    let bookmarks = match source {
        Some(name) => services.bookmark_service.bookmarks_by_plugin(name)?,
        None => services.bookmark_service.load_bookmarks(deduplicate)?,
    };
    debug!("Showing {} bookmarks", bookmarks.len());

    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let views = JsonBookmarkView::from_domain_collection(&bookmarks);
            write_bookmarks_as_json(&mut stdout, &views)?;
        }
        OutputFormat::Text => write_bookmarks_as_text(&mut stdout, &bookmarks)?,
    }

    if refresh && source.is_none() {
        if let Err(e) = spawn_background_update(config_file) {
            warn!("Could not start background update: {}", e);
        }
    }
    Ok(())
}

#[instrument(skip(services), level = "debug")]
pub fn update(services: &ServiceContainer) -> CliResult<()> {
    let bookmarks = services
        .bookmark_service
        .refresh_bookmarks()
        .map_err(|e| CliError::from(e).context("update"))?;
    eprintln!("Stored {} bookmarks", bookmarks.len());
    Ok(())
}

pub fn list_plugins(services: &ServiceContainer) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    for name in services.bookmark_service.list_plugins()? {
        writeln!(stdout, "{}", name)?;
    }
    Ok(())
}

#[instrument(skip(stderr, services), level = "debug")]
pub fn check(mut stderr: StandardStream, services: &ServiceContainer, timeout: u64) -> CliResult<()> {
    if timeout == 0 {
        return Err(CliError::InvalidInput("timeout must be positive".to_string()));
    }

    let bookmarks = services.bookmark_service.load_bookmarks(true)?;
    let client = check_client(timeout);
    let mut stdout = io::stdout().lock();
    let mut checked = 0;
    let mut unreachable = 0;

    for bookmark in bookmarks
        .iter()
        .filter(|b| b.uri.starts_with("http://") || b.uri.starts_with("https://"))
    {
        let status = check_website(&client, &bookmark.uri);
        checked += 1;
        if !status.is_reachable() {
            unreachable += 1;
            write_unreachable(&mut stdout, bookmark, &status)?;
        }
    }

    write_check_summary(&mut stderr, checked, unreachable)?;
    Ok(())
}

/// Starts `marks update` detached from the terminal; the current process does not wait.
fn spawn_background_update(config_file: Option<&Path>) -> io::Result<()> {
    let exe = std::env::current_exe()?;
    let mut command = Command::new(exe);
    if let Some(path) = config_file {
        command.arg("--config").arg(path);
    }
    let child = command
        .arg("update")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    debug!("Started background update, pid {}", child.id());
    Ok(())
}

// src/main.rs
use clap::Parser;
use crossterm::style::Stylize;
use marks::cli::args::Cli;
use marks::config::{generate_default_config, load_settings, Settings};
use marks::exitcode;
use marks::infrastructure::di::ServiceContainer;
use termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, format::FmtSpan},
    prelude::*,
};

#[instrument]
fn main() {
    let cli = Cli::parse();

    // use stderr as human output in order to make stdout output passable to downstream processes
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let stderr = StandardStream::stderr(color);

    setup_logging(cli.debug, cli.no_color);

    if cli.generate_config {
        println!("{}", generate_default_config());
        return;
    }

    let settings = load_settings(cli.config.as_deref()).unwrap_or_else(|e| {
        debug!("Failed to load settings: {}. Using defaults.", e);
        Settings::default()
    });

    let service_container = match ServiceContainer::new(&settings) {
        Ok(container) => container,
        Err(e) => {
            eprintln!("{}: {}", "Failed to create service container".red(), e);
            std::process::exit(exitcode::UNAVAILABLE);
        }
    };

    if let Err(e) =
        marks::cli::execute_command_with_services(stderr, cli, service_container, &settings)
    {
        eprintln!("{}", format!("Error: {}", e).red());
        let code = if e.is_usage() {
            exitcode::USAGE
        } else {
            exitcode::UNAVAILABLE
        };
        std::process::exit(code);
    }
}

fn setup_logging(verbosity: u8, no_color: bool) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    let noisy_modules = ["reqwest", "hyper_util", "mio", "want", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(!no_color)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => info!("Debug mode: info"),
        LevelFilter::DEBUG => debug!("Debug mode: debug"),
        LevelFilter::TRACE => debug!("Debug mode: trace"),
        _ => {}
    }
}

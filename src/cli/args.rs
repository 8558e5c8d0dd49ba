// src/cli/args.rs
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Collects the bookmarks of all installed browsers into one list
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long = "no-color", help = "disable colored output")]
    pub no_color: bool,

    #[arg(long = "generate-config", help = "print the default configuration and exit")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints the bookmarks, refreshing the store in the background
    Show {
        #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(long = "no-dedup", help = "keep bookmarks sharing title and url")]
        no_dedup: bool,

        #[arg(long = "no-refresh", help = "do not start a background update")]
        no_refresh: bool,

        #[arg(
            short = 's',
            long = "source",
            help = "read only this source, e.g. Firefox (bypasses the store)"
        )]
        source: Option<String>,
    },

    /// Re-reads all browsers and replaces the stored bookmarks
    Update,

    /// Lists the sources that could be initialized
    ListPlugins,

    /// Checks stored bookmark urls and prints the unreachable ones
    Check {
        #[arg(long = "timeout", value_name = "MS", default_value_t = 3000)]
        timeout: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `title<TAB>url` per line
    Text,
    /// Pretty printed JSON array
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn given_cli_command_when_verify_then_debug_asserts_pass() {
        Cli::command().debug_assert()
    }

    #[test]
    fn given_show_args_when_parsed_then_flags_set() {
        let cli = Cli::parse_from([
            "marks", "-c", "/tmp/c.toml", "-dd", "show", "--format", "json", "--no-dedup",
        ]);

        assert_eq!(cli.debug, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.command {
            Some(Commands::Show {
                format,
                no_dedup,
                no_refresh,
                source,
            }) => {
                assert_eq!(format, OutputFormat::Json);
                assert!(no_dedup);
                assert!(!no_refresh);
                assert_eq!(source, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

//! timebar: command-line companion for the menu-bar timer.

mod app;
mod commands;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "timebar", version, about = "Menu-bar timer companion")]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the elapsed time of the running timer
    Status,
    /// List the time entries of a day
    Entries {
        /// Day to list (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run the poller in the foreground, printing every status update
    Watch {
        /// Print raw status messages as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Store an API token and notify a running tray
    SignIn {
        /// API token
        #[arg(long)]
        token: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("TIMEBAR_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Status => commands::status::run().await,
        Command::Entries { date } => commands::entries::run(date).await,
        Command::Watch { json } => commands::watch::run(json).await,
        Command::SignIn { token } => commands::sign_in::run(token).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["timebar"]).is_err());
    }

    #[test]
    fn cli_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["timebar", "status", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn cli_entries_date() {
        let cli = Cli::try_parse_from(["timebar", "entries", "--date", "2024-03-01"]).unwrap();
        match cli.command {
            Command::Entries { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
            }
            _ => panic!("expected Entries command"),
        }
    }

    #[test]
    fn cli_entries_rejects_bad_date() {
        assert!(Cli::try_parse_from(["timebar", "entries", "--date", "yesterday"]).is_err());
    }

    #[test]
    fn cli_sign_in_requires_token() {
        assert!(Cli::try_parse_from(["timebar", "sign-in"]).is_err());
        let cli = Cli::try_parse_from(["timebar", "sign-in", "--token", "abc"]).unwrap();
        match cli.command {
            Command::SignIn { token } => assert_eq!(token, "abc"),
            _ => panic!("expected SignIn command"),
        }
    }
}

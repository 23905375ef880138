#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("TIMEBAR_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Handle --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("timebar-desktop - Menu-bar timer");
        println!();
        println!("USAGE:");
        println!("    timebar-desktop [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("        --poller    Run the background poller instead of the tray");
        println!("    -v              Increase log verbosity (repeatable)");
        println!("    -h, --help      Print this help message");
        println!();
        println!("Set TIMEBAR_LOG to override the log filter.");
        return;
    }

    let verbose = args
        .iter()
        .skip(1)
        .filter(|a| a.starts_with('-') && !a.starts_with("--") && a.chars().skip(1).all(|c| c == 'v'))
        .map(|a| a.len() as u8 - 1)
        .sum();
    init_tracing(verbose);

    // Poller role: spawned by the tray process, talks to it over the status socket
    if args.iter().any(|a| a == "--poller") {
        if let Err(e) = timebar_desktop::poller::run_poller_role() {
            tracing::error!("poller failed: {e:#}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = timebar_desktop::run() {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

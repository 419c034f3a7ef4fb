//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Rendering the forecast screen as text

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cmd.verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cmd.run().await
}

fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,forecast_core=info",
        2 => "debug,hyper=info,reqwest=info",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_log_level() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert!(log_filter_from_verbosity(2).starts_with("debug"));
        assert_eq!(log_filter_from_verbosity(9), "trace");
    }

    #[test]
    fn cli_parses_show_with_city() {
        let cli = cli::Cli::try_parse_from(["forecast", "-v", "show", "--city", "Tokyo"]).unwrap();

        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, cli::Command::Show { city: Some(ref c) } if c == "Tokyo"));
    }
}

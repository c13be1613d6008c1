//! Command dispatch logic for prstats

use super::{InitArgs, StatsArgs, init_repos, process_stats};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "prstats", author, version, long_about = None)]
#[command(about = "Summarize pull-request activity over time")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: PrstatsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PrstatsSubcommand {
    /// Aggregate pull-request statistics and report them
    Stats(Box<StatsArgs>),
    /// Generate a default repository list file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        PrstatsSubcommand::Stats(stats_args) => process_stats(host, stats_args).await,
        PrstatsSubcommand::Init(init_args) => init_repos(host, init_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use camino::Utf8PathBuf;

    #[test]
    fn test_cli_parses_stats_subcommand() {
        let cli = Cli::try_parse_from(["prstats", "stats", "--quarterly", "--lines"]).unwrap();
        let PrstatsSubcommand::Stats(stats_args) = cli.command else {
            panic!("expected the stats subcommand");
        };
        assert!(stats_args.quarterly);
        assert!(stats_args.lines);
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["prstats", "frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn test_run_init() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("repos.yaml")).unwrap();

        let mut host = TestHost::new();
        run(&mut host, ["prstats", "init", path.as_str()]).await.unwrap();
        assert!(path.as_std_path().exists());
    }
}

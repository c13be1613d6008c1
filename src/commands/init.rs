use super::Host;
use crate::Result;
use crate::config::RepoConfig;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output repository list path
    #[arg(value_name = "PATH", default_value = "repos.yaml")]
    pub output: Utf8PathBuf,
}

pub fn init_repos<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    RepoConfig::save_default(&args.output)?;
    let _ = writeln!(host.output(), "Generated default repository list: {}", args.output);
    Ok(())
}

//! A tool to aggregate pull-request activity into time-bucketed statistics.

use prstats::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that talks to the real OS.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}

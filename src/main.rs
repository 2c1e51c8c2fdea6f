//! External test driver CLI
//!
//! Runs an external project's test suite against a given Solidity compiler
//! binary, across the configuration presets selected by the test definition
//! file.

use std::path::PathBuf;

use clap::Parser;

use exttest::common::logging;
use exttest::orchestrator::{self, ExecOptions};
use exttest::runner::CommandRunner;
use exttest::{BinaryType, TestConfig};

#[derive(Parser)]
#[command(name = "ext-test", about = "Run an external project's test suite against a solc binary")]
#[command(version, long_about = None)]
struct Cli {
    /// Solidity compiler binary type
    #[arg(value_enum)]
    solc_binary_type: BinaryType,

    /// Path to solc or soljson.js binary
    solc_binary_path: PathBuf,

    /// Test definition file
    #[arg(long, default_value = "exttest.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();
    let opts = ExecOptions {
        compile_only: std::env::var("COMPILE_ONLY").is_ok_and(|v| v == "1"),
    };

    if let Err(e) = run(cli, opts).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, opts: ExecOptions) -> exttest::Result<()> {
    let config = TestConfig::load(&cli.config, cli.solc_binary_type, cli.solc_binary_path)?;
    let mut runner = CommandRunner::new(
        config.commands.clone(),
        config.project.evm_version.clone(),
    );
    orchestrator::run_test(&config, &mut runner, opts).await
}

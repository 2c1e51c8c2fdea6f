//! Test-execution orchestration
//!
//! Drives one external-project test run end to end: compiler resolution,
//! project acquisition, environment preparation, and the per-preset
//! compile/test lifecycle. Presets execute strictly in sequence and every
//! external invocation blocks until completion.

use colored::Colorize;

use crate::common::Result;
use crate::config::TestConfig;
use crate::git::download_project;
use crate::nodeenv::prepare_node_env;
use crate::presets::Preset;
use crate::runner::TestRunner;
use crate::solc::setup_solc;

/// Per-run behavior switches, populated once at startup by the CLI layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Skip the test step for every preset (`COMPILE_ONLY=1`)
    pub compile_only: bool,
}

/// Execute one external-project test run.
///
/// The working directory is created fresh with a unique name and removed on
/// every exit path: success, test failure, or error.
pub async fn run_test(
    config: &TestConfig,
    runner: &mut dyn TestRunner,
    opts: ExecOptions,
) -> Result<()> {
    config.validate()?;

    println!(
        "{}\n===========================",
        format!("Testing {}...", config.name).bold()
    );

    // Dropping `workspace` removes the directory tree, whichever way this
    // function exits.
    let workspace = tempfile::Builder::new()
        .prefix(&format!("ext-test-{}-", config.name))
        .tempdir()?;
    let test_dir = workspace.path().join("ext");

    let presets = config.selected_presets();
    println!(
        "Selected settings presets: {}",
        presets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );

    // Configure the compiler under test
    let version = setup_solc(&config.solc, &test_dir).await?;
    println!("Using compiler version {}", version.full);

    // Download the project
    download_project(
        &test_dir,
        &config.project.repo_url,
        config.project.ref_type,
        &config.project.git_ref,
    )
    .await?;

    // Configure the run environment
    if config.project.build_dependency == "nodejs" {
        prepare_node_env(&test_dir)?;
    }
    runner.setup_environment(&test_dir).await?;

    run_presets(config, runner, &version.short, &presets, opts).await?;

    println!("{}", "Done.".green());
    Ok(())
}

/// Apply resolved settings once, then drive the compile/test lifecycle for
/// each selected preset in order.
///
/// No cleanup runs between presets: runners see cumulative filesystem state
/// within one run. Benchmark-report storage would slot in after each preset
/// but is not implemented.
pub async fn run_presets(
    config: &TestConfig,
    runner: &mut dyn TestRunner,
    solc_version: &str,
    presets: &[Preset],
    opts: ExecOptions,
) -> Result<()> {
    runner.compiler_settings(solc_version, presets).await?;

    for &preset in presets {
        println!("Running compile function...");
        runner.compile(solc_version, preset).await?;
        if opts.compile_only || config.is_compile_only(preset) {
            println!("Skipping test function...");
        } else {
            println!("Running test function...");
            runner.run_test(preset).await?;
        }
    }
    Ok(())
}

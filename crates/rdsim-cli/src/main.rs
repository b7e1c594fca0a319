//! rdsim - robot design sandbox
//!
//! Simulates the demo snake on a floor, drawn in the terminal or run headless.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use rdsim_physics::SimulationEngine;
use rdsim_render::{HeadlessRenderer, LoopStats, ManualClock, RenderLoop, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod scene;
mod terminal;

use config::SandboxConfig;
use scene::DemoScene;
use terminal::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "rdsim")]
#[command(about = "Interactive robot design sandbox", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// TOML file with [engine] and [render] settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run without a display, one physics step per frame
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, value_name = "N", default_value_t = 600)]
    frames: u64,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            // Help goes to stdout, parse errors (with usage) to stderr.
            let _ = e.print();
            return code;
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };

    let mut engine =
        SimulationEngine::new(config.engine.clone()).context("failed to create engine")?;
    let scene = DemoScene::new().context("failed to build demo scene")?;
    let handles = scene.populate(&mut engine)?;
    info!(
        links = scene.robot.link_count(),
        mass = scene.robot.total_mass(),
        "demo scene ready"
    );

    let stats = simulate(cli, &config, &mut engine)?;
    info!(
        frames = stats.iterations,
        steps = stats.steps,
        simulated = stats.simulated_time,
        "simulation finished"
    );

    let root = engine.get_link_transform(handles.robot, 0)?;
    let t = root.translation.vector;
    info!(x = t.x, y = t.y, z = t.z, "final root position");

    engine.remove_robot(handles.robot)?;
    engine.remove_prop(handles.floor)?;
    Ok(())
}

fn simulate(
    cli: &Cli,
    config: &SandboxConfig,
    engine: &mut SimulationEngine,
) -> Result<LoopStats> {
    let mut render_loop = RenderLoop::new(config.render.clone())?;
    let stats = if cli.headless {
        let mut renderer = HeadlessRenderer::new(cli.frames);
        let mut clock = ManualClock::new(f64::from(render_loop.config().fixed_dt));
        render_loop.run(engine, &mut renderer, &mut clock)?
    } else {
        // Dropped at the end of this block, restoring the terminal before
        // anything else is logged.
        let mut renderer = TerminalRenderer::new().context("failed to open terminal")?;
        render_loop.run(engine, &mut renderer, &mut SystemClock::new())?
    };
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["rdsim", "-v", "--headless", "--frames", "10"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.headless);
        assert_eq!(cli.frames, 10);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_help_and_bad_flags() {
        let help = Cli::try_parse_from(["rdsim", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        let bad = Cli::try_parse_from(["rdsim", "--frames", "many"]).unwrap_err();
        assert_eq!(bad.kind(), ErrorKind::ValueValidation);
        let unknown = Cli::try_parse_from(["rdsim", "--warp"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_headless_run() {
        let cli = Cli::try_parse_from(["rdsim", "--headless", "--frames", "30"]).unwrap();
        let config = SandboxConfig::default();
        let mut engine = SimulationEngine::new(config.engine.clone()).unwrap();
        let handles = DemoScene::new().unwrap().populate(&mut engine).unwrap();
        let start = engine.get_link_transform(handles.robot, 0).unwrap();

        let stats = simulate(&cli, &config, &mut engine).unwrap();
        assert_eq!(stats.iterations, 30);
        assert!(stats.steps >= 29);
        let end = engine.get_link_transform(handles.robot, 0).unwrap();
        assert!(end.translation.y < start.translation.y);
    }
}

//! Fixed-step accumulator loop.

use rdsim_physics::SimulationEngine;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::LoopConfig;
use crate::error::{RenderError, Result};
use crate::renderer::{draw_scene, Renderer};

/// Lifecycle of a [`RenderLoop`]. There is no way back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// `run` has not been called.
    NotStarted,
    /// Inside `run`.
    Running,
    /// `run` returned, normally or on failure.
    Stopped,
}

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    /// Loop iterations (frames presented).
    pub iterations: u64,
    /// Physics steps taken.
    pub steps: u64,
    /// Physics steps skipped because the catch-up cap was hit.
    pub dropped_steps: u64,
    /// Simulated seconds (`steps * fixed_dt`).
    pub simulated_time: f64,
}

/// Drives a [`SimulationEngine`] at a fixed physics rate and renders it at
/// whatever rate the renderer manages.
///
/// Elapsed wall time is accumulated and paid out in whole `fixed_dt` steps,
/// at most `max_catch_up_steps` per iteration. When the loop falls further
/// behind, the excess is dropped rather than taking larger steps.
#[derive(Debug)]
pub struct RenderLoop {
    config: LoopConfig,
    state: LoopState,
}

impl RenderLoop {
    /// Create a loop in the `NotStarted` state.
    pub fn new(config: LoopConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: LoopState::NotStarted,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Loop configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run until the renderer asks to close or a step or draw fails.
    ///
    /// Failures are not retried: the loop moves to `Stopped` and the error is
    /// returned.
    pub fn run<R, C>(
        &mut self,
        engine: &mut SimulationEngine,
        renderer: &mut R,
        clock: &mut C,
    ) -> Result<LoopStats>
    where
        R: Renderer + ?Sized,
        C: Clock + ?Sized,
    {
        if self.state != LoopState::NotStarted {
            return Err(RenderError::AlreadyStopped);
        }
        self.state = LoopState::Running;
        info!(fixed_dt = self.config.fixed_dt, "render loop started");

        let result = self.iterate(engine, renderer, clock);
        self.state = LoopState::Stopped;

        match &result {
            Ok(stats) => info!(
                iterations = stats.iterations,
                steps = stats.steps,
                dropped = stats.dropped_steps,
                "render loop stopped"
            ),
            Err(e) => error!(error = %e, "render loop stopped on failure"),
        }
        result
    }

    fn iterate<R, C>(
        &self,
        engine: &mut SimulationEngine,
        renderer: &mut R,
        clock: &mut C,
    ) -> Result<LoopStats>
    where
        R: Renderer + ?Sized,
        C: Clock + ?Sized,
    {
        let fixed_dt = f64::from(self.config.fixed_dt);
        let mut stats = LoopStats::default();
        let mut accumulator = 0.0f64;
        let mut previous = clock.now_seconds();

        loop {
            renderer.poll_events()?;
            if renderer.should_close() {
                break;
            }

            let now = clock.now_seconds();
            accumulator += (now - previous).clamp(0.0, self.config.max_frame_time);
            previous = now;

            let mut steps = 0;
            while accumulator >= fixed_dt && steps < self.config.max_catch_up_steps {
                engine.step(self.config.fixed_dt)?;
                accumulator -= fixed_dt;
                steps += 1;
            }
            if accumulator >= fixed_dt {
                let dropped = (accumulator / fixed_dt).floor();
                accumulator -= dropped * fixed_dt;
                stats.dropped_steps += dropped as u64;
                warn!(dropped, "physics behind real time, dropping steps");
            }
            stats.steps += u64::from(steps);

            draw_scene(engine, renderer)?;
            renderer.swap_buffers()?;
            stats.iterations += 1;
        }

        stats.simulated_time = stats.steps as f64 * fixed_dt;
        Ok(stats)
    }
}

#![warn(missing_docs)]

//! Real-time loop coupling rdsim physics to a renderer.
//!
//! [`RenderLoop`] steps a [`rdsim_physics::SimulationEngine`] with a fixed
//! time step taken from an accumulator of elapsed wall time, then draws every
//! live instance through a [`Renderer`]. Window, terminal or GPU details live
//! behind the `Renderer` trait; time comes from a [`Clock`].
//!
//! # Example
//!
//! ```ignore
//! use rdsim_render::{HeadlessRenderer, LoopConfig, RenderLoop, SystemClock};
//!
//! let mut render_loop = RenderLoop::new(LoopConfig::default())?;
//! let mut renderer = HeadlessRenderer::new(600);
//! let stats = render_loop.run(&mut engine, &mut renderer, &mut SystemClock::new())?;
//! println!("{} steps in {} frames", stats.steps, stats.iterations);
//! ```

mod clock;
mod config;
mod error;
mod render_loop;
mod renderer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LoopConfig;
pub use error::{RenderError, Result};
pub use render_loop::{LoopState, LoopStats, RenderLoop};
pub use renderer::{draw_scene, DrawCall, HeadlessRenderer, Renderer};

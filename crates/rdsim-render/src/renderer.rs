//! Renderer backends and scene submission.

use nalgebra::Isometry3;
use rdsim_model::Shape;
use rdsim_physics::{PhysicsError, SimulationEngine};

use crate::error::Result;

/// A drawing backend driven by [`crate::RenderLoop`].
///
/// Creating the window or graphics context is the implementor's constructor;
/// the loop only polls, draws and presents.
pub trait Renderer {
    /// Process pending window and input events.
    fn poll_events(&mut self) -> Result<()>;

    /// Whether the user asked to close the window.
    fn should_close(&self) -> bool;

    /// Queue one body for the current frame.
    ///
    /// `transform` is the body frame in world coordinates; see [`Shape`] for
    /// where each shape sits in that frame.
    fn draw_instance(&mut self, shape: &Shape, transform: &Isometry3<f32>) -> Result<()>;

    /// Present the current frame.
    fn swap_buffers(&mut self) -> Result<()>;
}

/// Submit every live robot link and prop to `renderer`.
///
/// Returns the number of draw calls issued.
pub fn draw_scene<R: Renderer + ?Sized>(
    engine: &SimulationEngine,
    renderer: &mut R,
) -> Result<usize> {
    let mut draws = 0;
    for robot in engine.robot_indices() {
        let model = engine.robot_model(robot)?;
        for link in 0..model.link_count() {
            let shape = model.link_shape(link).ok_or(PhysicsError::LinkOutOfRange {
                link,
                count: model.link_count(),
            })?;
            let transform = engine.get_link_transform(robot, link)?;
            renderer.draw_instance(&shape, &transform)?;
            draws += 1;
        }
    }
    for prop in engine.prop_indices() {
        let shape = engine.prop_model(prop)?.shape();
        let transform = engine.get_prop_transform(prop)?;
        renderer.draw_instance(&shape, &transform)?;
        draws += 1;
    }
    Ok(draws)
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Shape drawn.
    pub shape: Shape,
    /// World transform of the shape's frame.
    pub transform: Isometry3<f32>,
}

/// Windowless renderer that records frames.
///
/// Requests close once `max_frames` frames have been presented, which makes
/// it suitable for batch runs and tests.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    max_frames: u64,
    frames: u64,
    polls: u64,
    pending: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
}

impl HeadlessRenderer {
    /// Renderer that closes after `max_frames` presented frames.
    pub fn new(max_frames: u64) -> Self {
        Self {
            max_frames,
            frames: 0,
            polls: 0,
            pending: Vec::new(),
            last_frame: Vec::new(),
        }
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Times events were polled.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }
}

impl Renderer for HeadlessRenderer {
    fn poll_events(&mut self) -> Result<()> {
        self.polls += 1;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.frames >= self.max_frames
    }

    fn draw_instance(&mut self, shape: &Shape, transform: &Isometry3<f32>) -> Result<()> {
        self.pending.push(DrawCall {
            shape: *shape,
            transform: *transform,
        });
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames += 1;
        Ok(())
    }
}

//! Terminal renderer: a side view of the X/Y plane drawn with braille.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use nalgebra::{Isometry3, Point3};
use ratatui::backend::CrosstermBackend;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line, Rectangle};
use ratatui::widgets::{Block, Borders};
use ratatui::Terminal;
use rdsim_model::Shape;
use rdsim_render::{RenderError, Renderer};

/// Longest wait for input in one poll; also paces the frame rate.
const FRAME_WAIT: Duration = Duration::from_millis(16);

const X_BOUNDS: [f64; 2] = [-1.5, 3.5];
const Y_BOUNDS: [f64; 2] = [-0.5, 2.0];

/// A shape flattened onto the X/Y plane.
#[derive(Debug, Clone, PartialEq)]
enum Primitive {
    Segment { x1: f64, y1: f64, x2: f64, y2: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

fn project(shape: &Shape, transform: &Isometry3<f32>) -> Primitive {
    match *shape {
        Shape::Capsule { length, .. } => {
            let start = transform * Point3::origin();
            let end = transform * Point3::new(length, 0.0, 0.0);
            Primitive::Segment {
                x1: f64::from(start.x),
                y1: f64::from(start.y),
                x2: f64::from(end.x),
                y2: f64::from(end.y),
            }
        }
        Shape::Cuboid { half_extents } => {
            let (mut lo, mut hi) = ([f32::INFINITY; 2], [f32::NEG_INFINITY; 2]);
            for corner in 0..8 {
                let sign = |bit: usize| if corner & bit == 0 { -1.0 } else { 1.0 };
                let local = Point3::new(
                    sign(1) * half_extents.x,
                    sign(2) * half_extents.y,
                    sign(4) * half_extents.z,
                );
                let p = transform * local;
                lo = [lo[0].min(p.x), lo[1].min(p.y)];
                hi = [hi[0].max(p.x), hi[1].max(p.y)];
            }
            Primitive::Rect {
                x: f64::from(lo[0]),
                y: f64::from(lo[1]),
                width: f64::from(hi[0] - lo[0]),
                height: f64::from(hi[1] - lo[1]),
            }
        }
    }
}

fn is_close_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn backend_error(e: io::Error) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Full-screen terminal renderer.
///
/// Takes over the terminal (raw mode, alternate screen) on creation and
/// gives it back on drop.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pending: Vec<Primitive>,
    frames: u64,
    close_requested: bool,
}

impl TerminalRenderer {
    /// Enter the alternate screen.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            pending: Vec::new(),
            frames: 0,
            close_requested: false,
        })
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Renderer for TerminalRenderer {
    fn poll_events(&mut self) -> rdsim_render::Result<()> {
        let mut wait = FRAME_WAIT;
        while event::poll(wait).map_err(backend_error)? {
            if let Event::Key(key) = event::read().map_err(backend_error)? {
                if is_close_key(&key) {
                    self.close_requested = true;
                }
            }
            wait = Duration::ZERO;
        }
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn draw_instance(
        &mut self,
        shape: &Shape,
        transform: &Isometry3<f32>,
    ) -> rdsim_render::Result<()> {
        self.pending.push(project(shape, transform));
        Ok(())
    }

    fn swap_buffers(&mut self) -> rdsim_render::Result<()> {
        let primitives = std::mem::take(&mut self.pending);
        self.frames += 1;
        let title = format!(" rdsim | frame {} | q to quit ", self.frames);
        self.terminal
            .draw(|frame| {
                let canvas = Canvas::default()
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .marker(Marker::Braille)
                    .x_bounds(X_BOUNDS)
                    .y_bounds(Y_BOUNDS)
                    .paint(|ctx| {
                        for primitive in &primitives {
                            match *primitive {
                                Primitive::Segment { x1, y1, x2, y2 } => {
                                    ctx.draw(&Line::new(x1, y1, x2, y2, Color::Yellow));
                                }
                                Primitive::Rect {
                                    x,
                                    y,
                                    width,
                                    height,
                                } => ctx.draw(&Rectangle {
                                    x,
                                    y,
                                    width,
                                    height,
                                    color: Color::Gray,
                                }),
                            }
                        }
                    });
                frame.render_widget(canvas, frame.area());
            })
            .map_err(backend_error)?;
        Ok(())
    }
}

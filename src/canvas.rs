// The drawing surface: one stroke model and one persistent buffer behind a
// single lock, fed by pointer events from the UI thread and read by the
// render loop (or by the immediate redraw path).

use crate::buffer::PersistentBuffer;
use crate::compositor::FrameSnapshot;
use crate::config::RenderMode;
use crate::error::Error;
use crate::input::{Handled, PointerEvent};
use crate::render::{render_once, RenderLoop, DEFAULT_FRAME_INTERVAL, DEFAULT_JOIN_TIMEOUT};
use crate::stroke::{LiveStroke, StrokeModel};
use crate::surface::{lock, Surface};
use crate::types::{Color, StrokeStyle};
use image::{Rgb, RgbImage};
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything guarded by the canvas lock.
#[derive(Debug)]
pub(crate) struct CanvasState {
    stroke: StrokeModel,
    buffer: PersistentBuffer,
    style: StrokeStyle,
    size: (u32, u32), // last size reported by the platform
    detached: bool,   // torn down: the render side must not re-allocate
}

pub(crate) type SharedCanvas = Arc<Mutex<CanvasState>>;

impl CanvasState {
    pub(crate) fn new(initial_color: Color, style: StrokeStyle) -> Self {
        Self {
            stroke: StrokeModel::new(initial_color),
            buffer: PersistentBuffer::new(),
            style,
            size: (0, 0),
            detached: false,
        }
    }

    /// Allocate the buffer on first use, for the known surface size.
    fn ensure_buffer(&mut self, (w, h): (u32, u32)) {
        if !self.buffer.is_allocated() && w > 0 && h > 0 {
            self.buffer.ensure_size(w, h);
        }
    }

    /// Copy out what one frame needs. Called by the render side with the lock held.
    pub(crate) fn snapshot(&mut self, surface_size: (u32, u32)) -> FrameSnapshot {
        if !self.detached {
            let size = if self.size == (0, 0) { surface_size } else { self.size };
            self.ensure_buffer(size);
        }
        FrameSnapshot {
            buffer: self.buffer.share(),
            live: self.stroke.live(),
            style: self.style,
        }
    }
}

/// Knobs for one drawing surface; usually built from `AppConfig::canvas_options`.
#[derive(Clone, Debug)]
pub struct CanvasOptions {
    pub initial_color: Color,
    pub style: StrokeStyle,
    pub mode: RenderMode,
    pub immediate_feedback: bool,
    pub frame_interval: Duration,
    pub join_timeout: Duration,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            initial_color: Rgb([255, 0, 0]),
            style: StrokeStyle::default(),
            mode: RenderMode::Continuous,
            immediate_feedback: false,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

pub struct DrawingSurface {
    canvas: SharedCanvas,
    options: CanvasOptions,
    render_loop: Option<RenderLoop>,
    redraw_target: Option<Box<dyn Surface>>, // for redraws outside the loop's cadence
}

impl DrawingSurface {
    pub fn new(options: CanvasOptions) -> Self {
        let state = CanvasState::new(options.initial_color, options.style);
        Self {
            canvas: Arc::new(Mutex::new(state)),
            options,
            render_loop: None,
            redraw_target: None,
        }
    }

    /* ------------------------------ palette / clear ----------------------------- */

    pub fn set_color(&mut self, color: Color) {
        lock(&self.canvas).stroke.set_color(color);
        if self.options.mode == RenderMode::OnDemand {
            self.redraw_now();
        }
    }

    /// Drop the stroke in progress and wipe the persistent buffer.
    pub fn clear(&mut self) {
        {
            let mut state = lock(&self.canvas);
            state.stroke.clear();
            state.buffer.clear();
        }
        debug!("canvas cleared");
        if self.options.mode == RenderMode::OnDemand {
            self.redraw_now();
        }
    }

    /* ---------------------------------- input ---------------------------------- */

    pub fn on_pointer(&mut self, event: PointerEvent) -> Handled {
        let claims_gesture = matches!(event, PointerEvent::Down(_));
        {
            let mut state = lock(&self.canvas);
            match event {
                PointerEvent::Down(p) => {
                    let size = state.size;
                    state.ensure_buffer(size);
                    state.stroke.on_down(p);
                }
                PointerEvent::Move(p) => state.stroke.on_move(p),
                PointerEvent::Up(p) | PointerEvent::Cancel(p) => {
                    // commit while still holding the lock: no frame sees the
                    // stroke gone from the live path but not yet in the buffer
                    if let Some(commit) = state.stroke.on_up_or_cancel(p) {
                        let style = state.style;
                        state.buffer.commit_stroke(&commit, style);
                    }
                }
            }
        }

        if self.options.mode == RenderMode::OnDemand || self.options.immediate_feedback {
            self.redraw_now();
        }
        Handled { claims_gesture }
    }

    /* -------------------------------- lifecycle -------------------------------- */

    /// The platform surface is ready. Starts the render loop in continuous mode.
    pub fn surface_created<S>(&mut self, surface: S, width: u32, height: u32) -> Result<(), Error>
    where
        S: Surface + Clone + 'static,
    {
        info!("surface created {width}x{height} ({:?})", self.options.mode);
        {
            let mut state = lock(&self.canvas);
            state.detached = false;
            if width > 0 && height > 0 {
                state.size = (width, height);
                state.buffer.ensure_size(width, height);
            }
        }

        self.stop_render_loop();
        if self.options.mode == RenderMode::OnDemand || self.options.immediate_feedback {
            self.redraw_target = Some(Box::new(surface.clone()));
        }
        match self.options.mode {
            RenderMode::Continuous => {
                let render_loop = RenderLoop::spawn(
                    Arc::clone(&self.canvas),
                    Box::new(surface),
                    self.options.frame_interval,
                )?;
                self.render_loop = Some(render_loop);
            }
            RenderMode::OnDemand => {
                self.redraw_now();
            }
        }
        Ok(())
    }

    /// New surface size. Non-positive sizes are ignored; a real change
    /// starts over with a blank buffer.
    pub fn surface_changed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        {
            let mut state = lock(&self.canvas);
            state.size = (width, height);
            if state.buffer.ensure_size(width, height) {
                info!("surface resized to {width}x{height}, drawing reset");
            }
        }
        if self.options.mode == RenderMode::OnDemand {
            self.redraw_now();
        }
    }

    /// The platform surface is going away: stop drawing into it.
    pub fn surface_destroyed(&mut self) {
        self.stop_render_loop();
        self.redraw_target = None;
        info!("surface destroyed");
    }

    /// Teardown: release the buffer and forget the stroke. Safe while a render
    /// tick is still in flight; it just draws background.
    pub fn detach(&mut self) {
        let mut state = lock(&self.canvas);
        state.buffer.release();
        state.stroke.clear();
        state.detached = true;
    }

    fn stop_render_loop(&mut self) {
        if let Some(mut render_loop) = self.render_loop.take() {
            render_loop.stop(self.options.join_timeout);
        }
    }

    /* --------------------------------- drawing --------------------------------- */

    /// Compose and present one frame right now, outside the loop's cadence.
    /// Returns false when there is no target or the surface refused the frame.
    pub fn redraw_now(&mut self) -> bool {
        match self.redraw_target.as_mut() {
            Some(target) => render_once(&self.canvas, target.as_mut()),
            None => false,
        }
    }

    /* -------------------------------- inspection ------------------------------- */

    pub fn is_rendering(&self) -> bool {
        self.render_loop.as_ref().is_some_and(RenderLoop::is_running)
    }

    /// Frames presented by the render loop (0 when none is running).
    pub fn frames_presented(&self) -> usize {
        self.render_loop.as_ref().map_or(0, RenderLoop::frames_presented)
    }

    pub fn current_color(&self) -> Color {
        lock(&self.canvas).stroke.current_color()
    }

    pub fn is_stroke_active(&self) -> bool {
        lock(&self.canvas).stroke.is_active()
    }

    pub fn live_stroke(&self) -> LiveStroke {
        lock(&self.canvas).stroke.live()
    }

    /// Copy of the persistent buffer, if one is allocated.
    pub fn snapshot_buffer(&self) -> Option<RgbImage> {
        lock(&self.canvas).buffer.image().cloned()
    }
}

impl Drop for DrawingSurface {
    fn drop(&mut self) {
        self.stop_render_loop();
    }
}

// Fixed-cadence render loop: a calloop timer on its own thread.
// Each tick: check the surface, grab a frame, snapshot the canvas under the
// lock, compose outside it, present, then wait one interval. Surface trouble
// only skips a tick; the loop keeps going until its `running` flag drops.

use crate::canvas::SharedCanvas;
use crate::compositor::compose;
use crate::error::Error;
use crate::surface::{lock, Surface};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16); // ~60 Hz
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Draw one frame onto `surface`. Returns true when it reached the screen.
/// Shared by the render loop and the out-of-band redraw path.
pub(crate) fn render_once(canvas: &SharedCanvas, surface: &mut dyn Surface) -> bool {
    if !surface.is_valid() {
        return false;
    }

    let mut frame = match surface.acquire() {
        Ok(frame) => frame,
        Err(e) => {
            debug!("skipping frame: {e}");
            return false;
        }
    };

    // Only the snapshot happens under the lock.
    let snapshot = lock(canvas).snapshot(surface.size());
    compose(&mut frame, &snapshot);

    match surface.present(frame) {
        Ok(()) => true,
        Err(e) => {
            debug!("frame dropped: {e}");
            false
        }
    }
}

/// Handle to the running render thread.
pub struct RenderLoop {
    running: Arc<AtomicBool>,
    frames: Arc<AtomicUsize>,
    signal: LoopSignal,
    handle: Option<JoinHandle<()>>,
}

impl RenderLoop {
    /// Start ticking every `interval` until `stop` is called.
    pub(crate) fn spawn(
        canvas: SharedCanvas,
        mut surface: Box<dyn Surface>,
        interval: Duration,
    ) -> Result<Self, Error> {
        let running = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicUsize::new(0));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<LoopSignal, Error>>();

        let tick_running = Arc::clone(&running);
        let tick_frames = Arc::clone(&frames);
        let handle = thread::Builder::new()
            .name("fingerpaint-render".into())
            .spawn(move || {
                // The event loop is not Send, so it is built on the thread that runs it.
                let mut event_loop: EventLoop<()> = match EventLoop::try_new() {
                    Ok(event_loop) => event_loop,
                    Err(e) => {
                        let _ = ready_tx.send(Err(Error::RenderLoop(format!("event loop: {e}"))));
                        return;
                    }
                };
                let signal = event_loop.get_signal();
                let tick_signal = signal.clone();

                let inserted = event_loop.handle().insert_source(
                    Timer::immediate(),
                    move |_deadline: Instant, _: &mut (), _: &mut ()| {
                        if !tick_running.load(Ordering::Acquire) {
                            tick_signal.stop();
                            return TimeoutAction::Drop;
                        }
                        if render_once(&canvas, surface.as_mut()) {
                            tick_frames.fetch_add(1, Ordering::AcqRel);
                        }
                        // measured from the end of this tick, however long it took
                        TimeoutAction::ToDuration(interval)
                    },
                );
                if let Err(e) = inserted {
                    let _ = ready_tx.send(Err(Error::RenderLoop(format!("timer: {e}"))));
                    return;
                }

                let _ = ready_tx.send(Ok(signal));
                if let Err(e) = event_loop.run(None::<Duration>, &mut (), |_| {}) {
                    error!("render loop failed: {e}");
                }
            })
            .map_err(|e| Error::RenderLoop(format!("spawn: {e}")))?;

        let signal = ready_rx
            .recv()
            .map_err(|_| Error::RenderLoop("render thread exited during startup".into()))??;

        info!("render loop started ({} ms interval)", interval.as_millis());
        Ok(Self {
            running,
            frames,
            signal,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Frames that made it to the surface so far.
    pub fn frames_presented(&self) -> usize {
        self.frames.load(Ordering::Acquire)
    }

    /// Ask the loop to finish and wait up to `timeout` for the thread.
    /// Returns false if the thread was still busy at the deadline; it is
    /// then left to finish on its own.
    pub fn stop(&mut self, timeout: Duration) -> bool {
        self.request_stop();
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("render thread still running after {} ms, detaching", timeout.as_millis());
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        if handle.join().is_err() {
            warn!("render thread panicked");
        }
        info!("render loop stopped after {} frames", self.frames_presented());
        true
    }

    fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
        self.signal.stop();
        self.signal.wakeup();
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.request_stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasState;
    use crate::surface::HeadlessSurface;
    use crate::types::{FrameBuffer, StrokeStyle};
    use image::Rgb;
    use std::sync::Mutex;

    const TICK: Duration = Duration::from_millis(2);

    fn canvas() -> SharedCanvas {
        Arc::new(Mutex::new(CanvasState::new(Rgb([255, 0, 0]), StrokeStyle::default())))
    }

    /// Poll `cond` for up to two seconds.
    fn eventually(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    #[test]
    fn presents_frames_until_stopped() {
        let surface = HeadlessSurface::new(8, 8);
        let mut render_loop =
            RenderLoop::spawn(canvas(), Box::new(surface.clone()), TICK).expect("spawn");
        assert!(render_loop.is_running());
        assert!(eventually(|| surface.presented_count() >= 3));

        assert!(render_loop.stop(DEFAULT_JOIN_TIMEOUT));
        assert!(!render_loop.is_running());
        let presented = surface.presented_count();
        assert!(render_loop.frames_presented() <= presented);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(surface.presented_count(), presented);
    }

    #[test]
    fn invalid_surface_skips_ticks_without_stopping() {
        let surface = HeadlessSurface::new(8, 8);
        surface.set_valid(false);
        let mut render_loop =
            RenderLoop::spawn(canvas(), Box::new(surface.clone()), TICK).expect("spawn");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(surface.presented_count(), 0);
        assert_eq!(surface.acquire_attempts(), 0);

        surface.set_valid(true);
        assert!(eventually(|| surface.presented_count() > 0));
        assert!(render_loop.stop(DEFAULT_JOIN_TIMEOUT));
    }

    #[test]
    fn acquire_and_present_failures_are_soft() {
        let surface = HeadlessSurface::new(8, 8);
        surface.fail_next_acquires(3);
        surface.fail_next_presents(2);
        let mut render_loop =
            RenderLoop::spawn(canvas(), Box::new(surface.clone()), TICK).expect("spawn");
        assert!(eventually(|| surface.presented_count() >= 2));
        assert!(surface.acquire_attempts() >= 3 + 2 + 2);
        assert!(render_loop.is_running());
        assert!(render_loop.stop(DEFAULT_JOIN_TIMEOUT));
    }

    #[test]
    fn dropping_the_handle_stops_the_thread() {
        let surface = HeadlessSurface::new(4, 4);
        let render_loop =
            RenderLoop::spawn(canvas(), Box::new(surface.clone()), TICK).expect("spawn");
        assert!(eventually(|| surface.presented_count() > 0));
        drop(render_loop);

        thread::sleep(Duration::from_millis(30));
        let settled = surface.presented_count();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(surface.presented_count(), settled);
    }

    /// A surface whose `acquire` hangs, like a display that stopped vsyncing.
    #[derive(Clone)]
    struct StallingSurface {
        stall: Duration,
        entered: Arc<AtomicBool>,
    }

    impl Surface for StallingSurface {
        fn is_valid(&self) -> bool {
            true
        }

        fn size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn acquire(&mut self) -> Result<FrameBuffer, Error> {
            self.entered.store(true, Ordering::Release);
            thread::sleep(self.stall);
            Ok(FrameBuffer::new(4, 4))
        }

        fn present(&mut self, _frame: FrameBuffer) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn stop_gives_up_on_a_stuck_thread_after_the_timeout() {
        let canvas = canvas();
        let surface = StallingSurface {
            stall: Duration::from_millis(400),
            entered: Arc::new(AtomicBool::new(false)),
        };
        let entered = Arc::clone(&surface.entered);
        let mut render_loop =
            RenderLoop::spawn(Arc::clone(&canvas), Box::new(surface), Duration::from_millis(1))
                .expect("spawn");
        assert!(eventually(|| entered.load(Ordering::Acquire)));

        let started = Instant::now();
        assert!(!render_loop.stop(Duration::from_millis(50)));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(50));
        assert!(waited < Duration::from_millis(300), "stop blocked for {waited:?}");
        assert!(!render_loop.is_running());

        // the stuck tick does not hold the canvas lock while it waits
        let snapshot = lock(&canvas).snapshot((4, 4));
        assert!(snapshot.live.is_empty());
    }

    #[test]
    fn render_once_lazily_allocates_for_the_surface_size() {
        let canvas = canvas();
        let mut surface = HeadlessSurface::new(6, 5);
        assert!(render_once(&canvas, &mut surface));
        let snapshot = lock(&canvas).snapshot((0, 0));
        assert_eq!(snapshot.buffer.map(|b| b.dimensions()), Some((6, 5)));
    }
}

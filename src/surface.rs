// The display surface seen from the core: "is it usable", "give me a frame to
// draw into", "show this frame". Two implementations live here:
// - FrameMailbox: the render thread drops finished frames in a slot and the
//   window (UI thread) picks the newest one up and shows it.
// - HeadlessSurface: keeps presented frames in memory; no window at all.

use crate::error::Error;
use crate::types::FrameBuffer;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock that shrugs off poisoning: everything we guard is plain data.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub trait Surface: Send {
    /// False while the platform has no usable surface (not yet created, torn down, minimized...).
    fn is_valid(&self) -> bool;

    /// Current surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Hand out a frame target sized to the surface. May fail transiently.
    fn acquire(&mut self) -> Result<FrameBuffer, Error>;

    /// Show a frame previously obtained from `acquire`. May fail transiently.
    fn present(&mut self, frame: FrameBuffer) -> Result<(), Error>;
}

/* ------------------------------- FrameMailbox ------------------------------- */

#[derive(Debug, Default)]
struct MailboxInner {
    valid: AtomicBool,
    size: Mutex<(u32, u32)>,
    latest: Mutex<Option<FrameBuffer>>, // newest presented frame, not yet shown
    spare: Mutex<Option<FrameBuffer>>,  // a shown frame handed back for reuse
    presented: AtomicUsize,
}

/// Single-slot hand-off between the render thread and the window.
/// Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct FrameMailbox {
    inner: Arc<MailboxInner>,
}

impl FrameMailbox {
    pub fn new(width: u32, height: u32) -> Self {
        let mailbox = Self::default();
        mailbox.set_size(width, height);
        mailbox.set_valid(true);
        mailbox
    }

    /// Window side: the surface changed size. Frames of the old size are dropped.
    pub fn set_size(&self, width: u32, height: u32) {
        let mut size = lock(&self.inner.size);
        if *size != (width, height) {
            lock(&self.inner.latest).take();
        }
        *size = (width, height);
    }

    /// Window side: surface came up or went away.
    pub fn set_valid(&self, valid: bool) {
        self.inner.valid.store(valid, Ordering::Release);
        if !valid {
            lock(&self.inner.latest).take();
        }
    }

    /// Window side: newest frame, if one arrived since the last call.
    pub fn take_frame(&self) -> Option<FrameBuffer> {
        lock(&self.inner.latest).take()
    }

    /// Window side: give a shown frame back so the next `acquire` can reuse it.
    pub fn recycle(&self, frame: FrameBuffer) {
        *lock(&self.inner.spare) = Some(frame);
    }

    pub fn presented_count(&self) -> usize {
        self.inner.presented.load(Ordering::Acquire)
    }
}

impl Surface for FrameMailbox {
    fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    fn size(&self) -> (u32, u32) {
        *lock(&self.inner.size)
    }

    fn acquire(&mut self) -> Result<FrameBuffer, Error> {
        if !self.is_valid() {
            return Err(Error::SurfaceUnavailable("mailbox closed".into()));
        }
        let (w, h) = self.size();
        if w == 0 || h == 0 {
            return Err(Error::SurfaceUnavailable("zero-sized surface".into()));
        }
        let (w, h) = (w as usize, h as usize);

        match lock(&self.inner.spare).take() {
            Some(frame) if frame.width == w && frame.height == h => Ok(frame),
            _ => Ok(FrameBuffer::new(w, h)),
        }
    }

    fn present(&mut self, frame: FrameBuffer) -> Result<(), Error> {
        if !self.is_valid() {
            return Err(Error::SurfaceUnavailable("mailbox closed".into()));
        }
        let (w, h) = self.size();
        if frame.width != w as usize || frame.height != h as usize {
            // resized between acquire and present; the next tick redraws at the new size
            return Err(Error::SurfaceUnavailable("stale frame size".into()));
        }
        *lock(&self.inner.latest) = Some(frame);
        self.inner.presented.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/* ------------------------------ HeadlessSurface ----------------------------- */

#[derive(Debug, Default)]
struct HeadlessInner {
    valid: AtomicBool,
    size: Mutex<(u32, u32)>,
    fail_acquires: AtomicUsize,
    fail_presents: AtomicUsize,
    acquire_attempts: AtomicUsize,
    presented: AtomicUsize,
    last: Mutex<Option<FrameBuffer>>,
}

/// In-memory surface: remembers the last presented frame and can be told to
/// misbehave (invalid, failing acquire/present) to exercise the soft-failure paths.
#[derive(Clone, Debug, Default)]
pub struct HeadlessSurface {
    inner: Arc<HeadlessInner>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let surface = Self::default();
        surface.set_size(width, height);
        surface.set_valid(true);
        surface
    }

    pub fn set_size(&self, width: u32, height: u32) {
        *lock(&self.inner.size) = (width, height);
    }

    pub fn set_valid(&self, valid: bool) {
        self.inner.valid.store(valid, Ordering::Release);
    }

    /// The next `n` calls to `acquire` fail.
    pub fn fail_next_acquires(&self, n: usize) {
        self.inner.fail_acquires.store(n, Ordering::Release);
    }

    /// The next `n` calls to `present` fail.
    pub fn fail_next_presents(&self, n: usize) {
        self.inner.fail_presents.store(n, Ordering::Release);
    }

    pub fn acquire_attempts(&self) -> usize {
        self.inner.acquire_attempts.load(Ordering::Acquire)
    }

    pub fn presented_count(&self) -> usize {
        self.inner.presented.load(Ordering::Acquire)
    }

    pub fn last_frame(&self) -> Option<FrameBuffer> {
        lock(&self.inner.last).clone()
    }
}

/// Decrement a failure budget; true if this call should fail.
fn take_failure(budget: &AtomicUsize) -> bool {
    budget
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .is_ok()
}

impl Surface for HeadlessSurface {
    fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    fn size(&self) -> (u32, u32) {
        *lock(&self.inner.size)
    }

    fn acquire(&mut self) -> Result<FrameBuffer, Error> {
        self.inner.acquire_attempts.fetch_add(1, Ordering::AcqRel);
        if take_failure(&self.inner.fail_acquires) {
            return Err(Error::SurfaceUnavailable("acquire refused".into()));
        }
        let (w, h) = self.size();
        Ok(FrameBuffer::new(w.max(1) as usize, h.max(1) as usize))
    }

    fn present(&mut self, frame: FrameBuffer) -> Result<(), Error> {
        if take_failure(&self.inner.fail_presents) {
            return Err(Error::SurfaceUnavailable("present refused".into()));
        }
        *lock(&self.inner.last) = Some(frame);
        self.inner.presented.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

// The off-screen canvas that keeps every committed stroke until clear/resize.
// Visual: this is the "paper"; the live stroke is only drawn on top of it per frame.
//
// The pixels sit behind an Arc so a frame snapshot is just a refcount bump;
// committing while a frame still holds the old pixels copies them first.

use crate::draw::{fill_circle, stroke_polyline, PixelTarget};
use crate::stroke::StrokeCommit;
use crate::types::{StrokeStyle, BACKGROUND};
use image::RgbImage;
use log::debug;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PersistentBuffer {
    image: Option<Arc<RgbImage>>,
    #[cfg(test)]
    allocation_count: usize,
}

impl PersistentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a buffer of exactly `width x height` (at least 1x1) exists.
    /// A size change throws the old drawing away. Returns true if it allocated.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> bool {
        let (w, h) = (width.max(1), height.max(1));
        if let Some(img) = &self.image {
            if img.dimensions() == (w, h) {
                return false;
            }
        }

        debug!("allocating persistent buffer {w}x{h}");
        self.image = Some(Arc::new(RgbImage::from_pixel(w, h, BACKGROUND)));
        #[cfg(test)]
        {
            self.allocation_count += 1;
        }
        true
    }

    /// Bake a finished stroke in: the line, then a marker at each end.
    /// Visual: a tap with no movement still leaves a visible dot.
    pub fn commit_stroke(&mut self, commit: &StrokeCommit, style: StrokeStyle) {
        let Some(img) = self.image.as_mut().map(Arc::make_mut) else {
            return;
        };
        stroke_polyline(img, &commit.path, style.width, commit.color);
        fill_circle(img, commit.start, style.marker_radius, commit.color);
        fill_circle(img, commit.end, style.marker_radius, commit.color);
    }

    /// Back to blank paper; the allocation is kept.
    pub fn clear(&mut self) {
        if let Some(img) = self.image.as_mut().map(Arc::make_mut) {
            PixelTarget::fill(img, BACKGROUND);
        }
    }

    /// Drop the pixels (surface teardown). Everything after this is a no-op
    /// until the next `ensure_size`.
    pub fn release(&mut self) {
        self.image = None;
    }

    pub fn is_allocated(&self) -> bool {
        self.image.is_some()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| img.dimensions())
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_deref()
    }

    /// Cheap handle to the current pixels for a frame snapshot.
    pub fn share(&self) -> Option<Arc<RgbImage>> {
        self.image.clone()
    }

    #[cfg(test)]
    pub fn allocation_count(&self) -> usize {
        self.allocation_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Point};
    use image::Rgb;
    use pretty_assertions::assert_eq;

    const RED: Color = Rgb([255, 0, 0]);

    fn commit(path: &[(f32, f32)], color: Color) -> StrokeCommit {
        let path: Vec<Point> = path.iter().map(|&(x, y)| Point::new(x, y)).collect();
        StrokeCommit {
            start: path[0],
            end: path[path.len() - 1],
            path,
            color,
        }
    }

    fn all_background(buf: &PersistentBuffer) -> bool {
        buf.image().is_some_and(|img| img.pixels().all(|px| *px == BACKGROUND))
    }

    #[test]
    fn same_size_is_idempotent() {
        let mut buf = PersistentBuffer::new();
        assert!(buf.ensure_size(32, 24));
        buf.commit_stroke(&commit(&[(4.0, 4.0), (20.0, 4.0)], RED), StrokeStyle::default());
        let before = buf.image().cloned();

        assert!(!buf.ensure_size(32, 24));
        assert_eq!(buf.allocation_count(), 1);
        assert_eq!(buf.image().cloned(), before);
    }

    #[test]
    fn resize_discards_drawing() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(32, 24);
        buf.commit_stroke(&commit(&[(4.0, 4.0), (20.0, 4.0)], RED), StrokeStyle::default());
        assert!(buf.ensure_size(40, 24));
        assert_eq!(buf.size(), Some((40, 24)));
        assert!(all_background(&buf));
    }

    #[test]
    fn zero_size_clamps_to_one_pixel() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(0, 0);
        assert_eq!(buf.size(), Some((1, 1)));
        assert!(!buf.ensure_size(0, 1));
    }

    #[test]
    fn clear_keeps_allocation() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(16, 16);
        buf.commit_stroke(&commit(&[(8.0, 8.0), (8.0, 8.0)], RED), StrokeStyle::default());
        assert!(!all_background(&buf));

        buf.clear();
        assert!(all_background(&buf));
        assert_eq!(buf.allocation_count(), 1);
    }

    #[test]
    fn markers_are_drawn_at_both_ends() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(100, 100);
        let style = StrokeStyle { width: 1.0, marker_radius: 6.0 };
        buf.commit_stroke(&commit(&[(20.0, 50.0), (80.0, 50.0)], RED), style);

        let img = buf.image().expect("allocated");
        // 4px off the line, inside the markers only
        assert_eq!(*img.get_pixel(20, 54), RED);
        assert_eq!(*img.get_pixel(80, 46), RED);
        assert_eq!(*img.get_pixel(50, 54), BACKGROUND);
    }

    #[test]
    fn shared_snapshot_is_not_changed_by_later_commits() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(16, 16);
        let snapshot = buf.share().expect("allocated");
        buf.commit_stroke(&commit(&[(8.0, 8.0), (8.0, 8.0)], RED), StrokeStyle::default());

        assert!(snapshot.pixels().all(|px| *px == BACKGROUND));
        assert_eq!(*buf.image().expect("allocated").get_pixel(8, 8), RED);
    }

    #[test]
    fn released_buffer_ignores_everything() {
        let mut buf = PersistentBuffer::new();
        buf.ensure_size(8, 8);
        buf.release();
        buf.commit_stroke(&commit(&[(1.0, 1.0), (2.0, 2.0)], RED), StrokeStyle::default());
        buf.clear();
        assert!(!buf.is_allocated());
        assert_eq!(buf.size(), None);
    }
}

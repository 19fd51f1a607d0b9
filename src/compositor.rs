// Builds one frame: paper, then everything inked so far, then the stroke in progress.

use crate::draw::{blit, stroke_polyline, PixelTarget};
use crate::stroke::LiveStroke;
use crate::types::{FrameBuffer, StrokeStyle, BACKGROUND};
use image::RgbImage;
use std::sync::Arc;

/// Everything the compositor reads, copied out under the canvas lock.
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    pub buffer: Option<Arc<RgbImage>>,
    pub live: LiveStroke,
    pub style: StrokeStyle,
}

/// Pure composition into `frame`; nothing shared is touched.
pub fn compose(frame: &mut FrameBuffer, snapshot: &FrameSnapshot) {
    /* 1) Background.
       Visual: blank white where nothing has been drawn. */
    frame.fill(BACKGROUND);

    /* 2) Persistent ink at the origin. */
    if let Some(buffer) = &snapshot.buffer {
        blit(frame, buffer);
    }

    /* 3) Live stroke on top.
       Visual: the line follows your finger before it becomes permanent. */
    if snapshot.live.is_empty() {
        return;
    }
    if let Some(color) = snapshot.live.color {
        stroke_polyline(frame, &snapshot.live.path, snapshot.style.width, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::count_color;
    use crate::types::{Color, Point};
    use image::Rgb;
    use pretty_assertions::assert_eq;

    const RED: Color = Rgb([255, 0, 0]);
    const BLUE: Color = Rgb([0, 0, 255]);

    #[test]
    fn empty_snapshot_is_plain_background() {
        let mut frame = FrameBuffer { width: 4, height: 4, pixels: vec![0; 16] };
        compose(&mut frame, &FrameSnapshot::default());
        assert_eq!(count_color(&frame, BACKGROUND), 16);
    }

    #[test]
    fn live_stroke_is_drawn_over_buffer() {
        let mut buffer = RgbImage::from_pixel(20, 20, BACKGROUND);
        buffer.put_pixel(2, 2, RED);
        buffer.put_pixel(10, 10, RED);

        let snapshot = FrameSnapshot {
            buffer: Some(Arc::new(buffer)),
            live: LiveStroke {
                path: vec![Point::new(5.0, 10.5), Point::new(15.0, 10.5)],
                color: Some(BLUE),
            },
            style: StrokeStyle { width: 2.0, marker_radius: 1.0 },
        };
        let mut frame = FrameBuffer::new(20, 20);
        compose(&mut frame, &snapshot);

        assert_eq!(frame.pixel(2, 2), Some(RED));     // old ink shows through
        assert_eq!(frame.pixel(10, 10), Some(BLUE));  // live path covers it
        assert_eq!(frame.pixel(10, 15), Some(BACKGROUND));
    }

    #[test]
    fn frame_larger_than_buffer_is_padded_with_background() {
        let buffer = RgbImage::from_pixel(2, 2, RED);
        let snapshot = FrameSnapshot { buffer: Some(Arc::new(buffer)), ..Default::default() };
        let mut frame = FrameBuffer::new(4, 3);
        compose(&mut frame, &snapshot);
        assert_eq!(count_color(&frame, RED), 4);
        assert_eq!(frame.pixel(3, 2), Some(BACKGROUND));
    }
}

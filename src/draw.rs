// Software drawing: pixels, round-capped strokes, filled discs, blits.
// Visual effects provided here:
// 1) Thick freehand lines with round ends and round corners (no gaps at joints).
// 2) Filled circular markers (what a single tap leaves behind).
// 3) Copying the persistent canvas onto a frame.
//
// Every primitive works on any `PixelTarget`, so the same code paints permanent
// ink into the off-screen `RgbImage` and the live overlay into a `FrameBuffer`.

use crate::types::{pack_rgb, Color, FrameBuffer, Point};
use image::RgbImage;

/// Something we can paint opaque pixels into.
pub trait PixelTarget {
    fn dimensions(&self) -> (u32, u32);
    /// Caller guarantees (x,y) is inside `dimensions()`.
    fn set(&mut self, x: u32, y: u32, color: Color);

    /// Paint the whole target with one color.
    fn fill(&mut self, color: Color) {
        let (w, h) = self.dimensions();
        for y in 0..h {
            for x in 0..w {
                self.set(x, y, color);
            }
        }
    }
}

impl PixelTarget for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, color: Color) {
        self.put_pixel(x, y, color);
    }

    fn fill(&mut self, color: Color) {
        for px in self.pixels_mut() {
            *px = color;
        }
    }
}

impl PixelTarget for FrameBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = pack_rgb(color);
    }

    fn fill(&mut self, color: Color) {
        let packed = pack_rgb(color);
        for px in &mut self.pixels {
            *px = packed;
        }
    }
}

/// Pixel-space box, clamped to a target. `None` when it falls fully outside.
fn clamp_box(x0: f32, y0: f32, x1: f32, y1: f32, (w, h): (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    if w == 0 || h == 0 {
        return None;
    }
    let lo_x = x0.floor().max(0.0);
    let lo_y = y0.floor().max(0.0);
    let hi_x = x1.ceil().min(w as f32 - 1.0);
    let hi_y = y1.ceil().min(h as f32 - 1.0);
    if hi_x < lo_x || hi_y < lo_y {
        return None;
    }
    Some((lo_x as u32, lo_y as u32, hi_x as u32, hi_y as u32))
}

/// Squared distance from `p` to the segment a..b (a point when a == b).
fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let len_sq = vx * vx + vy * vy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0)
    };
    let dx = p.x - (a.x + vx * t);
    let dy = p.y - (a.y + vy * t);
    dx * dx + dy * dy
}

/// Fill every pixel whose center lies within `radius` of segment a..b.
/// Visual: a "capsule", i.e. a thick line with half-disc ends.
fn fill_capsule<T: PixelTarget + ?Sized>(target: &mut T, a: Point, b: Point, radius: f32, color: Color) {
    let Some((x0, y0, x1, y1)) = clamp_box(
        a.x.min(b.x) - radius - 1.0,
        a.y.min(b.y) - radius - 1.0,
        a.x.max(b.x) + radius + 1.0,
        a.y.max(b.y) + radius + 1.0,
        target.dimensions(),
    ) else {
        return;
    };

    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_segment_distance_sq(center, a, b) <= r2 {
                target.set(x, y, color);
            }
        }
    }
}

/// Draw a filled disc centered at `center`.
/// Visual: the round marker at the start/end of every committed stroke.
pub fn fill_circle<T: PixelTarget + ?Sized>(target: &mut T, center: Point, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    fill_capsule(target, center, center, radius, color);
}

/// Stroke a polyline `width` pixels wide with round caps and round joins.
/// Visual: the freehand line you drew, exactly through every sampled point.
pub fn stroke_polyline<T: PixelTarget + ?Sized>(target: &mut T, points: &[Point], width: f32, color: Color) {
    let radius = width * 0.5;
    if radius <= 0.0 {
        return;
    }
    match points {
        [] => {}
        [only] => fill_capsule(target, *only, *only, radius, color), // a lone point is a round dot
        _ => {
            // Overlapping capsules give round joins for free.
            for seg in points.windows(2) {
                fill_capsule(target, seg[0], seg[1], radius, color);
            }
        }
    }
}

/// Copy an RGB image onto the frame at the origin, clipped to both sizes.
/// Visual: everything already inked appears on screen.
pub fn blit(frame: &mut FrameBuffer, src: &RgbImage) {
    let w = frame.width.min(src.width() as usize);
    let h = frame.height.min(src.height() as usize);
    for y in 0..h {
        let row = y * frame.width;
        for x in 0..w {
            frame.pixels[row + x] = pack_rgb(*src.get_pixel(x as u32, y as u32));
        }
    }
}

/// Count pixels of one color.
#[cfg(test)]
pub(crate) fn count_color(frame: &FrameBuffer, color: Color) -> usize {
    frame.pixels.iter().filter(|&&px| crate::types::unpack_rgb(px) == color).count()
}

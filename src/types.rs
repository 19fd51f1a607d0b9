// Core types shared by the stroke model, the persistent canvas and the compositor.

use image::Rgb;

/// Opaque stroke/background color. The persistent canvas stores these directly.
pub type Color = Rgb<u8>;

/// Paper color: new buffers, cleared buffers and every frame start from this.
pub const BACKGROUND: Color = Rgb([255, 255, 255]);

/// Pack a color into the 0x00RRGGBB layout minifb wants.
#[inline]
pub fn pack_rgb(c: Color) -> u32 {
    let [r, g, b] = c.0;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Inverse of `pack_rgb` (the top byte is ignored).
#[inline]
pub fn unpack_rgb(px: u32) -> Color {
    Rgb([((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8])
}

/// One displayable frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame of the given size, pre-filled with `BACKGROUND`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![pack_rgb(BACKGROUND); width * height],
        }
    }

    /// Read back a pixel; `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpack_rgb(self.pixels[y * self.width + x]))
    }
}

/// A pointer position in surface pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel sizes used for ink: the line width and the endpoint marker radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub marker_radius: f32,
}

impl StrokeStyle {
    pub const DEFAULT_WIDTH_DP: f32 = 8.0;
    pub const DEFAULT_MARKER_RADIUS_DP: f32 = 6.0;

    /// Convert density-independent sizes to pixels.
    pub fn from_dp(width_dp: f32, marker_radius_dp: f32, density: f32) -> Self {
        Self {
            width: width_dp * density,
            marker_radius: marker_radius_dp * density,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::from_dp(Self::DEFAULT_WIDTH_DP, Self::DEFAULT_MARKER_RADIUS_DP, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pack_matches_minifb_layout() {
        assert_eq!(pack_rgb(Rgb([0x12, 0x34, 0x56])), 0x0012_3456);
        assert_eq!(unpack_rgb(0xFF00_FF00), Rgb([0, 255, 0]));
    }

    #[test]
    fn dp_sizes_scale_with_density() {
        let style = StrokeStyle::from_dp(8.0, 6.0, 2.5);
        assert_eq!(style.width, 20.0);
        assert_eq!(style.marker_radius, 15.0);
    }

    #[test]
    fn new_frame_is_paper_white() {
        let frame = FrameBuffer::new(3, 2);
        assert_eq!(frame.pixels.len(), 6);
        assert_eq!(frame.pixel(2, 1), Some(BACKGROUND));
        assert_eq!(frame.pixel(3, 0), None);
    }
}

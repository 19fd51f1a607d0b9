// fingerpaint: a single-pointer drawing surface.
//
// Pointer events feed a `StrokeModel`; finished strokes are baked into a
// `PersistentBuffer`; frames are composed from the buffer plus the live
// stroke and handed to a `Surface`, either from a render thread at a fixed
// cadence or right after each event. `DrawingSurface` ties these together.

pub mod buffer;
pub mod canvas;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod input;
pub mod render;
pub mod stroke;
pub mod surface;
pub mod types;
pub mod window;

pub use buffer::PersistentBuffer;
pub use canvas::{CanvasOptions, DrawingSurface};
pub use config::{AppConfig, RenderMode};
pub use error::Error;
pub use input::{Handled, PointerEvent, PointerTracker};
pub use stroke::{LiveStroke, StrokeCommit, StrokeModel};
pub use surface::{FrameMailbox, HeadlessSurface, Surface};
pub use types::{Color, FrameBuffer, Point, StrokeStyle, BACKGROUND};

// Desktop host: the minifb window plus the key bindings of the demo app.

use crate::error::Error;
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Something the user asked for from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Select the n-th palette entry (0-based).
    Palette(usize),
    Clear,
}

/// Keys 1..9 pick a palette entry, C clears.
pub fn command_for_key(key: Key) -> Option<Command> {
    let command = match key {
        Key::Key1 | Key::NumPad1 => Command::Palette(0),
        Key::Key2 | Key::NumPad2 => Command::Palette(1),
        Key::Key3 | Key::NumPad3 => Command::Palette(2),
        Key::Key4 | Key::NumPad4 => Command::Palette(3),
        Key::Key5 | Key::NumPad5 => Command::Palette(4),
        Key::Key6 | Key::NumPad6 => Command::Palette(5),
        Key::Key7 | Key::NumPad7 => Command::Palette(6),
        Key::Key8 | Key::NumPad8 => Command::Palette(7),
        Key::Key9 | Key::NumPad9 => Command::Palette(8),
        Key::C => Command::Clear,
        _ => return None,
    };
    Some(command)
}

/// How often the UI thread pumps events and picks up frames.
const UI_FPS: usize = 120;

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Open a resizable window.
    /// Visual: a new blank window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions {
            resize: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(UI_FPS);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen. Also pumps window events.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Pump window events without a new frame (keeps the last one on screen).
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Drawable area in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Mouse position in window pixels, `None` while it is outside the window.
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x, y))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Commands for keys pressed since the last update.
    pub fn commands(&self) -> Vec<Command> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(command_for_key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn digit_keys_select_palette_entries() {
        assert_eq!(command_for_key(Key::Key1), Some(Command::Palette(0)));
        assert_eq!(command_for_key(Key::NumPad4), Some(Command::Palette(3)));
        assert_eq!(command_for_key(Key::Key9), Some(Command::Palette(8)));
    }

    #[test]
    fn c_clears_and_other_keys_do_nothing() {
        assert_eq!(command_for_key(Key::C), Some(Command::Clear));
        assert_eq!(command_for_key(Key::Key0), None);
        assert_eq!(command_for_key(Key::Space), None);
    }
}

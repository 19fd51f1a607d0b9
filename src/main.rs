// What you SEE:
// • A white page. Hold Left Mouse and drag to draw; release to make it permanent.
// • 1..9 pick a palette color (red, yellow, blue, green by default).
// • C clears the page. ESC quits.
// • Dragging out of the window ends the stroke where you left.

use fingerpaint::config::AppConfig;
use fingerpaint::surface::FrameMailbox;
use fingerpaint::window::{Command, Drawer};
use fingerpaint::{DrawingSurface, Error, PointerTracker};
use log::{debug, info, warn};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load_from_file().unwrap_or_else(|e| {
        warn!("using default config: {e}");
        AppConfig::default()
    });
    info!("config: {}", AppConfig::get_config_path().display());

    /* --- Window + surface ---
       Visual: the window opens on a blank white page. */
    let mut drawer = Drawer::new(&config.window.title, config.window.width, config.window.height)?;
    let (mut w, mut h) = drawer.size();
    let mailbox = FrameMailbox::new(w as u32, h as u32);

    let mut canvas = DrawingSurface::new(config.canvas_options());
    canvas.surface_created(mailbox.clone(), w as u32, h as u32)?;

    let mut tracker = PointerTracker::default();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Resize.
           Visual: the page comes back blank at the new size. */
        let (nw, nh) = drawer.size();
        if (nw, nh) != (w, h) {
            (w, h) = (nw, nh);
            mailbox.set_size(w as u32, h as u32);
            canvas.surface_changed(w as u32, h as u32);
        }

        /* 2) Keys */
        for command in drawer.commands() {
            match command {
                Command::Palette(i) => match config.palette.get(i) {
                    Some(entry) => {
                        info!("color: {}", entry.name);
                        canvas.set_color(entry.color());
                    }
                    None => debug!("no palette entry {}", i + 1),
                },
                Command::Clear => canvas.clear(),
            }
        }

        /* 3) Pointer.
           Visual: the line follows the cursor while the button is held. */
        if let Some(event) = tracker.sample(drawer.left_mouse_down(), drawer.mouse_pos()) {
            canvas.on_pointer(event);
        }

        /* 4) Show the newest composed frame, if any. */
        match mailbox.take_frame() {
            Some(frame) => {
                drawer.present(&frame)?;
                mailbox.recycle(frame);
            }
            None => drawer.pump(),
        }
    }

    /* --- Teardown ---
       The render thread stops first, then the page is released. */
    canvas.surface_destroyed();
    mailbox.set_valid(false);
    canvas.detach();
    info!("bye");
    Ok(())
}

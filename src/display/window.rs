use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::grid::Image;

/// Largest edge a scaled-up window should reach.
const TARGET_EDGE: u32 = 512;
const FRAME_INTERVAL: Duration = Duration::from_micros(16_600);

/// Integer zoom so tiny images stay visible.
pub fn pick_scale(width: u32, height: u32) -> Scale {
    let edge = width.max(height).max(1);
    match TARGET_EDGE / edge {
        0 | 1 => Scale::X1,
        2 | 3 => Scale::X2,
        4..=7 => Scale::X4,
        8..=15 => Scale::X8,
        16..=31 => Scale::X16,
        _ => Scale::X32,
    }
}

/// Shows `image` until the window is closed or Escape is pressed. Runs the
/// event loop on the calling thread.
pub fn run_viewer(image: &Image, title: &str) -> Result<()> {
    let (w, h) = image.size();
    let (w, h) = (w as usize, h as usize);
    let buffer = image.to_packed();

    let options = WindowOptions {
        resize: true,
        scale: pick_scale(image.width(), image.height()),
        scale_mode: ScaleMode::AspectRatioStretch,
        ..WindowOptions::default()
    };
    let mut window = Window::new(title, w, h, options)
        .map_err(|e| Error::display(format!("window creation failed: {e}")))?;
    window.limit_update_rate(Some(FRAME_INTERVAL));

    crate::utils::logger::info(&format!("viewer window opened: {w}x{h}"));
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, w, h)
            .map_err(|e| Error::display(format!("window update failed: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_scale() {
        assert!(matches!(pick_scale(3, 2), Scale::X32));
        assert!(matches!(pick_scale(40, 10), Scale::X8));
        assert!(matches!(pick_scale(200, 100), Scale::X2));
        assert!(matches!(pick_scale(1920, 1080), Scale::X1));
    }
}

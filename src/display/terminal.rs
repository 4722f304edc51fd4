//! Half-block truecolor preview for terminals without a window system.
//!
//! Each character cell covers two vertically stacked pixels: the top one
//! drawn as the foreground of `▀`, the bottom one as the background.

use fast_image_resize as fr;
use rayon::prelude::*;
use std::io::{BufWriter, Write};

use crate::codec::color::{Rgb, BLACK};
use crate::error::{Error, Result};
use crate::grid::Image;
use crate::shared::constants;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CellData {
    pub char: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for CellData {
    fn default() -> Self {
        Self {
            char: ' ',
            fg: BLACK,
            bg: BLACK,
        }
    }
}

/// Largest size with the same aspect ratio that fits `cols` columns and
/// `rows` cell rows (two pixels each). Never scales up.
pub fn fit_size(width: u32, height: u32, cols: u16, rows: u16) -> (u32, u32) {
    let max_w = (cols as u32).max(1);
    let max_h = (rows as u32 * 2).max(1);
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let new_w = ((width as f64 * scale).round() as u32).clamp(1, max_w);
    let new_h = ((height as f64 * scale).round() as u32).clamp(1, max_h);
    (new_w, new_h)
}

pub fn resize(image: &Image, width: u32, height: u32) -> Result<Image> {
    if image.size() == (width, height) {
        return Ok(image.copy());
    }
    let src = fr::images::Image::from_vec_u8(
        image.width(),
        image.height(),
        image.to_rgb_bytes(),
        fr::PixelType::U8x3,
    )
    .map_err(|e| Error::display(format!("resize source: {e}")))?;
    let mut dst = fr::images::Image::new(width, height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src, &mut dst, None)
        .map_err(|e| Error::display(format!("resize: {e}")))?;

    let data = dst
        .buffer()
        .chunks_exact(3)
        .map(|px| Rgb(px[0], px[1], px[2]))
        .collect();
    Image::from_parts(width, height, data)
}

pub fn build_cells(image: &Image) -> Vec<CellData> {
    let w = image.width() as usize;
    let h = image.height() as usize;
    let term_height = h.div_ceil(2);
    let pixels = image.data();

    let mut cells = vec![CellData::default(); w * term_height];
    let chunk_size = (cells.len() / rayon::current_num_threads().max(1)).max(1);

    cells
        .par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(chunk_idx, chunk)| {
            let start_idx = chunk_idx * chunk_size;
            for (i, cell) in chunk.iter_mut().enumerate() {
                let idx = start_idx + i;
                let cx = idx % w;
                let cy = idx / w;

                let get_pixel = |y: usize| pixels.get(y * w + cx).copied().unwrap_or(BLACK);
                let top = get_pixel(cy * 2);
                let bottom = if cy * 2 + 1 < h { get_pixel(cy * 2 + 1) } else { BLACK };

                *cell = CellData {
                    char: constants::HALF_BLOCK,
                    fg: top,
                    bg: bottom,
                };
            }
        });

    cells
}

#[inline(always)]
fn write_u8_fast(buffer: &mut Vec<u8>, mut n: u8) {
    if n >= 100 {
        buffer.push(b'0' + n / 100);
        n %= 100;
        buffer.push(b'0' + n / 10);
        buffer.push(b'0' + n % 10);
    } else if n >= 10 {
        buffer.push(b'0' + n / 10);
        buffer.push(b'0' + n % 10);
    } else {
        buffer.push(b'0' + n);
    }
}

fn write_color(buffer: &mut Vec<u8>, prefix: &[u8], color: Rgb) {
    buffer.extend_from_slice(prefix);
    write_u8_fast(buffer, color.0);
    buffer.push(b';');
    write_u8_fast(buffer, color.1);
    buffer.push(b';');
    write_u8_fast(buffer, color.2);
    buffer.push(b'm');
}

/// Escape-coded text for `cells`, `width` cells per line. Colors are only
/// re-sent when they change.
pub fn render(cells: &[CellData], width: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(cells.len() * 24);
    for row in cells.chunks(width.max(1)) {
        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        for cell in row {
            if Some(cell.fg) != last_fg {
                write_color(&mut buffer, b"\x1b[38;2;", cell.fg);
                last_fg = Some(cell.fg);
            }
            if Some(cell.bg) != last_bg {
                write_color(&mut buffer, b"\x1b[48;2;", cell.bg);
                last_bg = Some(cell.bg);
            }
            let mut b_dst = [0u8; 4];
            buffer.extend_from_slice(cell.char.encode_utf8(&mut b_dst).as_bytes());
        }
        buffer.extend_from_slice(b"\x1b[0m\n");
    }
    buffer
}

/// Prints `image` to stdout, shrunk to the current terminal.
pub fn print_preview(image: &Image) -> Result<()> {
    let (cols, rows) = crossterm::terminal::size()
        .unwrap_or((constants::FALLBACK_TERMINAL_COLUMNS, 24));
    // Leave a line for the prompt.
    let rows = rows.saturating_sub(1).max(1);
    let (w, h) = fit_size(image.width(), image.height(), cols, rows);
    let scaled = resize(image, w, h)?;

    let cells = build_cells(&scaled);
    let bytes = render(&cells, w as usize);

    let mut stdout = BufWriter::new(std::io::stdout());
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}

//! Line-oriented text stream spoken with the protocol tool and the window
//! viewer:
//!
//! ```text
//! <radix in decimal>
//! <width> <height>
//! <px> <px> ...        one line per row, `width` packed colors each
//! ```
//!
//! Every number after the first line is written in the announced radix.
//! Parsing is strict: a stream either yields a complete [`Image`] or an
//! [`Error::Protocol`] naming the offending line.

use std::io::{BufRead, Write};

use crate::codec::color::{int_to_rgb, Rgb};
use crate::codec::radix;
use crate::error::{Error, Result};
use crate::grid::Image;
use crate::shared::constants::{MAX_RADIX, MIN_RADIX};

const MAX_PREALLOC_PIXELS: usize = 1 << 16;

pub struct ProtocolReader<R> {
    inner: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> ProtocolReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn next_line(&mut self) -> Result<Option<&str>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(self.buf.trim_end_matches(&['\r', '\n'][..])))
    }

    pub fn read_radix(&mut self) -> Result<u32> {
        let line = self.line_no + 1;
        let text = self
            .next_line()?
            .ok_or_else(|| Error::protocol(line, "stream ended before the radix line"))?
            .trim()
            .to_string();
        let radix: u32 = text
            .parse()
            .map_err(|_| Error::protocol(line, format!("radix `{text}` is not a decimal number")))?;
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(Error::protocol(
                line,
                format!("radix {radix} is outside {MIN_RADIX}..={MAX_RADIX}"),
            ));
        }
        Ok(radix)
    }

    /// Reads the size line and exactly `height` rows of `width` pixels.
    pub fn read_image(&mut self, radix: u32) -> Result<Image> {
        let line = self.line_no + 1;
        let size_line = self
            .next_line()?
            .ok_or_else(|| Error::protocol(line, "stream ended before the size line"))?;
        let tokens: Vec<&str> = size_line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(Error::protocol(
                line,
                format!("expected `width height`, found {} values", tokens.len()),
            ));
        }
        let width = decode_dimension(tokens[0], radix, line)?;
        let height = decode_dimension(tokens[1], radix, line)?;

        // The header is untrusted; grow with the rows actually received.
        let mut data: Vec<Rgb> = Vec::with_capacity(MAX_PREALLOC_PIXELS.min(width as usize));
        for row in 0..height {
            let line = self.line_no + 1;
            let text = self.next_line()?.ok_or_else(|| {
                Error::protocol(
                    line,
                    format!("stream ended after {row} of {height} rows"),
                )
            })?;
            let before = data.len();
            for token in text.split_whitespace() {
                let value = radix::decode(token, radix)
                    .map_err(|e| Error::protocol(line, e.to_string()))?;
                // Tools may send signed ARGB; the low 32 bits carry the color.
                data.push(int_to_rgb(value as u32));
            }
            let found = data.len() - before;
            if found != width as usize {
                return Err(Error::protocol(
                    line,
                    format!("expected {width} pixels in row {row}, found {found}"),
                ));
            }
        }

        loop {
            let line = self.line_no + 1;
            match self.next_line()? {
                None => break,
                Some(text) if text.trim().is_empty() => continue,
                Some(_) => {
                    return Err(Error::protocol(line, "unexpected data after the last row"));
                }
            }
        }

        Image::from_parts(width, height, data)
    }

    /// Radix line followed by the image.
    pub fn read_stream(&mut self) -> Result<Image> {
        let radix = self.read_radix()?;
        self.read_image(radix)
    }
}

fn decode_dimension(token: &str, radix: u32, line: usize) -> Result<u32> {
    let value = radix::decode(token, radix).map_err(|e| Error::protocol(line, e.to_string()))?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::protocol(line, format!("invalid image dimension {value}"))),
    }
}

pub fn write_radix<W: Write>(out: &mut W, radix: u32) -> Result<()> {
    writeln!(out, "{radix}")?;
    Ok(())
}

/// Size line and pixel rows, each newline-terminated.
pub fn write_image<W: Write>(out: &mut W, image: &Image, radix: u32) -> Result<()> {
    writeln!(
        out,
        "{} {}",
        radix::encode(image.width() as i64, radix)?,
        radix::encode(image.height() as i64, radix)?
    )?;

    let mut line = String::new();
    for row in image.rows() {
        line.clear();
        for (i, color) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&radix::encode(color.as_int() as i64, radix)?);
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

pub fn write_stream<W: Write>(out: &mut W, image: &Image, radix: u32) -> Result<()> {
    write_radix(out, radix)?;
    write_image(out, image, radix)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Image> {
        ProtocolReader::new(Cursor::new(text.as_bytes())).read_stream()
    }

    fn protocol_line(result: Result<Image>) -> usize {
        match result {
            Err(Error::Protocol { line, .. }) => line,
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_hex_stream() {
        let img = parse("16\n2 2\nff0000 ff00\nff 0\n").unwrap();
        assert_eq!(img.size(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).unwrap(), Rgb(255, 0, 0));
        assert_eq!(img.get_pixel(1, 0).unwrap(), Rgb(0, 255, 0));
        assert_eq!(img.get_pixel(0, 1).unwrap(), Rgb(0, 0, 255));
        assert_eq!(img.get_pixel(1, 1).unwrap(), Rgb(0, 0, 0));
    }

    #[test]
    fn test_signed_argb_pixels() {
        // Opaque white and opaque black as signed 32-bit ARGB in decimal.
        let img = parse("10\n2 1\n-1 -16777216").unwrap();
        assert_eq!(img.data(), &[Rgb(255, 255, 255), Rgb(0, 0, 0)]);
    }

    #[test]
    fn test_written_stream_parses_back() {
        let mut img = Image::from_size(3, 2, Rgb(1, 2, 3)).unwrap();
        img.set_pixel(2, 1, Rgb(200, 100, 50)).unwrap();
        img.set_pixel(0, 0, Rgb(0, 0, 0)).unwrap();

        for radix in [2, 10, 36, 64] {
            let mut out = Vec::new();
            write_stream(&mut out, &img, radix).unwrap();
            let back = parse(std::str::from_utf8(&out).unwrap()).unwrap();
            assert_eq!(back, img, "radix {radix}");
        }
    }

    #[test]
    fn test_written_layout() {
        let mut img = Image::from_size(2, 1, Rgb(0, 0, 0)).unwrap();
        img.set_pixel(1, 0, Rgb(0, 0, 255)).unwrap();
        let mut out = Vec::new();
        write_stream(&mut out, &img, 16).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "16\n2 1\n0 ff\n");
    }

    #[test]
    fn test_short_row_rejected() {
        assert_eq!(protocol_line(parse("10\n3 2\n1 2 3\n4 5\n")), 4);
    }

    #[test]
    fn test_missing_rows_rejected() {
        assert_eq!(protocol_line(parse("10\n1 3\n1\n2\n")), 5);
    }

    #[test]
    fn test_extra_rows_rejected() {
        assert_eq!(protocol_line(parse("10\n1 1\n1\n2\n")), 4);
        // Trailing blank lines are fine.
        assert!(parse("10\n1 1\n1\n\n\n").is_ok());
    }

    #[test]
    fn test_bad_header_lines() {
        assert_eq!(protocol_line(parse("")), 1);
        assert_eq!(protocol_line(parse("ten\n1 1\n0\n")), 1);
        assert_eq!(protocol_line(parse("65\n1 1\n0\n")), 1);
        assert_eq!(protocol_line(parse("10\n1\n0\n")), 2);
        assert_eq!(protocol_line(parse("10\n0 1\n")), 2);
        assert_eq!(protocol_line(parse("10\n-2 1\n")), 2);
    }

    #[test]
    fn test_huge_header_short_stream_is_protocol_error() {
        assert_eq!(protocol_line(parse("36\nzzzzzz zzzzzz\n0\n")), 3);
        assert_eq!(protocol_line(parse("10\n100000 100000\n1 2 3\n")), 3);
    }

    #[test]
    fn test_invalid_digit_rejected() {
        assert_eq!(protocol_line(parse("8\n2 1\n7 9\n")), 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let img = parse("10\r\n1 1\r\n255\r\n").unwrap();
        assert_eq!(img.get_pixel(0, 0).unwrap(), Rgb(0, 0, 255));
    }
}

//! The pixel grid: a row-major run of [`Rgb`] values plus its dimensions.
//!
//! A grid's shape is fixed at construction; only pixel values change
//! afterwards. File I/O goes through whichever [`Backend`] the caller hands
//! in, so the grid itself never decides between the native library and the
//! protocol tool.

use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::codec::color::{Rgb, BLACK};
use crate::display::temp;
use crate::error::{Error, Result};
use crate::shared::constants;

#[derive(Clone, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<Rgb>,
}

impl Image {
    /// Reads `path` through `backend`.
    pub fn from_file(path: impl AsRef<Path>, backend: &dyn Backend) -> Result<Self> {
        let path = path.as_ref();
        crate::utils::logger::debug(&format!(
            "open {} via {} backend",
            path.display(),
            backend.name()
        ));
        backend.read(path)
    }

    /// Independent deep copy of `other`.
    pub fn from_grid(other: &Image) -> Self {
        Self {
            width: other.width,
            height: other.height,
            data: other.data.clone(),
        }
    }

    /// `width * height` pixels of `fill`.
    pub fn from_size(width: u32, height: u32, fill: Rgb) -> Result<Self> {
        let len = Self::checked_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::InvalidDimensions { width, height })?;
        data.resize(len, fill);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn blank(width: u32, height: u32) -> Result<Self> {
        Self::from_size(width, height, BLACK)
    }

    /// Convenience form of [`Image::from_size`]. `mode` is accepted for
    /// compatibility with callers that pass one (e.g. `"RGB"`) and ignored.
    pub fn new(_mode: &str, size: (u32, u32), color: Option<Rgb>) -> Result<Self> {
        Self::from_size(size.0, size.1, color.unwrap_or(BLACK))
    }

    /// Wraps decoded pixel data; `data` must hold exactly `width * height` values.
    pub fn from_parts(width: u32, height: u32, data: Vec<Rgb>) -> Result<Self> {
        let expected = Self::checked_len(width, height)?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn checked_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let invalid = Error::InvalidDimensions { width, height };
        let len = match (width as usize).checked_mul(height as usize) {
            Some(len) => len,
            None => return Err(invalid),
        };
        match len.checked_mul(std::mem::size_of::<Rgb>()) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(len),
            _ => Err(invalid),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[Rgb] {
        &self.data
    }

    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgb> {
        let idx = self.index(x, y)?;
        Ok(self.data[idx])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> Result<()> {
        let idx = self.index(x, y)?;
        self.data[idx] = color;
        Ok(())
    }

    pub fn fill(&mut self, color: Rgb) {
        self.data.iter_mut().for_each(|px| *px = color);
    }

    /// Rows top to bottom, each `width` pixels long.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> + '_ {
        self.data.chunks_exact(self.width as usize)
    }

    /// `(x, y, color)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgb)> + '_ {
        let w = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &c)| ((i % w) as u32, (i / w) as u32, c))
    }

    /// Interleaved `R, G, B` bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|&Rgb(r, g, b)| [r, g, b])
            .collect()
    }

    /// Packed `0x00RRGGBB` values, the layout window framebuffers expect.
    pub fn to_packed(&self) -> Vec<u32> {
        self.data.iter().map(|c| c.as_int()).collect()
    }

    pub fn save(&self, path: impl AsRef<Path>, backend: &dyn Backend) -> Result<()> {
        let path = path.as_ref();
        crate::utils::logger::debug(&format!(
            "save {}x{} to {} via {} backend",
            self.width,
            self.height,
            path.display(),
            backend.name()
        ));
        backend.write(self, path)
    }

    pub fn copy(&self) -> Image {
        Image::from_grid(self)
    }

    /// Saves into a registered temp file that is removed at cleanup time.
    pub fn temp_file(&self, backend: &dyn Backend) -> Result<PathBuf> {
        let path = temp::create(constants::TEMP_FILE_EXTENSION)?;
        self.save(&path, backend)?;
        Ok(path)
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        self.data == other.data
    }
}

impl Eq for Image {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const TEAL: Rgb = Rgb(10, 20, 30);

    /// Keeps the last written grid in memory.
    struct MemoryBackend {
        stored: RefCell<Option<Image>>,
    }

    impl Backend for MemoryBackend {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn read(&self, _path: &Path) -> Result<Image> {
            self.stored
                .borrow()
                .clone()
                .ok_or_else(|| Error::BackendUnavailable("nothing stored".into()))
        }

        fn write(&self, image: &Image, _path: &Path) -> Result<()> {
            *self.stored.borrow_mut() = Some(image.clone());
            Ok(())
        }
    }

    #[test]
    fn test_new_fills_every_pixel() {
        let img = Image::new("RGB", (3, 2), Some(TEAL)).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.data().len(), 6);
        assert!(img.data().iter().all(|&c| c == TEAL));
    }

    #[test]
    fn test_default_fill_is_black() {
        let img = Image::new("ignored", (2, 2), None).unwrap();
        assert!(img.data().iter().all(|&c| c == BLACK));
        assert_eq!(img, Image::blank(2, 2).unwrap());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Image::from_size(0, 4, TEAL),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_from_size_rejects_unallocatable() {
        assert!(matches!(
            Image::from_size(u32::MAX, u32::MAX, BLACK),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Image::from_parts(u32::MAX, u32::MAX, Vec::new()),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_fill_repaints_every_pixel() {
        let mut img = Image::blank(3, 2).unwrap();
        img.set_pixel(1, 1, WHITE_ISH).unwrap();
        img.fill(TEAL);
        assert_eq!(img, Image::from_size(3, 2, TEAL).unwrap());
    }

    #[test]
    fn test_row_major_indexing() {
        let mut img = Image::blank(3, 2).unwrap();
        img.set_pixel(2, 1, TEAL).unwrap();
        assert_eq!(img.data()[1 * 3 + 2], TEAL);
        assert_eq!(img.get_pixel(2, 1).unwrap(), TEAL);
        assert_eq!(img.get_pixel(1, 1).unwrap(), BLACK);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut img = Image::blank(3, 2).unwrap();
        assert!(matches!(img.get_pixel(3, 0), Err(Error::OutOfBounds { x: 3, .. })));
        assert!(matches!(img.get_pixel(0, 2), Err(Error::OutOfBounds { y: 2, .. })));
        assert!(img.set_pixel(5, 5, TEAL).is_err());
        assert!(img.data().iter().all(|&c| c == BLACK));
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Image::from_size(4, 4, TEAL).unwrap();
        let mut copy = original.copy();
        assert_eq!(copy, original);

        copy.set_pixel(0, 0, BLACK).unwrap();
        assert_ne!(copy, original);
        assert_eq!(original.get_pixel(0, 0).unwrap(), TEAL);
    }

    #[test]
    fn test_different_size_never_equal() {
        let wide = Image::from_size(3, 2, TEAL).unwrap();
        let tall = Image::from_size(2, 3, TEAL).unwrap();
        assert_eq!(wide.data(), tall.data());
        assert_ne!(wide, tall);
    }

    #[test]
    fn test_from_parts_checks_length() {
        let err = Image::from_parts(2, 2, vec![TEAL; 3]).unwrap_err();
        assert!(matches!(err, Error::DataLength { expected: 4, actual: 3 }));
        assert!(Image::from_parts(2, 2, vec![TEAL; 4]).is_ok());
    }

    #[test]
    fn test_rows_and_pixels() {
        let mut img = Image::blank(2, 3).unwrap();
        img.set_pixel(1, 2, WHITE_ISH).unwrap();
        let rows: Vec<&[Rgb]> = img.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], &[BLACK, WHITE_ISH]);

        let last = img.pixels().last().unwrap();
        assert_eq!(last, (1, 2, WHITE_ISH));
    }

    const WHITE_ISH: Rgb = Rgb(250, 250, 250);

    #[test]
    fn test_byte_views() {
        let img = Image::from_size(2, 1, Rgb(1, 2, 3)).unwrap();
        assert_eq!(img.to_rgb_bytes(), vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(img.to_packed(), vec![0x010203, 0x010203]);
    }

    #[test]
    fn test_save_then_open_through_backend() {
        let backend = MemoryBackend {
            stored: RefCell::new(None),
        };
        let mut img = Image::from_size(3, 3, TEAL).unwrap();
        img.set_pixel(1, 1, BLACK).unwrap();
        img.save("unused.png", &backend).unwrap();

        let back = Image::from_file("unused.png", &backend).unwrap();
        assert_eq!(back, img);
    }
}

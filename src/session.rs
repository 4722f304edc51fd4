use std::path::{Path, PathBuf};

use crate::backend::{self, Backend};
use crate::codec::color::Rgb;
use crate::config::Config;
use crate::display::{Display, ShowMode, Shown};
use crate::error::Result;
use crate::grid::Image;

/// A loaded [`Config`] bound to the backend and display it selects.
///
/// Build one at start-up and pass it wherever images are opened, saved or
/// shown; nothing in the crate consults global backend state.
pub struct Session {
    config: Config,
    backend: Box<dyn Backend>,
    display: Display,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let backend = backend::select_backend(&config)?;
        let display = Display::new(&config);
        Ok(Self {
            config,
            backend,
            display,
        })
    }

    /// Uses `backend` regardless of the configured preference.
    pub fn with_backend(config: Config, backend: Box<dyn Backend>) -> Self {
        let display = Display::new(&config);
        Self {
            config,
            backend,
            display,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn open(&self, path: impl AsRef<Path>) -> Result<Image> {
        Image::from_file(path, self.backend())
    }

    pub fn new_image(&self, width: u32, height: u32, fill: Rgb) -> Result<Image> {
        Image::from_size(width, height, fill)
    }

    pub fn save(&self, image: &Image, path: impl AsRef<Path>) -> Result<()> {
        image.save(path, self.backend())
    }

    pub fn temp_file(&self, image: &Image) -> Result<PathBuf> {
        image.temp_file(self.backend())
    }

    pub fn show(&self, image: &Image, mode: ShowMode) -> Result<Shown> {
        self.display.show(image, self.backend(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendPreference;

    #[test]
    fn test_session_uses_configured_backend() {
        let config = Config {
            backend: BackendPreference::Piper,
            ..Config::default()
        };
        let session = Session::new(config).unwrap();
        assert_eq!(session.backend().name(), "piper");
        assert_eq!(session.config().backend, BackendPreference::Piper);
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_open_save_round_trip() {
        let session = Session::new(Config::default()).unwrap();
        let path = std::env::temp_dir().join(format!("pixgrid_session_{}.png", std::process::id()));

        let mut img = session.new_image(5, 4, Rgb(1, 2, 3)).unwrap();
        img.set_pixel(4, 3, Rgb(250, 128, 0)).unwrap();
        session.save(&img, &path).unwrap();
        let back = session.open(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, img);
    }
}

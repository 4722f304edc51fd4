//! Pixel-level image access: load a file into a grid of RGB pixels, read
//! and write individual pixels, save it back, and show it.
//!
//! File I/O goes through one of two interchangeable backends: the native
//! `image` crate, or an external tool that streams pixels over a
//! line-oriented text protocol. Which one is used is decided once, from a
//! [`Config`], when a [`Session`] is built.
//!
//! ```no_run
//! use pixgrid::{Config, Rgb, Session, ShowMode};
//!
//! # fn main() -> pixgrid::Result<()> {
//! let _cleanup = pixgrid::init_cleanup();
//! let session = Session::new(Config::load()?)?;
//! let mut img = session.open("photo.png")?;
//! img.set_pixel(0, 0, Rgb(255, 0, 0))?;
//! session.save(&img, "out.png")?;
//! session.show(&img, ShowMode::Detached)?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod grid;
pub mod session;
pub mod shared;
pub mod utils;

pub use backend::{Backend, PiperBackend};
#[cfg(feature = "native")]
pub use backend::NativeBackend;
pub use codec::{int_to_rgb, rgb_to_int, Rgb};
pub use config::{BackendPreference, Config};
pub use display::{CleanupGuard, Display, ShowMode, Shown, Viewer};
pub use error::{Error, Result};
pub use grid::Image;
pub use session::Session;

/// Removes display temp files when the returned guard is dropped.
pub fn init_cleanup() -> CleanupGuard {
    display::temp::guard()
}

pub mod piper;
pub mod protocol;

#[cfg(feature = "native")]
pub mod native;

use std::path::Path;

use crate::config::{BackendPreference, Config};
use crate::error::Result;
use crate::grid::Image;

#[cfg(feature = "native")]
pub use native::NativeBackend;
pub use piper::PiperBackend;

/// A filename <-> pixel grid pair of operations.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn read(&self, path: &Path) -> Result<Image>;

    fn write(&self, image: &Image, path: &Path) -> Result<()>;
}

pub fn native_available() -> bool {
    cfg!(feature = "native")
}

/// Resolves the configured preference to a concrete backend.
pub fn select_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match config.backend {
        BackendPreference::Native => native_backend()?,
        BackendPreference::Auto if native_available() => native_backend()?,
        BackendPreference::Auto | BackendPreference::Piper => {
            Box::new(PiperBackend::new(config.tool.clone()))
        }
    };
    crate::utils::logger::info(&format!(
        "backend selected: {} (preference {:?})",
        backend.name(),
        config.backend
    ));
    Ok(backend)
}

#[cfg(feature = "native")]
fn native_backend() -> Result<Box<dyn Backend>> {
    Ok(Box::new(NativeBackend))
}

#[cfg(not(feature = "native"))]
fn native_backend() -> Result<Box<dyn Backend>> {
    Err(crate::error::Error::BackendUnavailable(
        "pixgrid was built without the `native` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_piper_preference() {
        let config = Config {
            backend: BackendPreference::Piper,
            ..Config::default()
        };
        assert_eq!(select_backend(&config).unwrap().name(), "piper");
    }

    #[test]
    fn test_auto_prefers_native_when_built() {
        let backend = select_backend(&Config::default()).unwrap();
        if native_available() {
            assert_eq!(backend.name(), "native");
        } else {
            assert_eq!(backend.name(), "piper");
        }
    }

    #[test]
    fn test_native_preference_without_feature() {
        let config = Config {
            backend: BackendPreference::Native,
            ..Config::default()
        };
        match select_backend(&config) {
            Ok(backend) => assert!(native_available() && backend.name() == "native"),
            Err(crate::error::Error::BackendUnavailable(_)) => assert!(!native_available()),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

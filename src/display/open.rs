//! "Open with the default application" dispatch.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Commands tried in order; the file path is appended to each.
#[cfg(windows)]
pub const OPENERS: &[&[&str]] = &[&["cmd", "/C", "start", ""]];

/// `open` covers macOS, `xdg-open` the freedesktop world.
#[cfg(not(windows))]
pub const OPENERS: &[&[&str]] = &[&["open"], &["xdg-open"]];

/// Tries each opener until one exits successfully; otherwise returns the
/// last failure.
pub fn open_with(openers: &[&[&str]], path: &Path) -> Result<()> {
    let mut last_err = Error::display("no opener configured");

    for opener in openers {
        let Some((program, args)) = opener.split_first() else {
            continue;
        };
        let result = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => {
                crate::utils::logger::info(&format!("opened {} with {}", path.display(), program));
                return Ok(());
            }
            Ok(status) => {
                crate::utils::logger::info(&format!("{} returned {}", program, status));
                last_err = Error::ToolFailed {
                    tool: opener.join(" "),
                    status,
                };
            }
            Err(e) => {
                crate::utils::logger::info(&format!("{} failed to start: {}", program, e));
                last_err = Error::display(format!("cannot run `{}`: {}", program, e));
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_posix_order() {
        assert_eq!(OPENERS, &[&["open"][..], &["xdg-open"][..]]);
    }

    #[cfg(unix)]
    #[test]
    fn test_falls_through_to_next_opener() {
        let openers: &[&[&str]] = &[&["false"], &["true"]];
        assert!(open_with(openers, Path::new("/tmp/whatever.png")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_surfaces_last_failure() {
        let openers: &[&[&str]] = &[&["true-but-missing-9137"], &["false"]];
        assert!(matches!(
            open_with(openers, Path::new("x.png")),
            Err(Error::ToolFailed { .. })
        ));

        let openers: &[&[&str]] = &[&["false"], &["pixgrid-missing-opener-9137"]];
        assert!(matches!(
            open_with(openers, Path::new("x.png")),
            Err(Error::Display(_))
        ));
    }
}

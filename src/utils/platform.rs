use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// What this process can do, as reported by `pixgrid detect`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Capabilities {
    pub os_name: String,
    pub arch: String,
    pub native_backend: bool,
    pub window_viewer_built: bool,
    pub gui_session: bool,
    pub backend_preference: String,
    pub tool: String,
    pub tool_found: bool,
    pub viewer: String,
    pub viewer_found: bool,
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub supports_truecolor: bool,
    pub temp_dir: String,
}

impl Capabilities {
    pub fn detect(config: &Config) -> Self {
        let (width, height) = crossterm::terminal::size().unwrap_or((0, 0));

        Self {
            os_name: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            native_backend: crate::backend::native_available(),
            window_viewer_built: cfg!(feature = "window"),
            gui_session: gui_session(),
            backend_preference: format!("{:?}", config.backend).to_lowercase(),
            tool: config.tool.join(" "),
            tool_found: command_found(&config.tool),
            viewer: config.viewer.join(" "),
            viewer_found: command_found(&config.viewer),
            terminal_width: width,
            terminal_height: height,
            supports_truecolor: detect_truecolor(),
            temp_dir: env::temp_dir().display().to_string(),
        }
    }
}

/// A desktop session is assumed on Windows and macOS; elsewhere an X11 or
/// Wayland display must be advertised.
pub fn gui_session() -> bool {
    if cfg!(any(windows, target_os = "macos")) {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| env::var(var).map(|v| !v.is_empty()).unwrap_or(false))
}

pub fn gui_available(viewer: &[String]) -> bool {
    !viewer.is_empty() && gui_session()
}

fn detect_truecolor() -> bool {
    env::var("COLORTERM")
        .map(|v| v.contains("truecolor") || v.contains("24bit"))
        .unwrap_or(false)
}

fn command_found(command: &[String]) -> bool {
    command
        .first()
        .map(|program| find_program(program).is_some())
        .unwrap_or(false)
}

/// Resolves `program` the way a spawn would: as a path when it contains a
/// separator, otherwise through `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = full.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

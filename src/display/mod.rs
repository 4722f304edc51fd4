//! Showing a grid: the OS default viewer (through a managed temp file), a
//! separate viewer process with its own window, or an inline terminal
//! preview.

pub mod open;
pub mod temp;
pub mod terminal;

#[cfg(feature = "window")]
pub mod window;

use std::io::BufWriter;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::backend::{protocol, Backend};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::grid::Image;

pub use temp::CleanupGuard;

/// How [`Display::show`] presents an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowMode {
    /// Temp file handed to the platform's default application.
    OsDefault,
    /// Viewer window in its own process; returns immediately.
    Detached,
    /// Viewer window in its own process; returns when it closes.
    Wait,
}

#[derive(Debug)]
pub enum Shown {
    /// Written to this temp file and handed to the OS.
    TempFile(PathBuf),
    Detached(Viewer),
    Closed(ExitStatus),
}

/// A running viewer process. Dropping it leaves the process running.
#[derive(Debug)]
pub struct Viewer {
    child: Child,
}

impl Viewer {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    pub fn wait(mut self) -> Result<ExitStatus> {
        Ok(self.child.wait()?)
    }
}

pub struct Display {
    viewer: Vec<String>,
    title: String,
    wire_radix: u32,
    gui: bool,
    openers: &'static [&'static [&'static str]],
}

impl Display {
    pub fn new(config: &Config) -> Self {
        Self {
            viewer: config.viewer.clone(),
            title: config.viewer_title.clone(),
            wire_radix: config.wire_radix,
            gui: crate::utils::platform::gui_available(&config.viewer),
            openers: open::OPENERS,
        }
    }

    /// Replaces the platform "open" commands tried by [`Display::show_in_os`].
    pub fn with_openers(mut self, openers: &'static [&'static [&'static str]]) -> Self {
        self.openers = openers;
        self
    }

    /// Whether a viewer window can be launched in this session.
    pub fn has_gui(&self) -> bool {
        self.gui
    }

    /// Falls back to the OS viewer when no window can be shown.
    pub fn show(&self, image: &Image, backend: &dyn Backend, mode: ShowMode) -> Result<Shown> {
        match mode {
            ShowMode::OsDefault => self.show_in_os(image, backend).map(Shown::TempFile),
            _ if !self.has_gui() => {
                crate::utils::logger::info("no GUI session, using the OS viewer");
                self.show_in_os(image, backend).map(Shown::TempFile)
            }
            ShowMode::Detached => self.spawn_window(image).map(Shown::Detached),
            ShowMode::Wait => self.show_window_and_wait(image).map(Shown::Closed),
        }
    }

    pub fn show_in_os(&self, image: &Image, backend: &dyn Backend) -> Result<PathBuf> {
        let path = image.temp_file(backend)?;
        open::open_with(self.openers, &path)?;
        Ok(path)
    }

    /// Starts the viewer and streams the pixels to it. Does not wait.
    pub fn spawn_window(&self, image: &Image) -> Result<Viewer> {
        let (program, args) = self
            .viewer
            .split_first()
            .ok_or_else(|| Error::display("no viewer command configured"))?;

        let mut child = Command::new(program)
            .args(args)
            .arg("--title")
            .arg(&self.title)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::display(format!("cannot start viewer `{program}`: {e}")))?;

        let sent = match child.stdin.take() {
            Some(stdin) => {
                let mut out = BufWriter::new(stdin);
                protocol::write_stream(&mut out, image, self.wire_radix)
            }
            None => Err(Error::display("viewer stdin was not captured")),
        };
        if let Err(e) = sent {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        crate::utils::logger::info(&format!("viewer started (pid {})", child.id()));
        Ok(Viewer { child })
    }

    pub fn show_window_and_wait(&self, image: &Image) -> Result<ExitStatus> {
        let status = self.spawn_window(image)?.wait()?;
        crate::utils::logger::info(&format!("viewer exited with {status}"));
        Ok(status)
    }

    pub fn preview_terminal(&self, image: &Image) -> Result<()> {
        terminal::print_preview(image)
    }
}

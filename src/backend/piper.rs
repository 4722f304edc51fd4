//! Backend that delegates file I/O to an external protocol tool.
//!
//! The tool is run as `<tool...> read <file>` (it prints a protocol stream)
//! or `<tool...> write <file>` (it prints the radix line, then consumes the
//! size line and rows on stdin). Calls block until the tool exits.

use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::backend::protocol::{self, ProtocolReader};
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::grid::Image;

#[derive(Debug, Clone)]
pub struct PiperBackend {
    command: Vec<String>,
}

impl PiperBackend {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    fn build(&self, verb: &str, path: &Path) -> Result<Command> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::BackendUnavailable("no protocol tool configured".into()))?;
        let mut cmd = Command::new(program);
        cmd.args(args).arg(verb).arg(path).stderr(Stdio::inherit());
        Ok(cmd)
    }

    fn spawn(&self, mut cmd: Command) -> Result<Child> {
        cmd.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Error::BackendUnavailable(format!("cannot run `{}`: {}", self.command_line(), e))
            }
            _ => Error::Io(e),
        })
    }

    fn check_status(&self, status: ExitStatus) -> Result<()> {
        if status.success() {
            Ok(())
        } else {
            Err(Error::ToolFailed {
                tool: self.command_line(),
                status,
            })
        }
    }

    /// Prefers the tool's exit status over a protocol error when the tool
    /// produced no output at all (it failed before speaking).
    fn settle<T>(&self, child: &mut Child, outcome: Result<T>, lines_read: usize) -> Result<T> {
        let status = child.wait()?;
        match outcome {
            Ok(value) => {
                self.check_status(status)?;
                Ok(value)
            }
            Err(err @ Error::Protocol { .. }) if lines_read > 0 || status.success() => Err(err),
            Err(err) => {
                self.check_status(status)?;
                Err(err)
            }
        }
    }
}

impl Backend for PiperBackend {
    fn name(&self) -> &'static str {
        "piper"
    }

    fn read(&self, path: &Path) -> Result<Image> {
        let mut cmd = self.build("read", path)?;
        cmd.stdin(Stdio::null()).stdout(Stdio::piped());
        let mut child = self.spawn(cmd)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::BackendUnavailable("tool stdout was not captured".into()))?;
        let mut reader = ProtocolReader::new(BufReader::new(stdout));
        let outcome = reader.read_stream();
        let lines_read = reader.lines_read();
        // Closing our end lets a tool that is still writing terminate.
        drop(reader);

        let image = self.settle(&mut child, outcome, lines_read)?;
        crate::utils::logger::debug(&format!(
            "piper read {}x{} from {}",
            image.width(),
            image.height(),
            path.display()
        ));
        Ok(image)
    }

    fn write(&self, image: &Image, path: &Path) -> Result<()> {
        let mut cmd = self.build("write", path)?;
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped());
        let mut child = self.spawn(cmd)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::BackendUnavailable("tool stdout was not captured".into()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::BackendUnavailable("tool stdin was not captured".into()))?;

        let mut reader = ProtocolReader::new(BufReader::new(stdout));
        // `out` owns the tool's stdin; dropping it signals end of input.
        let outcome = reader.read_radix().and_then(|radix| {
            let mut out = BufWriter::new(stdin);
            protocol::write_image(&mut out, image, radix)?;
            out.flush()?;
            Ok(())
        });
        let lines_read = reader.lines_read();
        drop(reader);

        self.settle(&mut child, outcome, lines_read)
    }
}

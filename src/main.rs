use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use pixgrid::backend::protocol::{self, ProtocolReader};
use pixgrid::display::{temp, ShowMode, Shown};
use pixgrid::utils::{logger, platform};
use pixgrid::{BackendPreference, Config, Session};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override the configured backend
    #[arg(short, long, value_enum, global = true)]
    backend: Option<BackendPreference>,

    /// Do not write pixgrid-debug.log / pixgrid-error.log
    #[arg(long, global = true, default_value_t = false)]
    no_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an image's size
    Info { file: PathBuf },
    /// Read an image with the selected backend and write it back out
    Convert { input: PathBuf, output: PathBuf },
    /// Show an image in a viewer window or the default application
    Show {
        file: PathBuf,
        #[arg(long, default_value_t = false, help = "Use the OS default application instead of the viewer window")]
        os_default: bool,
        #[arg(short, long, default_value_t = false, help = "Block until the viewer window closes")]
        wait: bool,
    },
    /// Draw an image in the terminal
    Preview { file: PathBuf },
    /// Viewer window fed by a protocol stream on stdin
    View {
        #[arg(long, default_value = pixgrid::shared::constants::DEFAULT_VIEWER_TITLE)]
        title: String,
    },
    /// Protocol tool side: stream pixels over stdin/stdout
    Piper {
        #[command(subcommand)]
        action: PiperAction,
    },
    /// Report backends, display support and terminal capabilities
    Detect,
}

#[derive(Subcommand)]
enum PiperAction {
    /// Print `file` as a protocol stream on stdout
    Read { file: PathBuf },
    /// Announce the radix, then read a protocol stream from stdin into `file`
    Write { file: PathBuf },
}

impl Commands {
    /// Subprocess roles must not truncate the parent's logs.
    fn runs_as_child(&self) -> bool {
        matches!(self, Commands::View { .. } | Commands::Piper { .. })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.no_log && !cli.command.runs_as_child() {
        logger::init(&std::env::current_dir()?);
    }

    let _cleanup = pixgrid::init_cleanup();
    ctrlc::set_handler(|| {
        temp::cleanup();
        std::process::exit(130);
    })
    .context("failed to install the Ctrl-C handler")?;

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let result = run(cli.command, config);
    if let Err(e) = &result {
        logger::error(&format!("{:#}", e));
    }
    result
}

fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Info { file } => {
            let session = Session::new(config)?;
            let img = session
                .open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            println!(
                "{}: {}x{} ({} backend)",
                file.display(),
                img.width(),
                img.height(),
                session.backend().name()
            );
        }
        Commands::Convert { input, output } => {
            let session = Session::new(config)?;
            let img = session
                .open(&input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            session
                .save(&img, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            logger::info(&format!("converted {} -> {}", input.display(), output.display()));
        }
        Commands::Show {
            file,
            os_default,
            wait,
        } => {
            let session = Session::new(config)?;
            let img = session
                .open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            let mode = match (os_default, wait) {
                (true, _) => ShowMode::OsDefault,
                (false, true) => ShowMode::Wait,
                (false, false) => ShowMode::Detached,
            };
            match session.show(&img, mode)? {
                Shown::TempFile(path) => {
                    println!("Opened {} with the default application.", path.display());
                    hold_temp_files()?;
                }
                Shown::Detached(viewer) => println!("Viewer running (pid {}).", viewer.id()),
                Shown::Closed(status) => {
                    if !status.success() {
                        bail!("viewer exited with {}", status);
                    }
                }
            }
        }
        Commands::Preview { file } => {
            let session = Session::new(config)?;
            let img = session
                .open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            session.display().preview_terminal(&img)?;
        }
        Commands::View { title } => run_viewer(&title)?,
        Commands::Piper { action } => run_piper(action, config.wire_radix)?,
        Commands::Detect => {
            let caps = platform::Capabilities::detect(&config);
            println!("{}", serde_json::to_string_pretty(&caps)?);
        }
    }

    Ok(())
}

/// The temp file is removed on exit, so keep the process alive while the
/// external application loads it.
fn hold_temp_files() -> Result<()> {
    if !io::stdin().is_terminal() {
        return Ok(());
    }
    print!("Press Enter to exit and remove the temporary file.");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}

#[cfg(feature = "window")]
fn run_viewer(title: &str) -> Result<()> {
    let img = ProtocolReader::new(io::stdin().lock())
        .read_stream()
        .context("viewer received a malformed stream")?;
    pixgrid::display::window::run_viewer(&img, title)?;
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_viewer(_title: &str) -> Result<()> {
    bail!("pixgrid was built without the `window` feature")
}

#[cfg(feature = "native")]
fn run_piper(action: PiperAction, radix: u32) -> Result<()> {
    use pixgrid::{Backend, NativeBackend};

    match action {
        PiperAction::Read { file } => {
            let img = NativeBackend
                .read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mut out = BufWriter::new(io::stdout().lock());
            protocol::write_stream(&mut out, &img, radix)?;
        }
        PiperAction::Write { file } => {
            let mut out = io::stdout().lock();
            protocol::write_radix(&mut out, radix)?;
            out.flush()?;

            let img = ProtocolReader::new(io::stdin().lock())
                .read_image(radix)
                .context("malformed pixel stream on stdin")?;
            NativeBackend
                .write(&img, &file)
                .with_context(|| format!("failed to write {}", file.display()))?;
        }
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
fn run_piper(_action: PiperAction, _radix: u32) -> Result<()> {
    bail!("the protocol tool needs the `native` feature")
}

//! Plain file logger. Nothing is written until [`init`] is called, so the
//! library stays silent unless the host program opts in.

use crate::shared::constants;
use lazy_static::lazy_static;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone)]
struct LoggerPaths {
    error_path: String,
    debug_path: String,
}

lazy_static! {
    static ref LOGGER: Mutex<Option<LoggerPaths>> = Mutex::new(None);
}

fn logger() -> MutexGuard<'static, Option<LoggerPaths>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn append_line(path: &str, line: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", line);
    }
}

fn start_file(path: &Path, banner: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
    {
        let _ = writeln!(file, "=== {} Started: {} ===", banner, chrono::Local::now());
    }
}

/// Starts fresh error/debug logs in `dir` and installs a panic hook that
/// records panics there.
pub fn init(dir: &Path) {
    let error_path = dir.join(constants::ERROR_LOG_FILE);
    let debug_path = dir.join(constants::DEBUG_LOG_FILE);

    start_file(&error_path, "Error Log");
    start_file(&debug_path, "Debug Log");

    let paths = LoggerPaths {
        error_path: error_path.to_string_lossy().to_string(),
        debug_path: debug_path.to_string_lossy().to_string(),
    };
    *logger() = Some(paths.clone());

    panic::set_hook(Box::new(move |info| {
        let backtrace = Backtrace::capture();
        let msg = match info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<Any>",
            },
        };

        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let error_msg = format!(
            "\nCRITICAL PANIC at {}:\nMessage: {}\nBacktrace:\n{:?}\n",
            location, msg, backtrace
        );

        append_line(&paths.error_path, &error_msg);
        append_line(&paths.debug_path, &error_msg);

        eprintln!(
            "{} crashed: {} ({}). See {} for details.",
            constants::APP_NAME,
            msg,
            location,
            paths.error_path
        );
    }));
}

pub fn log(level: &str, msg: &str) {
    if let Some(paths) = logger().as_ref() {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}][{}] {}", timestamp, level, msg);
        append_line(&paths.debug_path, &line);

        if level == "ERROR" {
            append_line(&paths.error_path, &line);
        }
    }
}

pub fn info(msg: &str) {
    log("INFO", msg);
}

pub fn error(msg: &str) {
    log("ERROR", msg);
}

pub fn debug(msg: &str) {
    log("DEBUG", msg);
}

pub const APP_NAME: &str = "pixgrid";

pub const LOCAL_CONFIG_FILE: &str = "pixgrid.json";
pub const CONFIG_DIR_NAME: &str = "pixgrid";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const BACKEND_ENV_VAR: &str = "PIXGRID_BACKEND";

pub const ERROR_LOG_FILE: &str = "pixgrid-error.log";
pub const DEBUG_LOG_FILE: &str = "pixgrid-debug.log";

/// Digit symbols for radix 2..=64. Position is the digit value.
pub const RADIX_ALPHABET: &[u8; 64] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_@";
pub const MIN_RADIX: u32 = 2;
pub const MAX_RADIX: u32 = 64;
pub const DEFAULT_WIRE_RADIX: u32 = 36;

pub const DEFAULT_TOOL: &[&str] = &["pixgrid", "piper"];
pub const DEFAULT_VIEWER: &[&str] = &["pixgrid", "view"];
pub const DEFAULT_VIEWER_TITLE: &str = "pixgrid viewer";

pub const TEMP_FILE_PREFIX: &str = "pixgrid";
pub const TEMP_FILE_EXTENSION: &str = "png";

/// Half-block glyph: top pixel is the foreground, bottom pixel the background.
pub const HALF_BLOCK: char = '▀';
pub const FALLBACK_TERMINAL_COLUMNS: u16 = 80;

use std::fmt;

/// Errors surfaced by config parsing and host-facing parsing helpers.
///
/// Engine operations never return these: stale references are no-ops.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad delimiter, zero width, etc.).
    ConfigValidation(String),
    /// Side name that is neither source nor target.
    UnknownSide(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownSide(side) => {
                write!(f, "unknown side: '{side}' (expected 'source' or 'target')")
            }
        }
    }
}

impl std::error::Error for ReconError {}

//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                |
//! |---------|------------|--------------------------------------------|
//! | 0       | Universal  | Success                                    |
//! | 1       | Universal  | General error (unspecified)                |
//! | 2       | Universal  | CLI usage error (bad args)                 |
//! | 3-4     | input      | Reading or parsing input files             |
//! | 5-9     | config     | Recon config problems                      |
//! | 10-19   | session    | Interactive mapping session                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-4)
// =============================================================================

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Input file is not well-formed delimited text.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Config (5-9)
// =============================================================================

/// Recon config failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 5;

// =============================================================================
// Session (10-19)
// =============================================================================

/// Script mode: a command line could not be parsed and --strict was given.
pub const EXIT_SESSION_BAD_COMMAND: u8 = 10;

/// Script mode: an operation was ignored (stale id) and --strict was given.
pub const EXIT_SESSION_IGNORED: u8 = 11;

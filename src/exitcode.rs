//! Standard Unix exit codes for the marks CLI.

/// Command line usage error - invalid arguments, unknown source, etc.
pub const USAGE: i32 = 64;

/// The bookmark store or a browser source could not be used
pub const UNAVAILABLE: i32 = 69;

//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid config file, context, labels or rules
pub const CONFIG_ERROR: i32 = 2;

/// Substitution error - release values kept unresolved tokens
pub const SUBSTITUTION_ERROR: i32 = 3;

/// Input error - malformed manifest or rule files
pub const INPUT_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Provider error - unknown or failing config provider
pub const PROVIDER_ERROR: i32 = 6;

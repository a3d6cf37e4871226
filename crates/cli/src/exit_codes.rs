//! CLI Exit Code Registry
//!
//! Single source of truth for `postlyzer` exit codes. Scripts rely on them.
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error, or drift found            |
//! | 2     | Universal | CLI usage error (bad args, missing file) |
//! | 3-9   | input     | Job files and input CSVs                 |
//! | 10-19 | export    | Writing CSV output                       |
//! | 20    | settings  | Feature switched off in settings.json    |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable input path.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-9)
// =============================================================================

/// Drift found (fields over threshold, or ids present on one side only).
/// Like `diff(1)`, exit 1 means "tables differ."
pub const EXIT_RECONCILE_DRIFT: u8 = 1;

/// Reconcile job file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input CSV malformed, missing a column, or holding a non-numeric metric.
pub const EXIT_INPUT_CSV: u8 = 4;

// =============================================================================
// Export (10-19)
// =============================================================================

/// CSV generation or write failed.
pub const EXIT_EXPORT_WRITE: u8 = 10;

// =============================================================================
// Settings (20)
// =============================================================================

/// Command needs a feature that settings.json switches off.
pub const EXIT_FEATURE_DISABLED: u8 = 20;

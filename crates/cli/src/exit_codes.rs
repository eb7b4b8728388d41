//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                              |
//! |---------|-------------|------------------------------------------|
//! | 0       | Universal   | Success                                  |
//! | 1       | Universal   | General error (unspecified)              |
//! | 2       | Universal   | CLI usage error (bad args, missing file) |
//! | 3-9     | eval        | Calculation evaluation codes             |
//! | 10-19   | suggestions | Suggestion source codes                  |
//! | 20-29   | tui         | Terminal codes                           |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable script, malformed event.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Eval (3-9)
// =============================================================================

/// The calculation evaluated to the "Error" marker.
pub const EXIT_EVAL_ERROR: u8 = 3;

// =============================================================================
// Suggestions (10-19)
// =============================================================================

/// Could not reach the suggestion endpoint.
pub const EXIT_SUGGEST_NETWORK: u8 = 10;

/// Endpoint answered with a non-success HTTP status.
pub const EXIT_SUGGEST_HTTP: u8 = 11;

/// Response (or suggestions file) was not a suggestion list.
pub const EXIT_SUGGEST_PARSE: u8 = 12;

/// Suggestions file could not be read.
pub const EXIT_SUGGEST_IO: u8 = 13;

// =============================================================================
// TUI (20-29)
// =============================================================================

/// Interactive mode needs a terminal on stdin/stdout.
pub const EXIT_TUI_NO_TTY: u8 = 20;

/// Terminal setup, drawing, or event reading failed.
pub const EXIT_TUI_IO: u8 = 21;

/// Map a suggestion source error to its exit code.
pub fn suggest_exit_code(err: &tagcalc_suggest_client::SuggestError) -> u8 {
    use tagcalc_suggest_client::SuggestError;
    match err {
        SuggestError::Network(_) => EXIT_SUGGEST_NETWORK,
        SuggestError::Http(..) => EXIT_SUGGEST_HTTP,
        SuggestError::Parse(_) => EXIT_SUGGEST_PARSE,
        SuggestError::Io(_) => EXIT_SUGGEST_IO,
    }
}

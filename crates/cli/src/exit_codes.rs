//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so existing values never change meaning.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, bad plan)     |
//! | 3-9     | input     | Local file problems                      |
//! | 10-19   | backend   | Ingestion service codes                  |

use castgrid_client::ClientError;
use castgrid_reader::ReadError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid cast assignment or plan file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-9)
// =============================================================================

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// File type is neither delimited text nor a spreadsheet.
pub const EXIT_UNSUPPORTED_FORMAT: u8 = 4;

// =============================================================================
// Backend (10-19)
// =============================================================================

/// Network failure or unexpected HTTP status from the backend.
pub const EXIT_TRANSPORT: u8 = 10;

/// Backend rejected the request (400/422).
pub const EXIT_VALIDATION: u8 = 11;

/// Map a reader error to its exit code.
pub fn read_exit_code(err: &ReadError) -> u8 {
    match err {
        ReadError::UnsupportedFormat(_) => EXIT_UNSUPPORTED_FORMAT,
        ReadError::Io(_) => EXIT_IO,
        ReadError::Spreadsheet(_) => EXIT_ERROR,
    }
}

/// Map a backend error to its exit code.
pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::Validation(_) => EXIT_VALIDATION,
        ClientError::Network(_) | ClientError::Http(..) | ClientError::Parse(_) => EXIT_TRANSPORT,
        ClientError::Io(_) => EXIT_IO,
        ClientError::Cancelled => EXIT_ERROR,
    }
}

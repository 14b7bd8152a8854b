//! Hexen CLI - standalone binary.
//!
//! A thin wrapper around [`hexen_cli::run_cli`], handling error display
//! and exit codes. All command logic lives in the library crate for
//! testability.
//!
//! # Exit Codes
//!
//! - `0` - success
//! - `1` - parse error, diagnostics found, or missing file

fn main() {
    if let Err(e) = hexen_cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

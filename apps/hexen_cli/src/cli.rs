//! Command-line interface for the Hexen compiler.
//!
//! Two commands over a source file:
//!
//! ```bash
//! hexen parse program.hxn     # print the AST as JSON
//! hexen check program.hxn     # parse, analyze, print diagnostics
//! ```
//!
//! Argument parsing is built on [`clap`] derive macros; each command
//! variant maps to a handler returning `Result<(), String>` so the binary
//! can turn any failure into exit code 1.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use hexen_language::parse;
use hexen_semantic::{analyze_program, Diagnostic};

/// Top-level argument parser for `hexen`.
#[derive(Parser)]
#[command(name = "hexen")]
#[command(about = "The Hexen compiler", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a source file and print its AST as JSON.
    Parse {
        /// Path to the Hexen source file.
        file: PathBuf,
    },
    /// Parse a source file, run semantic analysis, and print diagnostics.
    Check {
        /// Path to the Hexen source file.
        file: PathBuf,
    },
}

/// Parses arguments and dispatches to the matching handler.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Parse { file } => {
            let json = parse_file(&file)?;
            println!("{}", json);
            Ok(())
        }
        Commands::Check { file } => {
            let diagnostics = check_file(&file)?;
            if diagnostics.is_empty() {
                println!("no errors found");
                Ok(())
            } else {
                for diagnostic in &diagnostics {
                    println!("{}", diagnostic);
                }
                Err(format!("{} error(s) found", diagnostics.len()))
            }
        }
    }
}

/// `parse` command body: the AST as pretty-printed JSON.
pub fn parse_file(path: &Path) -> Result<String, String> {
    let source = read_source(path)?;
    let program = parse(&source).map_err(|e| format!("parse error: {}", e))?;
    serde_json::to_string_pretty(&program).map_err(|e| format!("serialization error: {}", e))
}

/// `check` command body: every diagnostic the analyzer produced.
/// Missing files and parse errors are `Err`; diagnostics are data.
pub fn check_file(path: &Path) -> Result<Vec<Diagnostic>, String> {
    let source = read_source(path)?;
    let program = parse(&source).map_err(|e| format!("parse error: {}", e))?;
    Ok(analyze_program(&program))
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexen_semantic::DiagnosticKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn parse_prints_tagged_json() {
        let file = source_file("func main() : i32 = { return 0 }");
        let json = parse_file(file.path()).expect("parse_file failed");
        assert!(json.contains("\"type\": \"program\""));
        assert!(json.contains("\"type\": \"function\""));
        assert!(json.contains("\"name\": \"main\""));
    }

    #[test]
    fn check_on_a_clean_program_is_empty() {
        let file = source_file("func main() : i32 = { val x : i64 = 42; return 0 }");
        let diagnostics = check_file(file.path()).expect("check_file failed");
        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);
    }

    #[test]
    fn check_reports_semantic_errors() {
        let file = source_file("func main() : void = { val x = ghost }");
        let diagnostics = check_file(file.path()).expect("check_file failed");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UndefinedVariable);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = check_file(Path::new("no/such/file.hxn")).unwrap_err();
        assert!(err.contains("cannot read"));
    }

    #[test]
    fn parse_error_is_an_error() {
        let file = source_file("func main( : i32");
        let err = check_file(file.path()).unwrap_err();
        assert!(err.contains("parse error"));
    }
}

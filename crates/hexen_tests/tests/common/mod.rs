//! Shared helpers for the end-to-end semantic tests.
#![allow(dead_code)]

use hexen_language::{parse, Program};
use hexen_semantic::{analyze_program, Diagnostic, DiagnosticKind};

pub fn parse_ok(source: &str) -> Program {
    match parse(source) {
        Ok(program) => program,
        Err(e) => panic!("parse failed: {}\nsource:\n{}", e, source),
    }
}

/// Full pipeline: source text → diagnostics.
pub fn check(source: &str) -> Vec<Diagnostic> {
    analyze_program(&parse_ok(source))
}

pub fn assert_clean(source: &str) {
    let diagnostics = check(source);
    assert!(
        diagnostics.is_empty(),
        "expected no diagnostics, got {:?}\nsource:\n{}",
        diagnostics,
        source
    );
}

/// Asserts the exact diagnostic kinds, in emission order.
pub fn assert_kinds(source: &str, expected: &[DiagnosticKind]) {
    let diagnostics = check(source);
    let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds, expected,
        "diagnostics: {:?}\nsource:\n{}",
        diagnostics, source
    );
}

/// Asserts a single diagnostic of the given kind and returns it.
pub fn assert_one_error(source: &str, kind: DiagnosticKind) -> Diagnostic {
    let mut diagnostics = check(source);
    assert_eq!(
        diagnostics.len(),
        1,
        "expected exactly one diagnostic, got {:?}\nsource:\n{}",
        diagnostics,
        source
    );
    let diagnostic = diagnostics.remove(0);
    assert_eq!(diagnostic.kind, kind, "diagnostic: {:?}", diagnostic);
    diagnostic
}

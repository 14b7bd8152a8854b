//! Diagnostic records the analyzer accumulates.
//!
//! Analysis never aborts on user errors: each erroneous node appends one
//! [`Diagnostic`] and yields `Unknown` so its ancestors stay quiet. The
//! kind tags are stable strings; messages are stable enough to test
//! against substrings; suggestions are one-line code fragments and are
//! always present on the "dangerous but legal with explicit
//! acknowledgement" class (`PrecisionLoss`, the two
//! `…RequiresAnnotation`s).

use std::fmt;

/// Stable classification of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // Structural
    Redeclaration,
    UndefinedVariable,
    UseOfUninitialized,
    AssignToImmutable,
    MissingReturn,
    ReturnOutsideFunction,
    BareReturnInNonVoid,
    ValueReturnInVoid,
    ExpressionBlockMissingAssign,
    AssignOutsideExpressionBlock,
    MissingTypeAnnotation,
    UnusableVariable,
    CannotInferType,

    // Typing
    TypeMismatch,
    PrecisionLoss,
    InvalidConversion,
    MixedConcreteRequiresAnnotation,
    MixedComptimeRequiresAnnotation,
    FloatInIntegerDivision,
    ComparisonTypeMismatch,
    NonBoolCondition,
    MissingElseBranch,
    BranchTypeMismatch,

    // Arrays / ranges
    ArraySizeMismatch,
    InconsistentShape,
    EmptyArrayNeedsContext,
    IndexNotInteger,
    IndexOnNonArray,
    InvalidRange,
    FloatRangeNeedsStep,
    RangeMaterializationNeedsBounds,

    // Labels / loops
    UnknownLabel,
    BreakOutsideLoop,
    ContinueOutsideLoop,

    // Function calls
    NotAFunction,
    ArityMismatch,
    ArgTypeMismatch,

    /// Analyzer invariant violation; analysis ends after this.
    InternalError,
}

impl DiagnosticKind {
    /// The stable string tag used in CLI output and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Redeclaration => "Redeclaration",
            DiagnosticKind::UndefinedVariable => "UndefinedVariable",
            DiagnosticKind::UseOfUninitialized => "UseOfUninitialized",
            DiagnosticKind::AssignToImmutable => "AssignToImmutable",
            DiagnosticKind::MissingReturn => "MissingReturn",
            DiagnosticKind::ReturnOutsideFunction => "ReturnOutsideFunction",
            DiagnosticKind::BareReturnInNonVoid => "BareReturnInNonVoid",
            DiagnosticKind::ValueReturnInVoid => "ValueReturnInVoid",
            DiagnosticKind::ExpressionBlockMissingAssign => "ExpressionBlockMissingAssign",
            DiagnosticKind::AssignOutsideExpressionBlock => "AssignOutsideExpressionBlock",
            DiagnosticKind::MissingTypeAnnotation => "MissingTypeAnnotation",
            DiagnosticKind::UnusableVariable => "UnusableVariable",
            DiagnosticKind::CannotInferType => "CannotInferType",
            DiagnosticKind::TypeMismatch => "TypeMismatch",
            DiagnosticKind::PrecisionLoss => "PrecisionLoss",
            DiagnosticKind::InvalidConversion => "InvalidConversion",
            DiagnosticKind::MixedConcreteRequiresAnnotation => "MixedConcreteRequiresAnnotation",
            DiagnosticKind::MixedComptimeRequiresAnnotation => "MixedComptimeRequiresAnnotation",
            DiagnosticKind::FloatInIntegerDivision => "FloatInIntegerDivision",
            DiagnosticKind::ComparisonTypeMismatch => "ComparisonTypeMismatch",
            DiagnosticKind::NonBoolCondition => "NonBoolCondition",
            DiagnosticKind::MissingElseBranch => "MissingElseBranch",
            DiagnosticKind::BranchTypeMismatch => "BranchTypeMismatch",
            DiagnosticKind::ArraySizeMismatch => "ArraySizeMismatch",
            DiagnosticKind::InconsistentShape => "InconsistentShape",
            DiagnosticKind::EmptyArrayNeedsContext => "EmptyArrayNeedsContext",
            DiagnosticKind::IndexNotInteger => "IndexNotInteger",
            DiagnosticKind::IndexOnNonArray => "IndexOnNonArray",
            DiagnosticKind::InvalidRange => "InvalidRange",
            DiagnosticKind::FloatRangeNeedsStep => "FloatRangeNeedsStep",
            DiagnosticKind::RangeMaterializationNeedsBounds => "RangeMaterializationNeedsBounds",
            DiagnosticKind::UnknownLabel => "UnknownLabel",
            DiagnosticKind::BreakOutsideLoop => "BreakOutsideLoop",
            DiagnosticKind::ContinueOutsideLoop => "ContinueOutsideLoop",
            DiagnosticKind::NotAFunction => "NotAFunction",
            DiagnosticKind::ArityMismatch => "ArityMismatch",
            DiagnosticKind::ArgTypeMismatch => "ArgTypeMismatch",
            DiagnosticKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// One-line code fragment the user can apply, e.g. `a:i32`.
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(
        kind: DiagnosticKind,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.kind, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_suggestion() {
        let diag = Diagnostic::new(DiagnosticKind::UndefinedVariable, "Undefined variable: 'x'");
        assert_eq!(
            diag.to_string(),
            "error[UndefinedVariable]: Undefined variable: 'x'"
        );
    }

    #[test]
    fn display_with_suggestion() {
        let diag = Diagnostic::with_suggestion(
            DiagnosticKind::PrecisionLoss,
            "Potential truncation: i64 value may not fit in i32",
            "a:i32",
        );
        let text = diag.to_string();
        assert!(text.contains("error[PrecisionLoss]"));
        assert!(text.contains("suggestion: a:i32"));
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(
            DiagnosticKind::MixedConcreteRequiresAnnotation.as_str(),
            "MixedConcreteRequiresAnnotation"
        );
        assert_eq!(DiagnosticKind::InternalError.as_str(), "InternalError");
    }
}

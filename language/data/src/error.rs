use std::fmt::{Display, Formatter};

use colored::Colorize;

use crate::tokens::Span;

/// The closed taxonomy of semantic-analysis diagnostics (§7). Every variant
/// names the rule it enforces, not the phase that happens to enforce it
/// today, so a rule that moves between jobs doesn't need a new code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    NamespaceMustComeBeforeUsingsAndDeclarations,
    MulitpleNamespaces,
    UsingsMustComeBeforeDeclarations,
    DuplicateUsingDirective,
    MulitpleVisibiltyDeclarations,
    SealedOrAbstract,
    OptionalParameterOrder,
    DuplicateParameterName,
    DuplicateIdentifierInScope,
    BaseTypeAppearsMultipleTimes,
    MultipleModifiers,
    UnresolvedType,
    AmbiguousTypeMatch,
    TypeArgumentShouldNotBeAnExistingTypeName,
    TypeCannotBeProtected,
    TypeCannotBeRef,
    CycleDetectedInClassHierarchy,
    CannotInheritRecursively,
    CannotInheritASealedType,
    StructsCanOnlyInheritInterfaces,
    OnlyFirstBaseTypeCanBeClass,
    BaseTypeInNonZeroPositionMustBeAnInterface,
    BaseTypeCannotBeRef,
    BaseTypeCannotBeNullable,
    BaseTypeCannotBeTuple,
    InvalidModifierForFieldDeclaration,
    InvalidModifierForMethodDeclaration,
    InvalidModifierForParameterDeclaration,
    NotImplemented,
}

impl ErrorCode {
    /// The `ERR_*` spelling used in diagnostic output, matching the upstream
    /// taxonomy's naming so golden-dump tests can assert on it directly.
    pub const fn code_name(self) -> &'static str {
        match self {
            ErrorCode::NamespaceMustComeBeforeUsingsAndDeclarations => "ERR_NamespaceMustComeBeforeUsingsAndDeclarations",
            ErrorCode::MulitpleNamespaces => "ERR_MulitpleNamespaces",
            ErrorCode::UsingsMustComeBeforeDeclarations => "ERR_UsingsMustComeBeforeDeclarations",
            ErrorCode::DuplicateUsingDirective => "ERR_DuplicateUsingDirective",
            ErrorCode::MulitpleVisibiltyDeclarations => "ERR_MulitpleVisibiltyDeclarations",
            ErrorCode::SealedOrAbstract => "ERR_SealedOrAbstract",
            ErrorCode::OptionalParameterOrder => "ERR_OptionalParameterOrder",
            ErrorCode::DuplicateParameterName => "ERR_DuplicateParameterName",
            ErrorCode::DuplicateIdentifierInScope => "ERR_DuplicateIdentifierInScope",
            ErrorCode::BaseTypeAppearsMultipleTimes => "ERR_BaseTypeAppearsMultipleTimes",
            ErrorCode::MultipleModifiers => "ERR_MultipleModifiers",
            ErrorCode::UnresolvedType => "ERR_UnresolvedType",
            ErrorCode::AmbiguousTypeMatch => "ERR_AmbiguousTypeMatch",
            ErrorCode::TypeArgumentShouldNotBeAnExistingTypeName => "ERR_TypeArgumentShouldNotBeAnExistingTypeName",
            ErrorCode::TypeCannotBeProtected => "ERR_TypeCannotBeProtected",
            ErrorCode::TypeCannotBeRef => "ERR_TypeCannotBeRef",
            ErrorCode::CycleDetectedInClassHierarchy => "ERR_CycleDetectedInClassHierarchy",
            ErrorCode::CannotInheritRecursively => "ERR_CannotInheritRecursively",
            ErrorCode::CannotInheritASealedType => "ERR_CannotInheritASealedType",
            ErrorCode::StructsCanOnlyInheritInterfaces => "ERR_StructsCanOnlyInheritInterfaces",
            ErrorCode::OnlyFirstBaseTypeCanBeClass => "ERR_OnlyFirstBaseTypeCanBeClass",
            ErrorCode::BaseTypeInNonZeroPositionMustBeAnInterface => "ERR_BaseTypeInNonZeroPositionMustBeAnInterface",
            ErrorCode::BaseTypeCannotBeRef => "ERR_BaseTypeCannotBeRef",
            ErrorCode::BaseTypeCannotBeNullable => "ERR_BaseTypeCannotBeNullable",
            ErrorCode::BaseTypeCannotBeTuple => "ERR_BaseTypeCannotBeTuple",
            ErrorCode::InvalidModifierForFieldDeclaration => "ERR_InvalidModifierForFieldDeclaration",
            ErrorCode::InvalidModifierForMethodDeclaration => "ERR_InvalidModifierForMethodDeclaration",
            ErrorCode::InvalidModifierForParameterDeclaration => "ERR_InvalidModifierForParameterDeclaration",
            ErrorCode::NotImplemented => "ERR_NotImplemented",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code_name())
    }
}

/// One reported problem: a code, the span it points at, and an optional
/// free-form message (e.g. the formatted cycle path in `ERR_CycleDetectedInClassHierarchy`).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub span: Span,
    pub message: Option<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, span: Span) -> Self {
        Self { code, span, message: None }
    }

    pub fn with_message(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self { code, span, message: Some(message.into()) }
    }

    /// Renders a caret pointer under the offending line, the way `ParsingError::print`
    /// does upstream, using `source_line` as the already-extracted line of text.
    pub fn print(&self, file_path: &str, source_line: &str) {
        let text = self.message.as_deref().unwrap_or_default();
        println!("{}", format!("{}: {}", self.code, text).bright_red());
        println!("{}", format!("in file {}:{}:{}", file_path, self.span.start.0, self.span.start.1).bright_red());
        let gutter = self.span.start.0.to_string();
        println!("{} {}", " ".repeat(gutter.len()), "|".bright_cyan());
        println!("{} {} {}", gutter.bright_cyan(), "|".bright_cyan(), source_line.bright_red());
        let width = (self.span.end_offset.max(self.span.start_offset + 1)) - self.span.start_offset;
        println!(
            "{} {} {}{}",
            " ".repeat(gutter.len()),
            "|".bright_cyan(),
            " ".repeat(self.span.start.1 as usize),
            "^".repeat(width).bright_red()
        );
    }
}

/// A per-file diagnostics sink. Each `SourceFile` owns one; jobs push into it
/// and never panic on a user-facing error — §7's "validation continues after
/// every error to maximize diagnostics per run" is this struct's whole job.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: parking_lot::Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }

    pub fn report(&self, code: ErrorCode, span: Span) {
        self.push(Diagnostic::new(code, span));
    }

    pub fn report_with_message(&self, code: ErrorCode, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::with_message(code, span, message));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Takes a snapshot, sorted by source position, for deterministic output.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        let mut out = self.entries.lock().clone();
        out.sort_by_key(|d| (d.span.start.0, d.span.start.1));
        out
    }
}

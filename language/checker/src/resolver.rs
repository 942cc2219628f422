use std::sync::Arc;

use alchemy_ast::TypeSyntax;
use alchemy_data::{ErrorCode, Span};
use alchemy_syntax::{BuiltInTypeName, ResolvedType, ResolvedTypeFlags, TypeInfo, TypeTable};

use crate::source_file::SourceFile;

/// §4.4 Resolver: maps a type-syntax node to a `ResolvedType` under the
/// current file's scoping rules. One instance is built per type being
/// processed (its `input_generic_arguments` changes as Base/Member push a
/// new type's generic parameters into scope), so it borrows rather than owns
/// its file and table.
pub struct Resolver<'a> {
    pub file: &'a SourceFile,
    pub table: &'a TypeTable,
    pub suppress_diagnostics: bool,
    pub input_generic_arguments: &'a [Arc<TypeInfo>],
}

impl<'a> Resolver<'a> {
    pub fn new(file: &'a SourceFile, table: &'a TypeTable) -> Self {
        Self { file, table, suppress_diagnostics: false, input_generic_arguments: &[] }
    }

    fn report(&self, code: ErrorCode, span: Span) {
        if !self.suppress_diagnostics {
            self.file.diagnostics.report(code, span);
        }
    }

    pub fn try_resolve_type(&self, syntax: &TypeSyntax) -> ResolvedType {
        match syntax {
            TypeSyntax::Predefined { keyword, span } => match BuiltInTypeName::from_keyword(*keyword) {
                Some(name) => ResolvedType::new(self.table.builtin[&name].clone()),
                None => {
                    self.report(ErrorCode::UnresolvedType, *span);
                    ResolvedType::unresolved()
                }
            },
            TypeSyntax::IdentifierName { name, span } => self.try_resolve_identifier(name, *span),
            TypeSyntax::GenericName { name, arguments, span } => self.try_resolve_generic_name(name, arguments, *span),
            TypeSyntax::Nullable { inner, span: _ } => {
                let resolved = self.try_resolve_type(inner);
                resolved.with_flag(ResolvedTypeFlags::IS_NULLABLE)
            }
            TypeSyntax::Ref { inner, span: _ } => {
                let resolved = self.try_resolve_type(inner);
                resolved.with_flag(ResolvedTypeFlags::IS_REF)
            }
            TypeSyntax::Tuple { span, .. } | TypeSyntax::Qualified { span, .. } => {
                self.report(ErrorCode::NotImplemented, *span);
                ResolvedType::unresolved()
            }
        }
    }

    /// §4.4 `tryResolveIdentifier`.
    pub fn try_resolve_identifier(&self, name: &str, span: Span) -> ResolvedType {
        if let Some(generic_arg) = self.input_generic_arguments.iter().find(|t| t.type_name() == name) {
            return ResolvedType::new(generic_arg.clone());
        }

        let mut found: Option<Arc<TypeInfo>> = None;
        for using in self.file.using_directives() {
            let fqn = alchemy_syntax::naming::make_fully_qualified_name(using, name, 0);
            if let Some(candidate) = self.table.try_resolve(&fqn) {
                match &found {
                    None => found = Some(candidate),
                    Some(existing) if !Arc::ptr_eq(existing, &candidate) => {
                        self.report(ErrorCode::AmbiguousTypeMatch, span);
                    }
                    _ => {}
                }
            }
        }

        if found.is_none() {
            let fqn = alchemy_syntax::naming::make_fully_qualified_name("global", name, 0);
            found = self.table.try_resolve(&fqn);
        }

        match found {
            Some(type_info) => ResolvedType::new(type_info),
            None => {
                self.report(ErrorCode::UnresolvedType, span);
                ResolvedType::unresolved()
            }
        }
    }

    /// §4.4 `tryResolveGenericName`: identical search loop but with arity in
    /// the FQN, plus a first-try probe in `BuiltIn::Array$1` so `Array<T>`
    /// is globally usable without a using directive.
    pub fn try_resolve_generic_name(&self, name: &str, arguments: &[TypeSyntax], span: Span) -> ResolvedType {
        let resolved_args: Vec<ResolvedType> = arguments.iter().map(|a| self.try_resolve_type(a)).collect();
        let arity = resolved_args.len();

        if name == "Array" && arity == 1 {
            let array_fqn = alchemy_syntax::naming::make_fully_qualified_name("BuiltIn", "Array", 1);
            if let Some(open) = self.table.try_resolve(&array_fqn) {
                return self.table.make_generic_type(&open, resolved_args, &self.file.diagnostics, span);
            }
        }

        let mut found: Option<Arc<TypeInfo>> = None;
        for using in self.file.using_directives() {
            let fqn = alchemy_syntax::naming::make_fully_qualified_name(using, name, arity);
            if let Some(candidate) = self.table.try_resolve(&fqn) {
                match &found {
                    None => found = Some(candidate),
                    Some(existing) if !Arc::ptr_eq(existing, &candidate) => {
                        self.report(ErrorCode::AmbiguousTypeMatch, span);
                    }
                    _ => {}
                }
            }
        }
        if found.is_none() {
            let fqn = alchemy_syntax::naming::make_fully_qualified_name("global", name, arity);
            found = self.table.try_resolve(&fqn);
        }

        match found {
            Some(open) => self.table.make_generic_type(&open, resolved_args, &self.file.diagnostics, span),
            None => {
                self.report(ErrorCode::UnresolvedType, span);
                ResolvedType::unresolved()
            }
        }
    }
}

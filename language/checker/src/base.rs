use std::collections::HashMap;
use std::sync::Arc;

use alchemy_data::ErrorCode;
use alchemy_syntax::{ResolvedTypeFlags, TypeClass, TypeInfo, TypeInfoFlags, TypeTable};

use crate::resolver::Resolver;
use crate::source_file::SourceFile;

/// §4.6 BaseJob: resolves each declared type's base list and validates the
/// inheritance graph. Cycle detection itself is NOT done here — a type's
/// base list may name a type in another file that hasn't resolved its own
/// base list yet, so checking per-type right after setting `base_types`
/// would see a truncated graph. Call `detect_cycles` once every file's
/// `run` has returned (i.e. after this phase's barrier).
pub fn run(file: &SourceFile, table: &TypeTable) {
    for (decl, type_info) in file.tree.items.iter().filter_map(as_type_decl).zip(file.declared_types()) {
        run_one(file, table, decl, type_info);
    }
}

fn as_type_decl(item: &alchemy_ast::TopLevelItem) -> Option<&alchemy_ast::TypeDeclSyntax> {
    match item {
        alchemy_ast::TopLevelItem::Type(decl) => Some(decl),
        _ => None,
    }
}

fn run_one(file: &SourceFile, table: &TypeTable, decl: &alchemy_ast::TypeDeclSyntax, type_info: &std::sync::Arc<TypeInfo>) {
    let generic_params: Vec<_> = type_info
        .generic_arguments
        .iter()
        .filter_map(|a| a.type_info.clone())
        .collect();

    let mut resolver = Resolver::new(file, table);
    resolver.input_generic_arguments = &generic_params;

    // Step 2: in suppressed-diagnostics mode, a generic-argument name must
    // not already resolve to an existing type.
    for param in &generic_params {
        let mut shadow_check = Resolver::new(file, table);
        shadow_check.suppress_diagnostics = true;
        let probe = shadow_check.try_resolve_identifier(param.type_name(), param.span);
        if !probe.is_unresolved() {
            file.diagnostics.report(ErrorCode::TypeArgumentShouldNotBeAnExistingTypeName, param.span);
        }
    }

    let base_types: Vec<_> = decl.base_list.iter().map(|syntax| resolver.try_resolve_type(syntax)).collect();

    for resolved in &base_types {
        let span = decl.span;
        if resolved.flags.contains(ResolvedTypeFlags::IS_REF) {
            file.diagnostics.report(ErrorCode::BaseTypeCannotBeRef, span);
        }
        if resolved.flags.contains(ResolvedTypeFlags::IS_NULLABLE) {
            file.diagnostics.report(ErrorCode::BaseTypeCannotBeNullable, span);
        }
        if resolved.flags.contains(ResolvedTypeFlags::IS_TUPLE) {
            file.diagnostics.report(ErrorCode::BaseTypeCannotBeTuple, span);
        }
    }

    // Duplicate / self-inheritance detection.
    for (i, a) in base_types.iter().enumerate() {
        if let Some(a_info) = &a.type_info {
            if std::ptr::eq(a_info.as_ref(), type_info.as_ref()) {
                file.diagnostics.report(ErrorCode::CannotInheritRecursively, decl.span);
            }
            for b in &base_types[..i] {
                if let Some(b_info) = &b.type_info {
                    if std::sync::Arc::ptr_eq(a_info, b_info) {
                        file.diagnostics.report(ErrorCode::BaseTypeAppearsMultipleTimes, decl.span);
                    }
                }
            }
            if a_info.flags.contains(TypeInfoFlags::SEALED) {
                file.diagnostics.report(ErrorCode::CannotInheritASealedType, decl.span);
            }
        }
    }

    match type_info.type_class {
        TypeClass::Struct => {
            if let Some(first) = base_types.first() {
                if let Some(first_info) = &first.type_info {
                    if first_info.type_class != TypeClass::Interface {
                        file.diagnostics.report(ErrorCode::StructsCanOnlyInheritInterfaces, decl.span);
                    }
                }
            }
        }
        TypeClass::Class => {
            for (i, resolved) in base_types.iter().enumerate() {
                if let Some(info) = &resolved.type_info {
                    if i == 0 {
                        continue;
                    }
                    if info.type_class == TypeClass::Class {
                        file.diagnostics.report(ErrorCode::OnlyFirstBaseTypeCanBeClass, decl.span);
                    } else if info.type_class != TypeClass::Interface {
                        file.diagnostics.report(ErrorCode::BaseTypeInNonZeroPositionMustBeAnInterface, decl.span);
                    }
                }
            }
        }
        _ => {}
    }

    let _ = type_info.base_types.set(base_types);
}

/// Global cross-file cycle check, run once every file's `run` above has
/// returned (i.e. after the Base-phase barrier, before Member starts). A
/// cycle can span files — `A : B` in one file, `B : A` in another — so this
/// can't be done per-type inside `run_one` without seeing a graph that's
/// still half-resolved. Each type in a discovered cycle is marked visited so
/// the other members of that same cycle don't each independently re-report
/// it.
pub fn detect_cycles(files: &[Arc<SourceFile>], table: &TypeTable) {
    let files_by_id: HashMap<alchemy_data::FileId, &Arc<SourceFile>> = files.iter().map(|f| (f.file, f)).collect();
    let mut visited: std::collections::HashSet<*const TypeInfo> = std::collections::HashSet::new();

    for type_info in table.get_concrete_types() {
        if type_info.type_class != TypeClass::Class {
            continue;
        }
        if visited.contains(&(Arc::as_ptr(&type_info))) {
            continue;
        }
        let Some(path) = type_info.detect_class_cycle() else {
            continue;
        };
        for member in &path {
            visited.insert(Arc::as_ptr(member));
        }
        // `path` starts wherever the DFS happened to begin, which depends on
        // `get_concrete_types`'s (unspecified) iteration order. Rotate it to
        // a canonical start — the cycle member with the lexicographically
        // smallest FQN — so the reported message doesn't depend on table
        // iteration order.
        let cycle_nodes = &path[..path.len() - 1];
        let min_index = cycle_nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.fully_qualified_name.as_str())
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut canonical: Vec<Arc<TypeInfo>> = cycle_nodes[min_index..].iter().chain(cycle_nodes[..min_index].iter()).cloned().collect();
        canonical.push(canonical[0].clone());

        let anchor = &canonical[0];
        let names: Vec<&str> = canonical.iter().map(|t| t.fully_qualified_name.as_str()).collect();
        let Some(declaring_file) = anchor.declaring_file.and_then(|id| files_by_id.get(&id)) else {
            continue;
        };
        let span = span_of_decl(declaring_file, anchor).unwrap_or_else(alchemy_data::Span::synthetic);
        declaring_file.diagnostics.report_with_message(ErrorCode::CycleDetectedInClassHierarchy, span, names.join(" -> "));
    }
}

fn span_of_decl(file: &SourceFile, type_info: &Arc<TypeInfo>) -> Option<alchemy_data::Span> {
    file.tree
        .items
        .iter()
        .filter_map(as_type_decl)
        .zip(file.declared_types())
        .find(|(_, candidate)| Arc::ptr_eq(candidate, type_info))
        .map(|(decl, _)| decl.span)
}

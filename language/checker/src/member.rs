use std::sync::Arc;

use alchemy_ast::{FieldSyntax, MethodSyntax, ModifierToken, ParameterSyntax, TypeDeclSyntax};
use alchemy_data::{ErrorCode, TokenKind};
use alchemy_syntax::{
    ConstructorInfo, FieldInfo, FieldModifier, IndexerInfo, MethodInfo, MethodModifier, ParameterInfo, ParameterModifier, PropertyInfo, TypeInfo,
    TypeTable, Visibility,
};

use crate::resolver::Resolver;
use crate::source_file::SourceFile;

/// §4.7 MemberJob: resolves every member's type signature and materializes
/// default-parameter overloads.
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

fn run_one(file: &SourceFile, table: &TypeTable, decl: &TypeDeclSyntax, type_info: &Arc<TypeInfo>) {
    let generic_params: Vec<_> = type_info.generic_arguments.iter().filter_map(|a| a.type_info.clone()).collect();
    let mut resolver = Resolver::new(file, table);
    resolver.input_generic_arguments = &generic_params;

    let _ = type_info.fields.set(decl.fields.iter().flat_map(|f| resolve_field(file, &resolver, type_info, f)).collect());
    let _ = type_info.methods.set(decl.methods.iter().flat_map(|m| resolve_method(file, &resolver, type_info, m)).collect());

    let properties = decl
        .properties
        .iter()
        .map(|p| PropertyInfo {
            property_type: resolver.try_resolve_type(&p.type_syntax),
            name: p.name.clone(),
            declaring_type: type_info.clone(),
            node: p.node,
            visibility: Visibility::Public,
        })
        .collect();
    let _ = type_info.properties.set(properties);

    let indexers = decl
        .indexers
        .iter()
        .map(|i| IndexerInfo {
            element_type: resolver.try_resolve_type(&i.type_syntax),
            parameters: resolve_parameters(file, &resolver, &i.parameters),
            declaring_type: type_info.clone(),
            node: i.node,
            visibility: Visibility::Public,
        })
        .collect();
    let _ = type_info.indexers.set(indexers);

    let constructors = decl
        .constructors
        .iter()
        .map(|c| ConstructorInfo {
            parameters: resolve_parameters(file, &resolver, &c.parameters),
            declaring_type: type_info.clone(),
            node: c.node,
            visibility: Visibility::Public,
        })
        .collect();
    let _ = type_info.constructors.set(constructors);
}

fn resolve_field(file: &SourceFile, resolver: &Resolver, declaring_type: &Arc<TypeInfo>, field: &FieldSyntax) -> Vec<FieldInfo> {
    let (visibility, modifiers) = process_field_modifiers(file, &field.modifiers);
    let field_type = resolver.try_resolve_type(&field.type_syntax);
    field
        .declarators
        .iter()
        .map(|declarator| FieldInfo {
            field_type: field_type.clone(),
            name: declarator.name.clone(),
            declaring_type: declaring_type.clone(),
            node: field.node,
            modifiers: modifiers.clone(),
            visibility,
        })
        .collect()
}

fn process_field_modifiers(file: &SourceFile, modifiers: &[ModifierToken]) -> (Visibility, Vec<FieldModifier>) {
    let mut visibility = Visibility::Public;
    let mut out = Vec::new();
    let mut readonly = false;
    let mut static_ = false;
    let mut const_ = false;
    for modifier in modifiers {
        match modifier.keyword {
            TokenKind::Public => visibility = Visibility::Public,
            TokenKind::Private => visibility = Visibility::Private,
            TokenKind::Internal => visibility = Visibility::Internal,
            TokenKind::Export => visibility = Visibility::Export,
            TokenKind::ReadOnly => {
                readonly = true;
                out.push(FieldModifier::Readonly);
            }
            TokenKind::Static => {
                static_ = true;
                out.push(FieldModifier::Static);
            }
            TokenKind::Const => {
                const_ = true;
                out.push(FieldModifier::Const);
            }
            TokenKind::Ref | TokenKind::Protected | TokenKind::Abstract | TokenKind::Virtual | TokenKind::Override | TokenKind::Sealed => {
                file.diagnostics.report(ErrorCode::InvalidModifierForFieldDeclaration, modifier.span);
            }
            _ => {}
        }
        if const_ && (static_ || readonly) {
            file.diagnostics.report(ErrorCode::MultipleModifiers, modifier.span);
        }
    }
    (visibility, out)
}

/// Resolves a method declaration, materializing one `MethodInfo` per
/// default-parameter overload (§3 GLOSSARY, §8 property 7). Parameter
/// ordering violations (`ERR_OptionalParameterOrder`) suppress overload
/// generation for that method, per scenario G.
fn resolve_method(file: &SourceFile, resolver: &Resolver, declaring_type: &Arc<TypeInfo>, method: &MethodSyntax) -> Vec<MethodInfo> {
    let (visibility, modifiers) = process_method_modifiers(file, &method.modifiers);
    let return_type = resolver.try_resolve_type(&method.return_type);
    let all_parameters: Vec<ParameterInfo> = resolve_parameters(file, resolver, &method.parameters);

    let mut seen_default = false;
    let mut order_ok = true;
    let mut default_count = 0;
    for param in &method.parameters {
        if param.has_default_value {
            seen_default = true;
            default_count += 1;
        } else if seen_default {
            file.diagnostics.report(ErrorCode::OptionalParameterOrder, param.span);
            order_ok = false;
        }
    }

    let shared: Arc<[ParameterInfo]> = all_parameters.into();
    let total = shared.len();
    let overload_count = if order_ok { default_count + 1 } else { 1 };

    (0..overload_count)
        .map(|slot| MethodInfo {
            declaring_type: declaring_type.clone(),
            all_parameters: shared.clone(),
            parameter_count: total - slot,
            node: method.node,
            return_type: return_type.clone(),
            name: method.name.clone(),
            modifiers: modifiers.clone(),
            visibility,
            is_default_parameter_overload: slot != 0,
        })
        .collect()
}

fn process_method_modifiers(file: &SourceFile, modifiers: &[ModifierToken]) -> (Visibility, Vec<MethodModifier>) {
    let mut visibility = Visibility::Public;
    let mut out = Vec::new();
    // §4.7: every pair among {Override, Sealed, Virtual, Abstract, Static} is
    // mutually exclusive in this system (§9 resolves the original's
    // ambiguous fall-through in favor of strict exclusion).
    for modifier in modifiers {
        match modifier.keyword {
            TokenKind::Public => visibility = Visibility::Public,
            TokenKind::Private => visibility = Visibility::Private,
            TokenKind::Internal => visibility = Visibility::Internal,
            TokenKind::Export => visibility = Visibility::Export,
            TokenKind::Override => out.push(MethodModifier::Override),
            TokenKind::Sealed => out.push(MethodModifier::Sealed),
            TokenKind::Abstract => out.push(MethodModifier::Abstract),
            TokenKind::Virtual => out.push(MethodModifier::Virtual),
            TokenKind::Static => out.push(MethodModifier::Static),
            TokenKind::ReadOnly | TokenKind::Const | TokenKind::Ref | TokenKind::Protected => {
                file.diagnostics.report(ErrorCode::InvalidModifierForMethodDeclaration, modifier.span);
            }
            _ => {}
        }
    }
    if out.len() > 1 {
        file.diagnostics.report(ErrorCode::MultipleModifiers, modifiers.first().map(|m| m.span).unwrap_or(alchemy_data::Span::synthetic()));
    }
    (visibility, out)
}

fn resolve_parameters(file: &SourceFile, resolver: &Resolver, parameters: &[ParameterSyntax]) -> Vec<ParameterInfo> {
    let mut seen_names: Vec<&str> = Vec::new();
    parameters
        .iter()
        .map(|param| {
            if seen_names.contains(&param.name.as_str()) {
                file.diagnostics.report(ErrorCode::DuplicateParameterName, param.span);
            } else {
                seen_names.push(&param.name);
            }
            ParameterInfo {
                param_type: resolver.try_resolve_type(&param.type_syntax),
                name: param.name.clone(),
                modifiers: process_parameter_modifiers(file, &param.modifiers),
                node: param.node,
            }
        })
        .collect()
}

fn process_parameter_modifiers(file: &SourceFile, modifiers: &[ModifierToken]) -> Vec<ParameterModifier> {
    let mut out = Vec::new();
    // {Ref, Out, Readonly} are pairwise exclusive; Temp (params) is orthogonal.
    let mut exclusive_count = 0;
    for modifier in modifiers {
        match modifier.keyword {
            TokenKind::Ref => {
                exclusive_count += 1;
                out.push(ParameterModifier::Ref);
            }
            TokenKind::Out => {
                exclusive_count += 1;
                out.push(ParameterModifier::Out);
            }
            TokenKind::ReadOnly => {
                exclusive_count += 1;
                out.push(ParameterModifier::Readonly);
            }
            TokenKind::Params => out.push(ParameterModifier::Temp),
            _ => {
                file.diagnostics.report(ErrorCode::InvalidModifierForParameterDeclaration, modifier.span);
            }
        }
    }
    if exclusive_count > 1 {
        file.diagnostics.report(ErrorCode::MultipleModifiers, modifiers.first().map(|m| m.span).unwrap_or(alchemy_data::Span::synthetic()));
    }
    out
}

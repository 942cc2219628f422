//! §4.1 Naming: deterministic fully-qualified name construction. The FQN is
//! the single cache key used by `TypeTable`; any sugar (aliases, contextual
//! keywords) must already be resolved to a canonical form before a lookup.

const GLOBAL_NAMESPACE: &str = "global";

/// `ns + "::" + name` with a `"$" + arity` suffix when `generic_arity > 0`.
/// An empty namespace becomes the literal `"global"`.
pub fn make_fully_qualified_name(namespace: &str, name: &str, generic_arity: usize) -> String {
    let ns = if namespace.is_empty() { GLOBAL_NAMESPACE } else { namespace };
    let mut out = String::with_capacity(ns.len() + 2 + name.len() + 4);
    out.push_str(ns);
    out.push_str("::");
    out.push_str(name);
    if generic_arity > 0 {
        out.push('$');
        out.push_str(&generic_arity.to_string());
    }
    out
}

/// §3 invariant 5: a `GenericArgumentDefinition`'s FQN is
/// `<declaringFqn>_<argName>[<index>]`.
pub fn make_generic_arg_name(declaring_fqn: &str, arg_name: &str, index: usize) -> String {
    format!("{declaring_fqn}_{arg_name}[{index}]")
}

/// The closed-generic FQN: the open type's FQN truncated at the first `<`
/// (or kept whole if there is none), followed by `<arg1,...,argN>`.
pub fn make_closed_generic_name<'a>(open_fqn: &str, arg_fqns: impl Iterator<Item = &'a str>) -> String {
    let base = match open_fqn.find('<') {
        Some(idx) => &open_fqn[..idx],
        None => open_fqn,
    };
    let mut out = String::from(base);
    out.push('<');
    let mut first = true;
    for arg in arg_fqns {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(arg);
    }
    out.push('>');
    out
}

/// §3 invariant 4: `typeName = &fullyQualifiedName[namespaceLen + 2]`, i.e.
/// the simple name past the `"::"` separator. Falls back to the whole
/// string for a malformed FQN (should not happen for well-formed input).
pub fn type_name_of(fqn: &str) -> &str {
    match fqn.rfind("::") {
        Some(idx) => &fqn[idx + 2..],
        None => fqn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_namespace_becomes_global() {
        assert_eq!(make_fully_qualified_name("", "Foo", 0), "global::Foo");
    }

    #[test]
    fn generic_arity_appends_dollar_count() {
        assert_eq!(make_fully_qualified_name("N::M", "Box", 1), "N::M::Box$1");
    }

    #[test]
    fn generic_arg_name_matches_scenario_b() {
        assert_eq!(make_generic_arg_name("N::M::Box$1", "T", 0), "N::M::Box$1_T[0]");
    }

    #[test]
    fn closed_generic_name_truncates_at_first_angle_bracket() {
        let name = make_closed_generic_name("N::M::Box$1", vec!["BuiltIn::Int32"].into_iter());
        assert_eq!(name, "N::M::Box$1<BuiltIn::Int32>");
    }

    #[test]
    fn type_name_strips_namespace_prefix() {
        assert_eq!(type_name_of("global::Foo"), "Foo");
        assert_eq!(type_name_of("N::M::Box$1"), "Box$1");
    }
}

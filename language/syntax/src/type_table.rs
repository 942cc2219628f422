//! §4.3 TypeTable: the thread-safe, hash-indexed directory of every live
//! `TypeInfo`, plus on-demand materialization of closed generic
//! instantiations. Built as an MSI-style open-addressed table (FNV-1a hash,
//! power-of-two capacity, `lookup32`'s step-based probe sequence) the way
//! the original `TypeResolutionMap` is, translated from raw-pointer/arena
//! ownership into `Arc`-based Rust ownership.
use std::collections::HashMap;
use std::sync::Arc;

use alchemy_data::{Diagnostics, ErrorCode, Span};
use parking_lot::RwLock;

use crate::naming;
use crate::types::{
    BuiltInTypeName, ConstructorInfo, FieldInfo, IndexerInfo, MethodInfo, PropertyInfo, ResolvedType, ResolvedTypeFlags,
    TypeClass, TypeInfo, TypeInfoFlags, Visibility,
};

const INITIAL_EXPONENT: u32 = 16;

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c9dc5;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x01000193);
    }
    hash
}

/// The MSI probe step: given the full hash and the table's size exponent,
/// advance from `idx` to the next candidate slot.
fn msi_lookup32(hash: u32, exponent: u32, idx: u32) -> u32 {
    let mask = (1u32 << exponent) - 1;
    let step = (hash >> (32 - exponent)) | 1;
    idx.wrapping_add(step) & mask
}

struct TableInner {
    exponent: u32,
    slots: Vec<Option<Arc<TypeInfo>>>,
    hashes: Vec<u32>,
    size: usize,
    longest_entry_size: usize,
}

impl TableInner {
    fn with_exponent(exponent: u32) -> Self {
        let capacity = 1usize << exponent;
        Self { exponent, slots: vec![None; capacity], hashes: vec![0; capacity], size: 0, longest_entry_size: 0 }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn mask(&self) -> u32 {
        (self.capacity() as u32) - 1
    }

    /// Probes for `fqn`, returning the existing entry if present, or the
    /// first empty slot index if not.
    fn probe(&self, fqn: &str, hash: u32) -> ProbeResult {
        let mut idx = hash & self.mask();
        loop {
            match &self.slots[idx as usize] {
                Some(existing) if existing.fully_qualified_name == fqn => return ProbeResult::Found(existing.clone()),
                Some(_) => idx = msi_lookup32(hash, self.exponent, idx),
                None => return ProbeResult::Empty(idx as usize),
            }
        }
    }

    fn insert_at(&mut self, idx: usize, hash: u32, type_info: Arc<TypeInfo>) {
        self.longest_entry_size = self.longest_entry_size.max(type_info.fully_qualified_name.len());
        self.slots[idx] = Some(type_info);
        self.hashes[idx] = hash;
        self.size += 1;
    }

    fn resize_if_needed(&mut self) {
        if self.size <= self.capacity() / 2 {
            return;
        }
        let new_exponent = self.exponent + 1;
        let mut rehashed = TableInner::with_exponent(new_exponent);
        for slot in self.slots.drain(..) {
            if let Some(entry) = slot {
                let hash = fnv1a(entry.fully_qualified_name.as_bytes());
                let idx = match rehashed.probe(&entry.fully_qualified_name, hash) {
                    ProbeResult::Empty(idx) => idx,
                    ProbeResult::Found(_) => unreachable!("rehash cannot find a duplicate FQN"),
                };
                rehashed.insert_at(idx, hash, entry);
            }
        }
        *self = rehashed;
    }
}

enum ProbeResult {
    Found(Arc<TypeInfo>),
    Empty(usize),
}

pub struct TypeTable {
    inner: RwLock<TableInner>,
    pub builtin: HashMap<BuiltInTypeName, Arc<TypeInfo>>,
}

impl TypeTable {
    /// Constructs the table and eagerly materializes every built-in type's
    /// `TypeInfo`, matching §4.8: "resolved eagerly before any job runs."
    pub fn new() -> Self {
        let mut builtin = HashMap::new();
        for &name in BuiltInTypeName::ALL {
            let fqn = name.to_fully_qualified_name();
            let mut flags = TypeInfoFlags::empty();
            if name.is_primitive() {
                flags |= TypeInfoFlags::IS_PRIMITIVE;
            }
            let info = Arc::new(TypeInfo {
                type_class: if name == BuiltInTypeName::Void { TypeClass::Void } else { TypeClass::Struct },
                flags,
                visibility: Visibility::Public,
                built_in_type_name: Some(name),
                fully_qualified_name: fqn,
                generic_arg_simple_name: None,
                declaring_file: None,
                syntax_node: None,
                span: Span::synthetic(),
                base_types: Default::default(),
                fields: Default::default(),
                methods: Default::default(),
                properties: Default::default(),
                indexers: Default::default(),
                constructors: Default::default(),
                generic_arguments: Vec::new(),
                constraints: Default::default(),
            });
            let _ = info.base_types.set(Vec::new());
            let _ = info.fields.set(Vec::new());
            let _ = info.methods.set(Vec::new());
            let _ = info.properties.set(Vec::new());
            let _ = info.indexers.set(Vec::new());
            let _ = info.constructors.set(Vec::new());
            let _ = info.constraints.set(Vec::new());
            builtin.insert(name, info);
        }

        let table = Self { inner: RwLock::new(TableInner::with_exponent(INITIAL_EXPONENT)), builtin };
        for info in table.builtin.values() {
            table.add_unlocked(info.clone());
        }
        table
    }

    /// Read-only lookup. Safe to call concurrently with other readers;
    /// callers are responsible for external synchronization with writers
    /// (i.e. only call this once Gather's barrier has released, or while
    /// holding the understanding that `makeGenericType` re-probes under lock).
    pub fn try_resolve(&self, fqn: &str) -> Option<Arc<TypeInfo>> {
        let hash = fnv1a(fqn.as_bytes());
        let guard = self.inner.read();
        match guard.probe(fqn, hash) {
            ProbeResult::Found(info) => Some(info),
            ProbeResult::Empty(_) => None,
        }
    }

    /// Acquires the table's lock, then inserts. Returns `true` if added or
    /// already present as the identical instance; `false` on a collision
    /// with a distinct same-name entry (the caller reports a duplicate-type
    /// diagnostic).
    pub fn add_locked(&self, type_info: Arc<TypeInfo>) -> bool {
        let mut guard = self.inner.write();
        Self::add_to(&mut guard, type_info)
    }

    /// Same as `add_locked` but without locking — only for single-threaded
    /// phases (table construction, sequential Gather).
    pub fn add_unlocked(&self, type_info: Arc<TypeInfo>) -> bool {
        // SAFETY-by-contract: only called while no other thread can observe
        // the table, so taking the write lock here is for type-state
        // uniformity, not genuine contention.
        let mut guard = self.inner.write();
        Self::add_to(&mut guard, type_info)
    }

    fn add_to(inner: &mut TableInner, type_info: Arc<TypeInfo>) -> bool {
        let fqn = type_info.fully_qualified_name.clone();
        let hash = fnv1a(fqn.as_bytes());
        match inner.probe(&fqn, hash) {
            ProbeResult::Found(existing) => Arc::ptr_eq(&existing, &type_info),
            ProbeResult::Empty(idx) => {
                inner.insert_at(idx, hash, type_info);
                inner.resize_if_needed();
                true
            }
        }
    }

    /// §4.3 `makeGenericType`: materialize (or look up) the closed
    /// instantiation of `open_type` applied to `args`.
    pub fn make_generic_type(&self, open_type: &Arc<TypeInfo>, args: Vec<ResolvedType>, diagnostics: &Diagnostics, span: Span) -> ResolvedType {
        let arg_fqns: Vec<String> = args
            .iter()
            .map(|a| a.type_info.as_ref().map(|t| t.fully_qualified_name.clone()).unwrap_or_default())
            .collect();
        let lookup_fqn = naming::make_closed_generic_name(&open_type.fully_qualified_name, arg_fqns.iter().map(String::as_str));

        {
            let hash = fnv1a(lookup_fqn.as_bytes());
            let guard = self.inner.read();
            if let ProbeResult::Found(existing) = guard.probe(&lookup_fqn, hash) {
                return ResolvedType::new(existing);
            }
        }

        let replacements: HashMap<String, ResolvedType> = open_type
            .generic_arguments
            .iter()
            .zip(args.iter())
            .filter_map(|(param, arg)| param.type_info.as_ref().map(|p| (p.type_name().to_string(), arg.clone())))
            .collect();

        let all_concrete = args.iter().all(|a| match &a.type_info {
            Some(t) => !t.flags.contains(TypeInfoFlags::IS_GENERIC_ARGUMENT_DEFINITION),
            None => true,
        });

        let mut flags = open_type.flags;
        if all_concrete {
            flags.remove(TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION);
            flags.insert(TypeInfoFlags::INSTANTIATED_GENERIC);
        }

        let closed = Arc::new(TypeInfo {
            type_class: open_type.type_class,
            flags,
            visibility: open_type.visibility,
            built_in_type_name: open_type.built_in_type_name,
            fully_qualified_name: lookup_fqn.clone(),
            generic_arg_simple_name: None,
            declaring_file: open_type.declaring_file,
            syntax_node: open_type.syntax_node,
            span,
            base_types: Default::default(),
            fields: Default::default(),
            methods: Default::default(),
            properties: Default::default(),
            indexers: Default::default(),
            constructors: Default::default(),
            generic_arguments: args,
            constraints: Default::default(),
        });

        let _ = closed.base_types.set(
            open_type.base_types().iter().map(|t| self.recursive_resolve_generics(t, &replacements, diagnostics, span)).collect(),
        );
        let _ = closed.fields.set(
            open_type
                .fields()
                .iter()
                .map(|f| FieldInfo {
                    field_type: self.recursive_resolve_generics(&f.field_type, &replacements, diagnostics, span),
                    name: f.name.clone(),
                    declaring_type: closed.clone(),
                    node: f.node,
                    modifiers: f.modifiers.clone(),
                    visibility: f.visibility,
                })
                .collect(),
        );
        let _ = closed.methods.set(
            open_type
                .methods()
                .iter()
                .map(|m| MethodInfo {
                    declaring_type: closed.clone(),
                    all_parameters: m
                        .all_parameters
                        .iter()
                        .map(|p| crate::types::ParameterInfo {
                            param_type: self.recursive_resolve_generics(&p.param_type, &replacements, diagnostics, span),
                            name: p.name.clone(),
                            modifiers: p.modifiers.clone(),
                            node: p.node,
                        })
                        .collect(),
                    parameter_count: m.parameter_count,
                    node: m.node,
                    return_type: self.recursive_resolve_generics(&m.return_type, &replacements, diagnostics, span),
                    name: m.name.clone(),
                    modifiers: m.modifiers.clone(),
                    visibility: m.visibility,
                    is_default_parameter_overload: m.is_default_parameter_overload,
                })
                .collect(),
        );
        let _ = closed.properties.set(
            open_type
                .properties()
                .iter()
                .map(|p| PropertyInfo {
                    property_type: self.recursive_resolve_generics(&p.property_type, &replacements, diagnostics, span),
                    name: p.name.clone(),
                    declaring_type: closed.clone(),
                    node: p.node,
                    visibility: p.visibility,
                })
                .collect(),
        );
        let _ = closed.indexers.set(
            open_type
                .indexers()
                .iter()
                .map(|i| IndexerInfo {
                    element_type: self.recursive_resolve_generics(&i.element_type, &replacements, diagnostics, span),
                    parameters: i.parameters.clone(),
                    declaring_type: closed.clone(),
                    node: i.node,
                    visibility: i.visibility,
                })
                .collect(),
        );
        let _ = closed.constructors.set(
            open_type
                .constructors()
                .iter()
                .map(|c| ConstructorInfo { parameters: c.parameters.clone(), declaring_type: closed.clone(), node: c.node, visibility: c.visibility })
                .collect(),
        );

        let mut guard = self.inner.write();
        let hash = fnv1a(lookup_fqn.as_bytes());
        match guard.probe(&lookup_fqn, hash) {
            // A racer won; our allocation is simply dropped — `Arc` reclaims
            // it, unlike the original's manual "free the loser" step.
            ProbeResult::Found(existing) => ResolvedType::new(existing),
            ProbeResult::Empty(idx) => {
                guard.insert_at(idx, hash, closed.clone());
                guard.resize_if_needed();
                ResolvedType::new(closed)
            }
        }
    }

    /// §4.3 `recursiveResolveGenerics`.
    pub fn recursive_resolve_generics(
        &self,
        input: &ResolvedType,
        replacements: &HashMap<String, ResolvedType>,
        diagnostics: &Diagnostics,
        span: Span,
    ) -> ResolvedType {
        let Some(type_info) = &input.type_info else {
            return input.clone();
        };
        if type_info.flags.contains(TypeInfoFlags::IS_GENERIC_ARGUMENT_DEFINITION) {
            return replacements
                .get(type_info.type_name())
                .cloned()
                .unwrap_or_else(|| panic!("generic argument {} missing from replacement map", type_info.type_name()));
        }
        if type_info.flags.contains(TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION) {
            let resolved_args: Vec<ResolvedType> =
                type_info.generic_arguments.iter().map(|arg| self.recursive_resolve_generics(arg, replacements, diagnostics, span)).collect();
            let instantiated = self.make_generic_type(type_info, resolved_args, diagnostics, span);
            return instantiated.with_flag(input.flags);
        }
        input.clone()
    }

    /// Every live `TypeInfo`, in no particular slot order.
    pub fn get_values(&self) -> Vec<Arc<TypeInfo>> {
        self.inner.read().slots.iter().flatten().cloned().collect()
    }

    /// `getValues()` filtered to omit generic-argument and open-generic
    /// definitions — the set downstream passes actually compile against.
    pub fn get_concrete_types(&self) -> Vec<Arc<TypeInfo>> {
        self.get_values()
            .into_iter()
            .filter(|t| {
                !t.flags.contains(TypeInfoFlags::IS_GENERIC_ARGUMENT_DEFINITION) && !t.flags.contains(TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION)
            })
            .collect()
    }

    /// Replaces every live entry's slot with the result of `f`, rehashing
    /// under lock by each FQN's current (possibly now-stale) hash. Used by
    /// degeneric-style downstream passes; kept here since it's a TypeTable
    /// operation per §4.3, even though this crate's scope ends at Member.
    pub fn replace_values(&self, mut f: impl FnMut(Arc<TypeInfo>) -> Arc<TypeInfo>) {
        let mut guard = self.inner.write();
        for slot in guard.slots.iter_mut() {
            if let Some(entry) = slot.take() {
                *slot = Some(f(entry));
            }
        }
    }

    pub fn get_longest_entry_size(&self) -> usize {
        self.inner.read().longest_entry_size
    }

    pub fn len(&self) -> usize {
        self.inner.read().size
    }

    /// The stable textual dump, sorted by FQN byte order — the golden
    /// artifact for integration tests (§6).
    pub fn dump_type_table(&self) -> String {
        let mut values = self.get_values();
        values.sort_by(|a, b| a.fully_qualified_name.as_bytes().cmp(b.fully_qualified_name.as_bytes()));
        let mut out = String::new();
        for t in values {
            out.push_str(&t.fully_qualified_name);
            out.push_str(&format!(" [{:?}]\n", t.type_class));
        }
        out
    }

    pub fn report_duplicate(&self, diagnostics: &Diagnostics, span: Span) {
        diagnostics.report(ErrorCode::DuplicateIdentifierInScope, span);
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

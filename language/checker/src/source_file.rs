use std::sync::{Arc, OnceLock};

use alchemy_ast::SyntaxTree;
use alchemy_data::{Diagnostics, FileId};
use alchemy_syntax::TypeInfo;
use parking_lot::Mutex;

/// §3 `SourceFile`: owns the parsed tree and a diagnostics sink; receives
/// `namespace_name`/`using_directives`/`declared_types` as the pipeline runs.
/// Each field that's "written once during a phase, read after that phase's
/// barrier" is a `OnceLock` so the Base/Member read path needs no lock at all.
pub struct SourceFile {
    pub file: FileId,
    pub path: String,
    pub tree: SyntaxTree,
    pub diagnostics: Diagnostics,
    pub namespace_name: OnceLock<String>,
    pub using_directives: OnceLock<Vec<String>>,
    pub declared_types: OnceLock<Vec<Arc<TypeInfo>>>,
    /// Closed generics materialized from an open type this file declares,
    /// appended by `make_generic_type` callers during Base/Member.
    pub generic_instances: Mutex<Vec<Arc<TypeInfo>>>,
}

impl SourceFile {
    pub fn new(file: FileId, path: String, tree: SyntaxTree) -> Self {
        Self {
            file,
            path,
            tree,
            diagnostics: Diagnostics::new(),
            namespace_name: OnceLock::new(),
            using_directives: OnceLock::new(),
            declared_types: OnceLock::new(),
            generic_instances: Mutex::new(Vec::new()),
        }
    }

    pub fn namespace_name(&self) -> &str {
        self.namespace_name.get().map(String::as_str).unwrap_or("")
    }

    /// The file's own namespace is the first implicit using (GLOSSARY).
    pub fn using_directives(&self) -> &[String] {
        self.using_directives.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn declared_types(&self) -> &[Arc<TypeInfo>] {
        self.declared_types.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

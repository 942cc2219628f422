//! §5 Concurrency & resource model: fan out each of Gather/Base/Member
//! across a rayon thread pool, one unit of work per source file, with a
//! barrier between phases. `rayon::scope` gives exactly this: a fork-join
//! region that blocks until every spawned closure finishes before the
//! caller proceeds to the next phase.
use std::sync::Arc;

use alchemy_ast::SyntaxTree;
use alchemy_checker::SourceFile;
use alchemy_data::{FileId, ParallelSettings};
use alchemy_syntax::TypeTable;

/// One named input to the pipeline: a parsed tree plus the display path
/// diagnostics should print.
pub struct InputFile {
    pub file: FileId,
    pub path: String,
    pub tree: SyntaxTree,
}

/// Runs Gather, Base, and Member in sequence, each phase fully fanned out
/// across the configured thread pool with a barrier before the next phase
/// starts. Returns the final `TypeTable` and the per-file state (for
/// diagnostics reporting), in input order.
pub fn run_pipeline(inputs: Vec<InputFile>, settings: &ParallelSettings) -> (TypeTable, Vec<Arc<SourceFile>>) {
    let table = TypeTable::new();
    let files: Vec<Arc<SourceFile>> = inputs.into_iter().map(|input| Arc::new(SourceFile::new(input.file, input.path, input.tree))).collect();

    if settings.single_threaded {
        for file in &files {
            alchemy_checker::gather::run(file, &table);
        }
        for file in &files {
            alchemy_checker::base::run(file, &table);
        }
        alchemy_checker::base::detect_cycles(&files, &table);
        for file in &files {
            alchemy_checker::member::run(file, &table);
        }
        return (table, files);
    }

    let pool = build_pool(settings);
    pool.install(|| {
        rayon::scope(|scope| {
            for file in &files {
                let table = &table;
                scope.spawn(move |_| alchemy_checker::gather::run(file, table));
            }
        });
        rayon::scope(|scope| {
            for file in &files {
                let table = &table;
                scope.spawn(move |_| alchemy_checker::base::run(file, table));
            }
        });
        alchemy_checker::base::detect_cycles(&files, &table);
        rayon::scope(|scope| {
            for file in &files {
                let table = &table;
                scope.spawn(move |_| alchemy_checker::member::run(file, table));
            }
        });
    });

    (table, files)
}

fn build_pool(settings: &ParallelSettings) -> rayon::ThreadPool {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(count) = settings.thread_count {
        builder = builder.num_threads(count);
    }
    builder.build().expect("failed to build worker thread pool")
}

#[cfg(test)]
mod tests {
    use alchemy_ast::{NamespaceDeclSyntax, SyntaxNodeId, TopLevelItem, TypeClassSyntax, TypeDeclSyntax};
    use alchemy_data::Span;

    use super::*;

    fn empty_type(name: &str, class: TypeClassSyntax) -> TypeDeclSyntax {
        TypeDeclSyntax {
            type_class: class,
            name: name.to_string(),
            modifiers: Vec::new(),
            generic_parameters: Vec::new(),
            base_list: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            indexers: Vec::new(),
            constructors: Vec::new(),
            span: Span::synthetic(),
            node: SyntaxNodeId(0),
        }
    }

    #[test]
    fn scenario_a_basic_struct_global_namespace() {
        let tree = SyntaxTree { file: FileId(0), items: vec![TopLevelItem::Type(empty_type("Foo", TypeClassSyntax::Struct))] };
        let settings = ParallelSettings { single_threaded: true, thread_count: None };
        let (table, files) = run_pipeline(vec![InputFile { file: FileId(0), path: "foo.alch".to_string(), tree }], &settings);

        let foo = table.try_resolve("global::Foo").expect("Foo should resolve");
        assert_eq!(foo.fully_qualified_name, "global::Foo");
        assert!(files[0].diagnostics.is_empty());
    }

    #[test]
    fn namespace_after_using_is_rejected() {
        let tree = SyntaxTree {
            file: FileId(0),
            items: vec![
                TopLevelItem::Type(empty_type("Foo", TypeClassSyntax::Struct)),
                TopLevelItem::Namespace(NamespaceDeclSyntax { namespace: "N".to_string(), span: Span::synthetic() }),
            ],
        };
        let settings = ParallelSettings { single_threaded: true, thread_count: None };
        let (_table, files) = run_pipeline(vec![InputFile { file: FileId(0), path: "foo.alch".to_string(), tree }], &settings);
        assert_eq!(files[0].diagnostics.len(), 1);
    }

    #[test]
    fn using_after_declaration_is_rejected() {
        use alchemy_ast::UsingDirectiveSyntax;
        use alchemy_data::ErrorCode;

        let tree = SyntaxTree {
            file: FileId(0),
            items: vec![
                TopLevelItem::Using(UsingDirectiveSyntax { namespace: "N".to_string(), span: Span::synthetic() }),
                TopLevelItem::Type(empty_type("Foo", TypeClassSyntax::Struct)),
                TopLevelItem::Using(UsingDirectiveSyntax { namespace: "M".to_string(), span: Span::synthetic() }),
            ],
        };
        let settings = ParallelSettings { single_threaded: true, thread_count: None };
        let (_table, files) = run_pipeline(vec![InputFile { file: FileId(0), path: "foo.alch".to_string(), tree }], &settings);
        let diagnostics = files[0].diagnostics.snapshot();
        assert!(diagnostics.iter().any(|d| d.code == ErrorCode::UsingsMustComeBeforeDeclarations));
    }
}

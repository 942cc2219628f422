use std::fmt::Debug;

/// Source spans, file identity, and the keyword table.
pub mod tokens;

/// The diagnostic taxonomy and per-file sink.
pub mod error;

pub use error::{Diagnostic, Diagnostics, ErrorCode};
pub use tokens::{match_keyword, FileId, Span, TokenKind};

/// One already-lexed-and-parsed input to the pipeline. Parsing itself is out
/// of scope; this trait is the opaque getter surface the semantic layer reads
/// through, matching the shape of the upstream `Readable`/`SourceSet` split.
pub trait Readable: Send + Sync {
    /// The file's full contents, for diagnostic line extraction.
    fn contents(&self) -> &str;

    /// A display path used in diagnostic headers.
    fn path(&self) -> &str;

    /// Stable identity assigned by the driver, independent of compile order.
    fn file_id(&self) -> FileId;
}

/// A set of sources handed to one compilation run.
pub trait SourceSet: Debug + Send + Sync {
    fn get_files(&self) -> Vec<Box<dyn Readable>>;
}

/// Whether the type-table dump is requested, and how many worker threads the
/// fork-join phases should use. Constructed directly in code or from CLI
/// flags — this system has no on-disk config file format.
pub struct ParallelSettings {
    /// Number of rayon worker threads; `None` defers to rayon's default (num_cpus).
    pub thread_count: Option<usize>,
    /// Whether Gather may run as a single-threaded pass (useful for tiny inputs/tests).
    pub single_threaded: bool,
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self { thread_count: None, single_threaded: false }
    }
}

/// Top-level settings for one run of the pipeline, analogous to the upstream
/// `RunnerSettings`/`CompilerArguments` pair.
pub struct RunnerSettings {
    pub sources: Vec<Box<dyn SourceSet>>,
    pub parallel: ParallelSettings,
    /// Emit `TypeTable::dump` to stdout after the Member phase completes.
    pub dump_type_table: bool,
}

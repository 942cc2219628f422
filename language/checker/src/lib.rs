//! The per-file jobs (§4.5-§4.7) and the resolver (§4.4) they share.

pub mod base;
pub mod gather;
pub mod member;
pub mod resolver;
pub mod source_file;

pub use resolver::Resolver;
pub use source_file::SourceFile;

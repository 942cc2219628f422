use std::fs;
use std::path::{Path, PathBuf};

use alchemy_data::{FileId, Readable, SourceSet};

/// A directory of JSON `SyntaxTree` fixtures, read recursively — the
/// fixture-backed stand-in for the upstream `SourceSet` that walks a
/// directory of `.rv` source files. Files are assigned `FileId`s in
/// directory-walk order at `get_files` time.
#[derive(Debug)]
pub struct FsSourceSet {
    pub root: PathBuf,
}

impl SourceSet for FsSourceSet {
    fn get_files(&self) -> Vec<Box<dyn Readable>> {
        let mut paths = Vec::new();
        read_recursive(&self.root, &mut paths);
        paths.sort();
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let contents = fs::read_to_string(&path)
                    .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
                Box::new(FsReadable { path, contents, file: FileId(index as u32) }) as Box<dyn Readable>
            })
            .collect()
    }
}

fn read_recursive(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir).unwrap_or_else(|err| panic!("failed to read directory {}: {err}", dir.display()));
    for entry in entries {
        let entry = entry.expect("directory entry");
        let path = entry.path();
        if path.is_dir() {
            read_recursive(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            out.push(path);
        }
    }
}

struct FsReadable {
    path: PathBuf,
    contents: String,
    file: FileId,
}

impl Readable for FsReadable {
    fn contents(&self) -> &str {
        &self.contents
    }

    fn path(&self) -> &str {
        self.path.to_str().expect("non-UTF8 fixture path")
    }

    fn file_id(&self) -> FileId {
        self.file
    }
}

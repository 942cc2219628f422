use std::fs;
use std::path::Path;

use alchemy_ast::SyntaxTree;
use alchemy_data::FileId;
use alchemy_runner::{run_pipeline, InputFile};
use anyhow::{Context, Result};

pub mod arguments;
pub mod source_set;

use arguments::Arguments;

fn main() -> Result<()> {
    let arguments = Arguments::from_arguments(std::env::args());
    run(&arguments)
}

fn run(arguments: &Arguments) -> Result<()> {
    let settings = &arguments.runner_settings;

    let inputs = settings
        .sources
        .iter()
        .flat_map(|source_set| source_set.get_files())
        .enumerate()
        .map(|(index, readable)| load_input(FileId(index as u32), readable.path(), readable.contents()))
        .collect::<Result<Vec<_>>>()?;

    let (table, files) = run_pipeline(inputs, &settings.parallel);

    let mut error_count = 0;
    for file in &files {
        for diagnostic in file.diagnostics.snapshot() {
            error_count += 1;
            let source_line = source_line_for(&file.path, diagnostic.span.start.0);
            diagnostic.print(&file.path, &source_line);
        }
    }

    if settings.dump_type_table {
        print!("{}", table.dump_type_table());
    }

    if error_count > 0 {
        anyhow::bail!("{} diagnostic(s) reported", error_count);
    }
    Ok(())
}

/// Parses one already-read JSON `SyntaxTree` fixture. Parsing real `.alch`
/// source text is out of scope for this crate; fixtures stand in for a
/// front-end that would otherwise hand us this tree.
fn load_input(file: FileId, path: &str, contents: &str) -> Result<InputFile> {
    let mut tree: SyntaxTree = serde_json::from_str(contents).with_context(|| format!("parsing {path} as a syntax tree"))?;
    tree.file = file;
    Ok(InputFile { file, path: path.to_string(), tree })
}

/// Best-effort line lookup for diagnostic rendering: fixtures carry spans
/// but not source text, so this looks for a sibling `.alch` file sharing the
/// fixture's stem and falls back to an empty line if none exists.
fn source_line_for(fixture_path: &str, line: u32) -> String {
    let sibling = Path::new(fixture_path).with_extension("alch");
    fs::read_to_string(sibling).ok().and_then(|text| text.lines().nth(line.saturating_sub(1) as usize).map(str::to_string)).unwrap_or_default()
}

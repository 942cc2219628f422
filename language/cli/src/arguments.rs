use alchemy_data::{ParallelSettings, RunnerSettings, SourceSet};

use crate::source_set::FsSourceSet;

/// Hand-parsed `--flag value` / `--flag` command line, in the style of the
/// upstream driver's own argument reader (`language/cli/src/arguments.rs`):
/// no external parsing crate, just a pass over `env::args()`.
pub struct Arguments {
    pub runner_settings: RunnerSettings,
}

impl Arguments {
    pub fn from_arguments(mut args: impl Iterator<Item = String>) -> Self {
        args.next(); // running location

        let mut roots: Vec<Box<dyn SourceSet>> = Vec::new();
        let mut single_threaded = false;
        let mut thread_count = None;
        let mut dump_type_table = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--root" => {
                    let value = args.next().expect("--root requires a directory");
                    roots.push(Box::new(FsSourceSet { root: value.into() }));
                }
                "--single-threaded" => single_threaded = true,
                "--threads" => {
                    let value = args.next().expect("--threads requires a number");
                    thread_count = Some(value.parse().expect("--threads expects an integer"));
                }
                "--dump-type-table" => dump_type_table = true,
                other => panic!("Unknown argument: {}", other),
            }
        }

        if roots.is_empty() {
            panic!("Need at least one source root, pass it with \"--root <directory>\"");
        }

        Self {
            runner_settings: RunnerSettings {
                sources: roots,
                parallel: ParallelSettings { thread_count, single_threaded },
                dump_type_table,
            },
        }
    }
}

//! Command-line argument parsing for the `shc` binary.

use crate::BuildConfig;
use shc_ir::Backend;
use std::path::PathBuf;

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Build(BuildOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub config: BuildConfig,
    pub files: Vec<PathBuf>,
    /// Hierarchical span output instead of flat log lines.
    pub trace_tree: bool,
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config = BuildConfig::default();
    let mut files = Vec::new();
    let mut trace_tree = false;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-h" | "--help" | "help" => return Ok(Command::Help),
            "-V" | "--version" | "version" => return Ok(Command::Version),
            "-o" => {
                let Some(dir) = args.get(i + 1) else {
                    return Err("`-o` expects an output directory".to_string());
                };
                config.output_dir = PathBuf::from(dir);
                i += 1;
            }
            "--no-parallel" => config.parallel = false,
            "--no-reflect" => config.reflect = false,
            "--trace-tree" => trace_tree = true,
            _ => {
                if let Some(list) = arg.strip_prefix("--backend=") {
                    config.backends = parse_backends(list)?;
                } else if arg.starts_with('-') {
                    return Err(format!("unknown option `{arg}`"));
                } else {
                    files.push(PathBuf::from(arg));
                }
            }
        }
        i += 1;
    }

    if files.is_empty() {
        return Err("no input files".to_string());
    }
    Ok(Command::Build(BuildOptions {
        config,
        files,
        trace_tree,
    }))
}

/// `hlsl,glsl,metal` or `all`.
fn parse_backends(list: &str) -> Result<Vec<Backend>, String> {
    if list == "all" {
        return Ok(Backend::ALL.to_vec());
    }
    let backends = list
        .split(',')
        .filter(|name| !name.is_empty())
        .map(|name| Backend::from_name(name).ok_or_else(|| format!("unknown backend `{name}`")))
        .collect::<Result<Vec<_>, _>>()?;
    if backends.is_empty() {
        return Err("`--backend=` needs at least one backend".to_string());
    }
    Ok(backends)
}

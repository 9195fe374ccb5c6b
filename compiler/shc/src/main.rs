//! shc command-line driver.

use shc::cli::{parse_args, BuildOptions, Command};
use shc::{build_files, render, write_record, BuildError};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        Ok(Command::Help) => {
            print_usage();
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("shc {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Ok(Command::Build(options)) => {
            init_tracing(options.trace_tree);
            build(&options)
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// Log filter from `SHC_LOG`, falling back to `RUST_LOG`, then `warn`.
fn init_tracing(tree: bool) {
    let filter = EnvFilter::try_from_env("SHC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if tree {
        registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn build(options: &BuildOptions) -> ExitCode {
    let config = &options.config;
    let mut failed = 0usize;
    for outcome in build_files(&options.files, config) {
        let written = outcome.result.and_then(|record| write_record(&record, config));
        match written {
            Ok(paths) => {
                for path in paths {
                    println!("wrote {}", path.display());
                }
            }
            Err(BuildError::Compile(error)) => {
                failed += 1;
                eprint!("{}", render(&error, &outcome.source));
            }
            Err(error) => {
                failed += 1;
                eprintln!("error: {}: {error}", outcome.path.display());
            }
        }
    }
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        eprintln!("{failed} of {} file(s) failed", options.files.len());
        ExitCode::FAILURE
    }
}

fn print_usage() {
    println!("shc: compile shaders to HLSL, GLSL and Metal");
    println!();
    println!("Usage: shc [options] <file>...");
    println!();
    println!("Options:");
    println!("  --backend=<list>  Backends to build: hlsl,glsl,metal or all (default: all)");
    println!("  -o <dir>          Output directory (default: .)");
    println!("  --no-parallel     Compile files and backends sequentially");
    println!("  --no-reflect      Skip reflection and the .reflect.json manifest");
    println!("  --trace-tree      Hierarchical log output");
    println!("  -h, --help        Show this help message");
    println!("  -V, --version     Show the version");
    println!();
    println!("Logging is controlled by SHC_LOG (or RUST_LOG), e.g. SHC_LOG=shc_parse=trace");
}

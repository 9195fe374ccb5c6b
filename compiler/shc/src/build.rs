//! Batch builds over many shader files.

use crate::pipeline::compile_source;
use crate::record::ShaderRecord;
use crate::BuildConfig;
use rayon::prelude::*;
use shc_diagnostic::CompileError;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write `{}`: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize reflection: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Result of building one file. `source` is kept for error rendering.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub source: String,
    pub result: Result<ShaderRecord, BuildError>,
}

/// Shader name for a path: its file stem.
pub fn shader_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Read and compile one file.
#[tracing::instrument(level = "debug", skip(config))]
pub fn build_file(path: &Path, config: &BuildConfig) -> FileOutcome {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            return FileOutcome {
                path: path.to_path_buf(),
                source: String::new(),
                result: Err(BuildError::Read {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        }
    };
    let result = compile_source(&shader_name(path), &source, config)
        .map_err(|error| BuildError::Compile(error.with_file(path)));
    FileOutcome {
        path: path.to_path_buf(),
        source,
        result,
    }
}

/// Compile every file. A failing file does not stop the others; outcomes
/// come back in input order.
pub fn build_files(paths: &[PathBuf], config: &BuildConfig) -> Vec<FileOutcome> {
    let outcomes: Vec<FileOutcome> = if config.parallel {
        paths.par_iter().map(|path| build_file(path, config)).collect()
    } else {
        paths.iter().map(|path| build_file(path, config)).collect()
    };
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(files = outcomes.len(), failed, "build finished");
    outcomes
}

/// Write `<name>.shbin` (and `<name>.reflect.json` when reflection is on)
/// into the configured output directory. Returns the written paths.
pub fn write_record(record: &ShaderRecord, config: &BuildConfig) -> Result<Vec<PathBuf>, BuildError> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|source| BuildError::Write {
        path: dir.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(2);
    let shbin = dir.join(format!("{}.shbin", record.name));
    write(&shbin, &record.to_shbin())?;
    written.push(shbin);

    if config.reflect {
        let manifest = dir.join(format!("{}.reflect.json", record.name));
        let mut json = record.to_json()?;
        json.push('\n');
        write(&manifest, json.as_bytes())?;
        written.push(manifest);
    }
    Ok(written)
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    std::fs::write(path, bytes).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

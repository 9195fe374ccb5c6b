//! Per-file compilation: preprocess, parse, then optimize and generate
//! stage by stage, then pack.

use crate::preprocess::{preprocess, Defines};
use crate::record::ShaderRecord;
use crate::BuildConfig;
use shc_codegen::{generate_backends, reflect, BindingConflict, ConflictSubject, Reflection};
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{Backend, Shader, ShaderState, Span, StageOutput};
use shc_opt::{optimize_stage, StageView};

/// One preprocessed text and the backends that expanded to it.
struct Expansion {
    text: String,
    backends: Vec<Backend>,
}

/// Compile one shader source into its packed record.
///
/// The source is preprocessed once per backend; backends whose expansions
/// are identical share one parse. Any error fails the whole file.
#[tracing::instrument(level = "debug", skip(source, config))]
pub fn compile_source(name: &str, source: &str, config: &BuildConfig) -> CompileResult<ShaderRecord> {
    let mut expansions: Vec<Expansion> = Vec::new();
    for backend in config.backends() {
        let text = preprocess(source, &Defines::for_backend(backend))?;
        match expansions.iter_mut().find(|e| e.text == text) {
            Some(expansion) => expansion.backends.push(backend),
            None => expansions.push(Expansion {
                text,
                backends: vec![backend],
            }),
        }
    }
    tracing::debug!(expansions = expansions.len(), "preprocessed");

    let mut primary: Option<Shader> = None;
    let mut reflection: Option<Reflection> = None;
    let mut has_stages = false;
    for expansion in &expansions {
        let mut shader = Shader::new(name);
        shc_parse::parse(&mut shader, &expansion.text)?;
        let views = generate_all(&mut shader, &expansion.backends, config.parallel)?;
        has_stages |= !views.is_empty();
        if config.reflect {
            let part = reflect(&shader, &views);
            match &mut reflection {
                Some(merged) => merged
                    .merge(part)
                    .map_err(|conflict| conflict_error(&shader, conflict))?,
                None => reflection = Some(part),
            }
        }
        if let Some(first) = &mut primary {
            for output in shader.outputs() {
                first.push_output(output.clone());
            }
        } else {
            primary = Some(shader);
        }
    }

    let Some(mut shader) = primary else {
        // No backends requested.
        let mut shader = Shader::new(name);
        shader.advance(ShaderState::Parsed);
        shader.pack();
        return Ok(ShaderRecord::from_packed(&shader, None));
    };
    if !has_stages {
        tracing::warn!(shader = name, "shader declares no stage entry");
    }
    shader.pack();
    tracing::debug!(outputs = shader.outputs().len(), "packed");
    Ok(ShaderRecord::from_packed(&shader, reflection))
}

/// A reflection conflict, placed at the declaration in `shader`.
fn conflict_error(shader: &Shader, conflict: BindingConflict) -> CompileError {
    let line = match &conflict.subject {
        ConflictSubject::Resource(name) => shader.interner.get(name).and_then(|name| {
            let variable = shader.variables.lookup(name).map(|id| shader.variables.get(id).line);
            variable.or_else(|| shader.textures.lookup(name).map(|id| shader.textures.get(id).line))
        }),
        ConflictSubject::Entry(stage) => shader.entry(*stage).map(|id| shader.functions.get(id).line),
    };
    CompileError::semantic(ErrorCode::E2007, conflict.message, Span::DUMMY, line.unwrap_or(0))
}

/// Optimize every declared stage and generate it for `backends`, returning
/// the views for reflection.
fn generate_all(
    shader: &mut Shader,
    backends: &[Backend],
    parallel: bool,
) -> CompileResult<Vec<StageView>> {
    let stages: Vec<_> = shader.stages().collect();
    let mut views = Vec::with_capacity(stages.len());
    for stage in stages {
        let view = optimize_stage(shader, stage)?;
        shader.advance(ShaderState::Optimized(stage));

        let mut texts = Vec::with_capacity(backends.len());
        let mut failures = Vec::new();
        for (backend, result) in generate_backends(shader, &view, backends, parallel) {
            match result {
                Ok(text) => texts.push((backend, text)),
                Err(error) => failures.push(error),
            }
        }
        if let Some(error) = combine(failures) {
            return Err(error);
        }
        for (backend, text) in texts {
            shader.push_output(StageOutput {
                stage,
                backend,
                text,
                offset: 0,
                size: 0,
            });
            shader.advance(ShaderState::Generated(stage, backend));
        }
        views.push(view);
    }
    Ok(views)
}

/// First failure, with the other backends' failures attached as notes.
fn combine(failures: Vec<CompileError>) -> Option<CompileError> {
    let mut failures = failures.into_iter();
    let mut first = failures.next()?;
    for other in failures {
        let backend = other.backend.map_or("another backend", Backend::name);
        first = first.with_note(format!(
            "{backend} also failed at line {}: {}",
            other.line(),
            other.message
        ));
    }
    Some(first)
}

//! Call-graph checks run once the whole file is parsed.

use rustc_hash::FxHashSet;
use shc_diagnostic::{CompileError, CompileResult, ErrorCode};
use shc_ir::{DenseId, FunctionId, Shader};

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

/// Reject recursion (direct or through prototypes) and calls to functions
/// that were declared but never defined.
pub(crate) fn check_call_graph(shader: &Shader) -> CompileResult<()> {
    let called: FxHashSet<FunctionId> = shader
        .functions
        .iter()
        .flat_map(|(_, def)| def.calls.iter().copied())
        .collect();
    for (id, def) in shader.functions.iter() {
        if def.body.is_none() && called.contains(&id) {
            return Err(CompileError::semantic(
                ErrorCode::E2018,
                format!("function `{}` is declared but never defined", shader.name_of(def.name)),
                def.span,
                def.line,
            ));
        }
    }

    let mut marks = vec![Mark::Unvisited; shader.functions.len()];
    let mut path = Vec::new();
    for (id, _) in shader.functions.iter() {
        visit(shader, id, &mut marks, &mut path)?;
    }
    Ok(())
}

fn visit(
    shader: &Shader,
    id: FunctionId,
    marks: &mut [Mark],
    path: &mut Vec<FunctionId>,
) -> CompileResult<()> {
    match marks[id.index()] {
        Mark::Done => return Ok(()),
        Mark::Active => {
            let start = path.iter().position(|&f| f == id).unwrap_or(0);
            let mut cycle: Vec<&str> = path[start..]
                .iter()
                .map(|&f| shader.name_of(shader.functions.get(f).name))
                .collect();
            cycle.push(shader.name_of(shader.functions.get(id).name));
            let def = shader.functions.get(id);
            return Err(CompileError::semantic(
                ErrorCode::E2013,
                format!("recursive call: {}", cycle.join(" -> ")),
                def.span,
                def.line,
            ));
        }
        Mark::Unvisited => {}
    }
    marks[id.index()] = Mark::Active;
    path.push(id);
    for &callee in &shader.functions.get(id).calls {
        visit(shader, callee, marks, path)?;
    }
    path.pop();
    marks[id.index()] = Mark::Done;
    Ok(())
}

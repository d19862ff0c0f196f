use std::{
    io::{self, BufRead},
    result::Result as StdResult,
};

use anyhow::{Context, Result};
use libgosub::{GosubError, Output, OutputError, ReconciliationPlan, SubmodulePath};

/// Emit an output result, mapping errors into `GosubError`.
pub fn emit(result: StdResult<(), OutputError>) -> Result<()> {
    result.map_err(GosubError::from)?;
    Ok(())
}

/// Dependency names from the command line, or from stdin for a lone `-`.
pub fn dependency_names(args: Vec<String>) -> Result<Vec<String>> {
    if args.len() == 1 && args[0] == "-" {
        return read_names(io::stdin().lock());
    }
    Ok(args)
}

/// One name per non-blank line.
fn read_names(reader: impl BufRead) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read dependency names from stdin")?;
        let name = line.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Render a plan that was computed but not applied.
pub fn render_plan(output: &dyn Output, plan: &ReconciliationPlan) -> Result<()> {
    if plan.is_steady() && plan.keep.is_empty() {
        emit(output.message("no submodules"))?;
        return Ok(());
    }

    render_paths(output, "add", &plan.add, |o, m| o.success(m))?;
    render_paths(output, "keep", &plan.keep, |o, m| o.message(m))?;
    render_paths(output, "remove", &plan.remove, |o, m| o.fail(m))?;
    Ok(())
}

/// Print one line per path, prefixed with `verb`.
fn render_paths<'a>(
    output: &dyn Output,
    verb: &str,
    paths: impl IntoIterator<Item = &'a SubmodulePath>,
    line: impl Fn(&dyn Output, &str) -> StdResult<(), OutputError>,
) -> Result<()> {
    for path in paths {
        emit(line(output, &format!("{verb} {path}")))?;
    }
    Ok(())
}

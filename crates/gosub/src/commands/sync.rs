use anyhow::Result;
use libgosub::{Gosub, Output, SyncOptions};

use crate::ui::{emit, render_plan};

/// Run the `gosub sync` command logic.
pub fn sync(gosub: &Gosub, output: &dyn Output, deps: &[String], options: &SyncOptions) -> Result<()> {
    let report = gosub.sync(deps, options, output)?;

    if !report.applied {
        let section = output.section("dry run, nothing changed");
        return render_plan(section.as_ref(), &report.plan);
    }

    if report.is_steady() {
        emit(output.message(&format!(
            "{} submodule(s) already in sync",
            report.plan.keep.len()
        )))?;
    }
    Ok(())
}

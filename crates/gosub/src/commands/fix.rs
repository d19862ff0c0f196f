use anyhow::Result;
use libgosub::{Gosub, Output};

use crate::ui::emit;

/// Run the `gosub fix` command logic.
pub fn fix(gosub: &Gosub, output: &dyn Output, remote: &str, ignore: &[String]) -> Result<()> {
    let report = gosub.fix(remote, ignore)?;
    if report.is_clean() {
        emit(output.message("submodules are consistent"))?;
        return Ok(());
    }

    for path in &report.registered {
        emit(output.success(&format!("registered {path}")))?;
    }
    for path in &report.unregistered {
        emit(output.warn(&format!("unregistered {path} (no readable remote)")))?;
    }
    for path in &report.untouched {
        emit(output.warn(&format!("left {path} in place (ignored, no readable remote)")))?;
    }
    for name in &report.pruned {
        emit(output.fail(&format!("pruned stale entry {name}")))?;
    }
    Ok(())
}

use anyhow::Result;
use libgosub::{Gosub, Output, SyncOptions};

use crate::ui::emit;

/// Run the `gosub status` command logic.
pub fn status(gosub: &Gosub, output: &dyn Output, options: &SyncOptions) -> Result<()> {
    let existing = gosub.existing(options)?;
    if existing.is_empty() {
        emit(output.message("no submodules"))?;
        return Ok(());
    }

    for path in existing {
        emit(output.message(path.as_str()))?;
    }
    Ok(())
}

use anyhow::Result;
use libgosub::{Gosub, Output, VendorOptions};

use crate::ui::emit;

/// Run the `gosub vendor` command logic.
pub fn vendor(
    gosub: &Gosub,
    output: &dyn Output,
    deps: &[String],
    options: &VendorOptions,
) -> Result<()> {
    let report = gosub.vendor(deps, options, output)?;
    if report.added.is_empty() && report.skipped.is_empty() {
        emit(output.message("nothing to vendor"))?;
    }
    Ok(())
}

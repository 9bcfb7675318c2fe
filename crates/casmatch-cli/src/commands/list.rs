use casmatch_core::error::CasMatchError;
use casmatch_core::naming::matching_listing;
use casmatch_core::report::DirectorySink;
use std::path::Path;

use crate::output;

pub fn run(out_dir: &Path, output_format: &str) -> Result<(), CasMatchError> {
    let sink = DirectorySink::new(out_dir)?;
    let listing = matching_listing(sink.existing_keys()?);

    match output_format {
        "json" => output::json::print(&listing)?,
        _ => print!("{}", output::table::format_listing(&listing)),
    }

    Ok(())
}

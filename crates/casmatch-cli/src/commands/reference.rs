use casmatch_core::error::CasMatchError;
use casmatch_core::naming::reference_short_name;
use casmatch_core::store::ReferenceStore;
use std::path::{Path, PathBuf};

pub fn add(store_dir: &Path, files: &[PathBuf]) -> Result<(), CasMatchError> {
    let store = ReferenceStore::open(store_dir)?;

    for path in files {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let list = store.add(&file_name, &bytes)?;
        println!(
            "Stored {} ({} CAS numbers) as '{}'",
            path.display(),
            list.entries.len(),
            list.name
        );
    }

    Ok(())
}

pub fn list(store_dir: &Path) -> Result<(), CasMatchError> {
    let store = ReferenceStore::open(store_dir)?;
    let names = store.names()?;

    if names.is_empty() {
        println!("No reference lists stored in {}.", store.dir().display());
        println!("Add one with: casmatch reference add <FILE.xlsx>");
        return Ok(());
    }

    println!("Stored reference lists:\n");
    for name in &names {
        println!("  {:<40} (reported as '{}')", name, reference_short_name(name));
    }
    Ok(())
}

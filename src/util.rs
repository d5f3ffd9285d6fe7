use anyhow::{Context, Result};
use memmap2::Mmap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Memory-map a file for read-only access.
///
/// # Safety
/// The mapping is read-only. Callers must not concurrently truncate or replace
/// the underlying file while the `Mmap` is live.
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open document: {}", path.display()))?;
    // SAFETY: We only read from this mapping and drop it before returning the text.
    unsafe {
        Mmap::map(&file)
            .with_context(|| format!("Failed to memory-map document: {}", path.display()))
    }
}

/// Read a document as text. Invalid UTF-8 sequences become U+FFFD, which the
/// tokenizer then strips like any other non-alphanumeric character.
pub fn read_document(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    if !meta.is_file() {
        anyhow::bail!("Not a regular file: {}", path.display());
    }
    // Zero-length files cannot be mapped on every platform.
    if meta.len() == 0 {
        return Ok(String::new());
    }

    let mmap = mmap_file(path)?;
    let text = String::from_utf8_lossy(&mmap).into_owned();
    debug!(path = %path.display(), bytes = mmap.len(), "document loaded");
    Ok(text)
}

/// Collect every regular file under `root`, optionally restricted to one extension
/// (compared case-insensitively). Sorted so runs are reproducible.
pub fn collect_documents(root: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to read directory entry in {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let wanted = match extension {
            None => true,
            Some(ext) => entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
        };
        if wanted {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    debug!(root = %root.display(), count = documents.len(), "corpus collected");
    Ok(documents)
}

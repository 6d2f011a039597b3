//! Document directory discovery: every file name in the directory is a document ID.

use crate::builder::IndexBuilder;
use crate::error::Result;
use crate::DocId;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the direct children of `dir` whose names parse as document IDs, sorted by ID.
///
/// Names that map to an ID already seen (`7` and `007`) keep the first entry in name order.
pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Vec<(DocId, PathBuf)>> {
    let mut docs = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        match name.parse::<DocId>() {
            Ok(doc_id) => docs.push((doc_id, entry.into_path())),
            Err(_) => tracing::warn!(name = %name, "skipping entry whose name is not a document id"),
        }
    }
    // sort by path first so the surviving duplicate does not depend on directory order
    docs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    docs.dedup_by(|later, kept| {
        let duplicate = later.0 == kept.0;
        if duplicate {
            tracing::warn!(doc_id = later.0, kept = %kept.1.display(), skipped = %later.1.display(), "skipping duplicate document id");
        }
        duplicate
    });
    Ok(docs)
}

/// Feed every regular file under `dir` to the builder in ID order. Returns the number indexed.
pub fn index_directory<P: AsRef<Path>>(builder: &mut IndexBuilder, dir: P) -> Result<usize> {
    let before = builder.documents();
    for (doc_id, path) in discover(dir)? {
        if builder.is_full() {
            tracing::debug!(doc_id, "document limit reached");
            break;
        }
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "skipping non-regular entry");
            continue;
        }
        let text = fs::read_to_string(&path)?;
        builder.add_document(doc_id, &text)?;
    }
    Ok(builder.documents() - before)
}

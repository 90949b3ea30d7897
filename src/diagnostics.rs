//! Offline inspection of a page's embedded state tree
//!
//! When extraction starts misbehaving, the quickest way to see how the page's
//! data shape moved is to dump the whole `__NEXT_DATA__` tree and read it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scraper::Html;
use serde_json::Value;

use crate::extract::state::parse_state_tree;
use crate::ScrapeError;

/// Writes the page's embedded state tree to `path` as pretty-printed JSON
///
/// Best effort: failures are logged and reported through the return value,
/// never raised. Nothing is written when the tree can't be located or parsed.
///
/// # Returns
///
/// `true` if the file was written
pub fn dump_state_tree(html: &str, path: &Path) -> bool {
    let tree = match parse_state_tree(&Html::parse_document(html)) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("Could not extract state tree for {}: {}", path.display(), e);
            return false;
        }
    };

    match write_pretty(&tree, path) {
        Ok(()) => {
            tracing::info!("Saved state tree to {}", path.display());
            true
        }
        Err(e) => {
            tracing::error!("Failed to write state tree to {}: {}", path.display(), e);
            false
        }
    }
}

fn write_pretty(tree: &Value, path: &Path) -> Result<(), ScrapeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
